use crate::deck::Card;

/// Everything persisted for one username.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub username: String,
    pub points: i64,
    pub deck: Vec<Card>,
    pub current_card: Option<Card>,
}

/// How a write changes the stored points. Applied against the stored value
/// inside the store, never against a copy read earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointsChange {
    Add(i64),
    Set(i64),
}

impl PointsChange {
    /// The points that result from this change, None if they overflow.
    pub fn apply(self, current: i64) -> Option<i64> {
        match self {
            PointsChange::Add(delta) => current.checked_add(delta),
            PointsChange::Set(value) => Some(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionWrite {
    pub username: String,
    pub points: PointsChange,
    pub deck: Vec<Card>,
    pub current_card: Option<Card>,
}
