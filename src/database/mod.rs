use rusqlite::OptionalExtension;
pub use types::{PointsChange, SessionRecord, SessionWrite};

use crate::deck::Card;

pub mod types;

pub trait Database {
    // Gets the session stored for a user, None if the user never started a game
    fn get_session(&self, username: &str) -> Result<Option<SessionRecord>, anyhow::Error>;

    // Creates the record if needed, then applies the points change and the
    // deck/current card overwrite as one unit. Returns the stored points afterwards
    fn apply_session_write(&self, write: &SessionWrite) -> Result<i64, anyhow::Error>;

    // Gets every username known to the store
    fn get_all_usernames(&self) -> Result<Vec<String>, anyhow::Error>;

    // Gets the points of a single user
    fn get_points(&self, username: &str) -> Result<i64, anyhow::Error>;

    /// Points and whether the record exists. A missing record is not an error.
    fn load(&self, username: &str) -> Result<(i64, bool), anyhow::Error> {
        Ok(self
            .get_session(username)?
            .map(|record| (record.points, true))
            .unwrap_or((0, false)))
    }

    /// Overwrites all persisted fields of a user.
    fn save(
        &self,
        username: &str,
        points: i64,
        deck: &[Card],
        current_card: Option<Card>,
    ) -> Result<(), anyhow::Error> {
        self.apply_session_write(&SessionWrite {
            username: username.to_string(),
            points: PointsChange::Set(points),
            deck: deck.to_vec(),
            current_card,
        })
        .map(|_| ())
    }
}

#[derive(Default, Debug)]
pub struct DatabaseConnectionCreater {
    file_path: Option<String>,
}

#[derive(Debug)]
pub struct DatabaseConnection {
    connection: rusqlite::Connection,
}

impl DatabaseConnectionCreater {
    pub fn open_else_new(file_path: &str) -> Self {
        Self {
            file_path: Some(file_path.to_string()),
        }
    }

    pub fn open_in_memory() -> Self {
        Self::default()
    }

    fn initialize_table_if_needed(
        dbconn: DatabaseConnection,
    ) -> Result<DatabaseConnection, anyhow::Error> {
        let statement = r#"
CREATE TABLE IF NOT EXISTS "sessions" (
  "USERNAME"	TEXT,
  "POINTS"	INTEGER DEFAULT 0,
  "DECK"	TEXT DEFAULT '[]',
  "CURRENT_CARD"	TEXT,
  PRIMARY KEY("USERNAME")
);
"#;
        let _ = dbconn.connection.execute(statement, ())?;
        Ok(dbconn)
    }

    pub fn start(self) -> Result<DatabaseConnection, anyhow::Error> {
        let connection = match self.file_path {
            Some(path) => {
                log::info!("Opening session database at {}", path);
                DatabaseConnection {
                    connection: rusqlite::Connection::open(path)?,
                }
            }
            None => DatabaseConnection {
                connection: rusqlite::Connection::open_in_memory()?,
            },
        };

        Self::initialize_table_if_needed(connection)
    }
}

impl DatabaseConnection {
    pub fn close(self) -> Result<(), anyhow::Error> {
        self.connection
            .close()
            .map_err(|(_, e)| anyhow::anyhow!("cannot close database, {}", e))
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, statement: &str) -> Result<usize, anyhow::Error> {
        Ok(self.connection.execute(statement, ())?)
    }
}

fn session_from_columns(
    username: String,
    points: i64,
    deck: String,
    current_card: Option<String>,
) -> Result<SessionRecord, anyhow::Error> {
    Ok(SessionRecord {
        username,
        points,
        deck: serde_json::from_str(&deck)?,
        current_card: current_card.map(|label| label.parse::<Card>()).transpose()?,
    })
}

impl Database for DatabaseConnection {
    fn get_session(&self, username: &str) -> Result<Option<SessionRecord>, anyhow::Error> {
        let mut statement = self.connection.prepare(
            r#"SELECT USERNAME, POINTS, DECK, CURRENT_CARD FROM sessions WHERE USERNAME = ? LIMIT 1;"#,
        )?;
        let columns = statement
            .query_row((username,), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .optional()?;

        columns
            .map(|(username, points, deck, current_card)| {
                session_from_columns(username, points, deck, current_card)
            })
            .transpose()
    }

    fn apply_session_write(&self, write: &SessionWrite) -> Result<i64, anyhow::Error> {
        log::debug!(
            "Writing session for {}: {:?}, {} cards left",
            write.username,
            write.points,
            write.deck.len()
        );
        let transaction = self.connection.unchecked_transaction()?;

        transaction.execute(
            r#"INSERT OR IGNORE INTO sessions (USERNAME, POINTS, DECK) VALUES (?, 0, '[]');"#,
            (&write.username,),
        )?;

        match write.points {
            PointsChange::Add(delta) => transaction.execute(
                r#"UPDATE sessions SET POINTS = POINTS + ? WHERE USERNAME = ?;"#,
                (delta, &write.username),
            )?,
            PointsChange::Set(value) => transaction.execute(
                r#"UPDATE sessions SET POINTS = ? WHERE USERNAME = ?;"#,
                (value, &write.username),
            )?,
        };

        transaction.execute(
            r#"UPDATE sessions SET DECK = ?, CURRENT_CARD = ? WHERE USERNAME = ?;"#,
            (
                serde_json::to_string(&write.deck)?,
                write.current_card.map(|card| card.label()),
                &write.username,
            ),
        )?;

        let points = transaction.query_row(
            r#"SELECT POINTS FROM sessions WHERE USERNAME = ?;"#,
            (&write.username,),
            |row| row.get::<_, i64>(0),
        )?;

        transaction.commit()?;
        Ok(points)
    }

    fn get_all_usernames(&self) -> Result<Vec<String>, anyhow::Error> {
        let mut statement = self
            .connection
            .prepare(r#"SELECT USERNAME FROM sessions ORDER BY USERNAME"#)?;
        let usernames = statement
            .query_map((), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(usernames)
    }

    fn get_points(&self, username: &str) -> Result<i64, anyhow::Error> {
        Ok(self.connection.query_row(
            r#"SELECT POINTS FROM sessions WHERE USERNAME = ?;"#,
            (username,),
            |row| row.get::<_, i64>(0),
        )?)
    }
}

#[cfg(test)]
pub struct MockDatabase {
    pub get_session_ret_val: Result<Option<SessionRecord>, anyhow::Error>,
    pub apply_session_write_ret_val: Result<i64, anyhow::Error>,
    pub get_all_usernames_ret_val: Result<Vec<String>, anyhow::Error>,
    pub get_points_ret_val: std::collections::HashMap<String, Result<i64, anyhow::Error>>,
    pub writes: std::sync::Mutex<Vec<SessionWrite>>,
}

#[cfg(test)]
impl Default for MockDatabase {
    fn default() -> Self {
        Self {
            get_session_ret_val: Err(anyhow::anyhow!("default value")),
            apply_session_write_ret_val: Err(anyhow::anyhow!("default value")),
            get_all_usernames_ret_val: Err(anyhow::anyhow!("default value")),
            get_points_ret_val: Default::default(),
            writes: Default::default(),
        }
    }
}

#[cfg(test)]
impl Database for MockDatabase {
    fn get_session(&self, _username: &str) -> Result<Option<SessionRecord>, anyhow::Error> {
        self.get_session_ret_val
            .as_ref()
            .map_err(|e| anyhow::anyhow!("mock error {}", e))
            .cloned()
    }

    fn apply_session_write(&self, write: &SessionWrite) -> Result<i64, anyhow::Error> {
        self.writes
            .lock()
            .map_err(|_| anyhow::anyhow!("mock writes poisoned"))?
            .push(write.clone());
        self.apply_session_write_ret_val
            .as_ref()
            .map_err(|e| anyhow::anyhow!("mock error {}", e))
            .cloned()
    }

    fn get_all_usernames(&self) -> Result<Vec<String>, anyhow::Error> {
        self.get_all_usernames_ret_val
            .as_ref()
            .map_err(|e| anyhow::anyhow!("mock error {}", e))
            .cloned()
    }

    fn get_points(&self, username: &str) -> Result<i64, anyhow::Error> {
        match self.get_points_ret_val.get(username) {
            Some(Ok(points)) => Ok(*points),
            Some(Err(e)) => Err(anyhow::anyhow!("mock error {}", e)),
            None => Err(anyhow::anyhow!("no mock points for {}", username)),
        }
    }
}
