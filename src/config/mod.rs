use std::{env, str::FromStr};

const DEFAULT_DATABASE_PATH: &str = "local.db";

/// What StartGame does with the points supplied by the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// existing + supplied
    #[default]
    Additive,
    /// points = supplied, 0 when absent
    Reset,
    /// supplied points are discarded, existing points carry over
    Ignore,
}

impl FromStr for SeedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" => Ok(SeedPolicy::Additive),
            "reset" => Ok(SeedPolicy::Reset),
            "ignore" => Ok(SeedPolicy::Ignore),
            other => Err(anyhow::anyhow!(
                "unknown seed policy {}, expected additive, reset or ignore",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub seed_policy: SeedPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let port = lookup("SERVER_PORT")
            .ok_or(anyhow::anyhow!("please set SERVER_PORT"))?
            .trim()
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("SERVER_PORT is not a valid port, {}", e))?;

        let database_path =
            lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let seed_policy = lookup("KITTENS_SEED_POLICY")
            .map(|policy| policy.parse::<SeedPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            port,
            database_path,
            seed_policy,
        })
    }
}
