use serde::Deserialize;
use std::{error::Error, fs, path::Path};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub database_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub address: String,
    pub log_level: String,
}

/// Demo-data seeding. The seed value is explicit so a deployment can be
/// reproduced exactly; there is no implicit process-wide randomness.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub enabled: bool,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let parsed: Config = toml::from_str(
            r#"
            [common]
            database_url = "sqlite://desk.db"

            [server]
            address = "127.0.0.1:8080"
            log_level = "info"

            [seed]
            enabled = true
            seed = 42
            "#,
        )
        .expect("config should parse");

        assert_eq!(parsed.common.database_url, "sqlite://desk.db");
        assert_eq!(parsed.server.address, "127.0.0.1:8080");
        assert!(parsed.seed.enabled);
        assert_eq!(parsed.seed.seed, 42);
    }

    #[test]
    fn seed_section_is_optional() {
        let parsed: Config = toml::from_str(
            r#"
            [common]
            database_url = "sqlite::memory:"

            [server]
            address = "127.0.0.1:0"
            log_level = "debug"
            "#,
        )
        .expect("config should parse");

        assert!(!parsed.seed.enabled);
        assert_eq!(parsed.seed.seed, 0);
    }
}
