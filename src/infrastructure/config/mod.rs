//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::domain::traits::BrowserProfile;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub automation: AutomationConfig,
    pub moderation: ModerationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Sender ids allowed to run admin commands
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    pub headless: bool,
    pub browser_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AutomationConfig {
    /// `{user}` and `{group}` are substituted
    pub welcome_message: String,
    pub farewell_message: String,
    pub schedule_interval_seconds: u64,
    pub retention_days: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ModerationConfig {
    pub enabled: bool,
    pub block_links: bool,
    pub banned_words: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let browser = BrowserProfile::default();
        Self {
            bot: BotConfig {
                name: "wa-warden".to_string(),
                prefix: "!".to_string(),
                admins: Vec::new(),
            },
            http: HttpConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: PathBuf::from("public"),
            },
            database: DatabaseConfig {
                path: PathBuf::from("wa-warden.db"),
            },
            session: SessionConfig {
                data_dir: browser.data_dir,
                headless: browser.headless,
                browser_args: browser.args,
            },
            automation: AutomationConfig {
                welcome_message: "Welcome {user} to {group}! Please read the group rules.".to_string(),
                farewell_message: "Goodbye {user}.".to_string(),
                schedule_interval_seconds: 3600,
                retention_days: 30,
            },
            moderation: ModerationConfig {
                enabled: true,
                block_links: true,
                banned_words: Vec::new(),
            },
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Config::default().bot
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Config::default().http
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Config::default().database
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Config::default().session
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Config::default().automation
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Config::default().moderation
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Defaults with environment overrides applied
    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("BOT_NAME") {
            self.bot.name = name;
        }

        if let Some(prefix) = lookup("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(admins) = lookup("BOT_ADMINS") {
            self.bot.admins = admins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(host) = lookup("HOST") {
            self.http.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT must be a port number, got '{}'", port)))?;
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("SESSION_DIR") {
            self.session.data_dir = PathBuf::from(dir);
        }

        Ok(())
    }

    pub fn browser_profile(&self) -> BrowserProfile {
        BrowserProfile {
            headless: self.session.headless,
            args: self.session.browser_args.clone(),
            data_dir: self.session.data_dir.clone(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.bot.name, "wa-warden");
        assert!(config.session.headless);
        assert!(config.session.browser_args.contains(&"--no-sandbox".to_string()));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[("BOT_NAME", "Warden"), ("PORT", "8080"), ("BOT_ADMINS", "1@c.us, 2@c.us,")]);
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.bot.name, "Warden");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.bot.admins, vec!["1@c.us", "2@c.us"]);
    }

    #[test]
    fn test_session_dir_override_reaches_browser_profile() {
        let vars = env(&[("SESSION_DIR", "/var/lib/wa-warden/session")]);
        let mut config = Config::default();
        assert_eq!(config.browser_profile().data_dir, PathBuf::from(".session"));

        config.apply_env(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.browser_profile().data_dir, PathBuf::from("/var/lib/wa-warden/session"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let vars = env(&[("PORT", "http")]);
        let mut config = Config::default();
        assert!(config.apply_env(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = "bot:\n  name: yaml-bot\n  prefix: \"#\"\nhttp:\n  host: 127.0.0.1\n  port: 4000\n  static-dir: assets\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.bot.name, "yaml-bot");
        assert_eq!(config.http.port, 4000);
        assert_eq!(config.database.path, PathBuf::from("wa-warden.db"));
        assert!(config.moderation.block_links);
    }
}
