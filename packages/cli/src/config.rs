use diagrammer_grammar::Category;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "diagrammer.config.json";

/// Diagrammer configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Display layer used when `--category` is not given
    #[serde(default = "default_category")]
    pub default_category: Category,

    /// Maximum number of undoable batches (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Filter directive for log output, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_category() -> Category {
    Category::Phrase
}

fn default_history_limit() -> usize {
    100
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            history_limit: default_history_limit(),
            log_filter: default_log_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "defaultCategory": "partOfSpeech",
            "historyLimit": 5,
            "logFilter": "diagrammer_editor=debug"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.default_category, Category::PartOfSpeech);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.log_filter, "diagrammer_editor=debug");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "historyLimit": 0 }"#).unwrap();
        assert_eq!(config.default_category, Category::Phrase);
        assert_eq!(config.history_limit, 0);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_default_config() {
        assert_eq!(Config::load("/nonexistent/dir").unwrap(), Config::default());
    }
}
