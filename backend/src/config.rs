use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://lexicon.db?mode=rwc";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{set} is set but {missing} is not; the hosted store needs both")]
    IncompleteRest {
        set: &'static str,
        missing: &'static str,
    },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

/// Where the pair tables live
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Sqlite { url: String },
    Rest { url: String, api_key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
}

impl Config {
    /// Read settings from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rest_url = lookup("LEXICON_REST_URL").filter(|v| !v.trim().is_empty());
        let rest_key = lookup("LEXICON_REST_KEY").filter(|v| !v.trim().is_empty());

        let store = match (rest_url, rest_key) {
            (Some(url), Some(api_key)) => StoreConfig::Rest { url, api_key },
            (Some(_), None) => {
                return Err(ConfigError::IncompleteRest {
                    set: "LEXICON_REST_URL",
                    missing: "LEXICON_REST_KEY",
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteRest {
                    set: "LEXICON_REST_KEY",
                    missing: "LEXICON_REST_URL",
                });
            }
            (None, None) => {
                let url =
                    lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
                if url.trim().is_empty() {
                    return Err(ConfigError::Empty {
                        name: "DATABASE_URL",
                    });
                }
                StoreConfig::Sqlite { url }
            }
        };

        Ok(Self { store })
    }

    /// Store description safe to log (no credentials)
    pub fn describe(&self) -> String {
        match &self.store {
            StoreConfig::Sqlite { url } => format!("sqlite {url}"),
            StoreConfig::Rest { url, .. } => format!("hosted {url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_to_sqlite() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                url: DEFAULT_DATABASE_URL.to_string()
            }
        );
    }

    #[test]
    fn test_rest_store_when_both_set() {
        let config = Config::from_lookup(lookup(&[
            ("LEXICON_REST_URL", "https://db.example.com"),
            ("LEXICON_REST_KEY", "secret"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert!(matches!(config.store, StoreConfig::Rest { .. }));
        assert!(!config.describe().contains("secret"));
    }

    #[test]
    fn test_half_configured_rest_store_is_an_error() {
        let err = Config::from_lookup(lookup(&[("LEXICON_REST_URL", "https://db.example.com")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::IncompleteRest {
                set: "LEXICON_REST_URL",
                missing: "LEXICON_REST_KEY"
            }
        );
    }

    #[test]
    fn test_empty_database_url_is_an_error() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", " ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { name: "DATABASE_URL" });
    }
}
