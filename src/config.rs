use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub recommend: Option<RecommendConfig>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Base URL of the hosted project, e.g. https://myproject.supabase.co
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendConfig {
    pub endpoint: String,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "
store:
  url: https://myproject.supabase.co
  anon_key: anon
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.store.url, "https://myproject.supabase.co");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.recommend.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = "
store:
  url: https://myproject.supabase.co
  anon_key: anon
recommend:
  endpoint: https://model.example.com/predict
timeout_secs: 5
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.recommend.unwrap().endpoint,
            "https://model.example.com/predict"
        );
        assert_eq!(config.timeout_secs, 5);
    }
}
