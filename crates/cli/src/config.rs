//! Configuration from the process environment.

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Runtime configuration.
///
/// Secrets are read without up-front validation; a missing key surfaces as
/// an upstream auth failure when the corresponding call is made.
#[derive(Debug)]
pub struct Config {
    /// Chat-completion service key (`OPENAI_API_KEY`).
    pub model_api_key: String,
    /// Weather provider key (`OPENWEATHER_KEY`).
    pub openweather_key: String,
    /// Financial-data provider key (`POLYGON_KEY`).
    pub polygon_key: String,
    /// Model name (`ALMANAC_MODEL`, falls back to the default).
    pub model: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            model_api_key: env_or_empty("OPENAI_API_KEY"),
            openweather_key: env_or_empty("OPENWEATHER_KEY"),
            polygon_key: env_or_empty("POLYGON_KEY"),
            model: std::env::var("ALMANAC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}
