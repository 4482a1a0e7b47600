use crate::core::{RankCriterion, RankingOrder, Recommender, ReferenceSelector, StopWords, TfidfVectorizer};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::num::NonZeroU16;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Marketplace backend serving profiles and the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Per HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Shared by both fetches of one recommendation request
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

fn default_timeout_secs() -> u64 { 5 }
fn default_deadline_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    /// Zero is rejected at load time
    #[serde(default = "default_top_n")]
    pub default_top_n: NonZeroU16,
    #[serde(default = "default_max_top_n")]
    pub max_top_n: NonZeroU16,
    #[serde(default)]
    pub stop_words: StopWords,
    #[serde(default)]
    pub reference: ReferenceSelector,
    #[serde(default = "default_ranking")]
    pub ranking: Vec<RankCriterion>,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
            stop_words: StopWords::default(),
            reference: ReferenceSelector::default(),
            ranking: default_ranking(),
        }
    }
}

impl RecommendationSettings {
    /// Build the pipeline these settings describe
    pub fn recommender(&self) -> Recommender {
        Recommender::new(
            TfidfVectorizer::new(self.stop_words),
            self.reference.clone(),
            RankingOrder::new(self.ranking.clone()),
        )
    }
}

fn default_top_n() -> NonZeroU16 { NonZeroU16::MIN.saturating_add(4) }
fn default_max_top_n() -> NonZeroU16 { NonZeroU16::MIN.saturating_add(99) }
fn default_ranking() -> Vec<RankCriterion> { RankingOrder::default().criteria().to_vec() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MERCADITO_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MERCADITO__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MERCADITO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }
}

/// Honour the conventional deployment variables
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("BACKEND_URL") {
        builder = builder.set_override("backend.base_url", url)?;
    }
    if let Ok(token) = env::var("BACKEND_API_TOKEN") {
        builder = builder.set_override("backend.api_token", token)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RankKey;
    use config::FileFormat;

    const BASE: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 8000

        [backend]
        base_url = "http://backend:8000"
    "#;

    fn try_from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn from_toml(toml: &str) -> Settings {
        try_from_toml(toml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8000

            [backend]
            base_url = "http://backend:8000"
            "#,
        );

        assert_eq!(settings.backend.timeout(), Duration::from_secs(5));
        assert_eq!(settings.recommendation.default_top_n.get(), 5);
        assert_eq!(settings.recommendation.max_top_n.get(), 100);
        assert_eq!(settings.recommendation.stop_words, StopWords::Spanish);
        assert_eq!(settings.recommendation.reference, ReferenceSelector::Index { index: 0 });
        assert_eq!(settings.recommendation.recommender().ranking(), &RankingOrder::default());
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_ranking_and_reference_overrides() {
        let settings = from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8000

            [backend]
            base_url = "http://backend:8000"

            [recommendation]
            stop_words = "english"
            reference = { strategy = "query", text = "solar" }
            ranking = [
                { key = "similarity", direction = "desc" },
                { key = "rating", direction = "desc" },
            ]
            "#,
        );

        let rec = &settings.recommendation;
        assert_eq!(rec.stop_words, StopWords::English);
        assert_eq!(rec.reference, ReferenceSelector::Query { text: "solar".to_string() });
        assert_eq!(
            rec.ranking,
            vec![
                RankCriterion::descending(RankKey::Similarity),
                RankCriterion::descending(RankKey::Rating),
            ]
        );
    }

    #[test]
    fn test_zero_top_n_settings_rejected() {
        for line in ["default_top_n = 0", "max_top_n = 0"] {
            let toml = format!("{}\n[recommendation]\n{}\n", BASE, line);
            assert!(try_from_toml(&toml).is_err(), "{} was accepted", line);
        }

        let settings = from_toml(&format!("{}\n[recommendation]\nmax_top_n = 20\n", BASE));
        assert_eq!(settings.recommendation.max_top_n.get(), 20);
    }

    #[test]
    fn test_backend_env_overrides() {
        std::env::set_var("BACKEND_URL", "http://marketplace:9000");
        let base = Config::builder()
            .add_source(File::from_str(BASE, FileFormat::Toml))
            .build()
            .unwrap();
        let settings: Settings = apply_env_overrides(base).unwrap().try_deserialize().unwrap();
        std::env::remove_var("BACKEND_URL");

        assert_eq!(settings.backend.base_url, "http://marketplace:9000");
    }
}
