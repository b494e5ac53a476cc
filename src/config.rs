use std::path::Path;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::i18n::LanguageTag;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Language painted on first load
    #[arg(long, env = "DEFAULT_LANGUAGE")]
    pub default_language: Option<String>,

    /// Question-answering backend that POST /ask is forwarded to
    #[arg(long, env = "ASK_UPSTREAM")]
    pub ask_upstream: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub widget: WidgetConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5003,
            static_dir: "static".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WidgetConfig {
    pub default_language: LanguageTag,
    pub languages: Vec<LanguageTag>,
    pub title: String,
    pub escape_html: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageTag::default(),
            languages: ["ja", "en"]
                .into_iter()
                .filter_map(|t| LanguageTag::parse(t).ok())
                .collect(),
            title: "LARUbot".to_string(),
            escape_html: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub ask_upstream: Option<String>,
    /// Upstream request timeout; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            ask_upstream: None,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn upstream_url(&self) -> Result<Option<Url>, url::ParseError> {
        self.ask_upstream
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(Url::parse)
            .transpose()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layered load: defaults, then the config file, then `LARU_`-prefixed
    /// environment variables, then CLI flags (or their env fallbacks).
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        // Explicit file must exist; ./config.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(Path::new(path))),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. LARU_SERVER__PORT=8000, LARU_WIDGET__LANGUAGES=ja,en
        builder = builder.add_source(
            Environment::with_prefix("LARU")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("widget.languages")
                .try_parsing(true),
        );

        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(dir) = cli.static_dir {
            builder = builder.set_override("server.static_dir", dir)?;
        }
        if let Some(lang) = cli.default_language {
            builder = builder.set_override("widget.default_language", lang)?;
        }
        if let Some(upstream) = cli.ask_upstream {
            builder = builder.set_override("backend.ask_upstream", upstream)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.widget.languages.is_empty() {
            return Err(config::ConfigError::Message(
                "widget.languages cannot be empty".to_string(),
            ));
        }
        if !self.widget.languages.contains(&self.widget.default_language) {
            return Err(config::ConfigError::Message(format!(
                "widget.default_language {} is not listed in widget.languages",
                self.widget.default_language
            )));
        }
        self.backend
            .upstream_url()
            .map_err(|e| config::ConfigError::Message(format!("backend.ask_upstream: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 5003);
        assert_eq!(cfg.widget.default_language.as_str(), "ja");
        assert_eq!(cfg.backend.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_default_language_must_be_offered() {
        let mut cfg = AppConfig::default();
        cfg.widget.default_language = LanguageTag::parse("fr").unwrap();
        assert!(cfg.validate().is_err());

        cfg.widget.languages.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_upstream_must_be_a_url() {
        let mut cfg = AppConfig::default();
        cfg.backend.ask_upstream = Some("not a url".to_string());
        assert!(cfg.validate().is_err());

        cfg.backend.ask_upstream = Some("http://127.0.0.1:8000/ask".to_string());
        assert!(cfg.validate().is_ok());
        assert_eq!(
            cfg.backend.upstream_url().unwrap().unwrap().as_str(),
            "http://127.0.0.1:8000/ask"
        );

        cfg.backend.ask_upstream = Some(String::new());
        assert!(cfg.backend.upstream_url().unwrap().is_none());
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let backend = BackendConfig {
            ask_upstream: None,
            timeout_secs: 0,
        };
        assert!(backend.timeout().is_none());
    }
}
