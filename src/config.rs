// ============================================================================
// Configuration
// ============================================================================
// Lue depuis l'environnement (et un éventuel fichier .env)
//
// Variables :
//   DREAMBOARD_QUOTE_URL          URL de l'API de cotation
//   DREAMBOARD_REFRESH_SECS       délai entre deux rafraîchissements (900)
//   DREAMBOARD_HTTP_TIMEOUT_SECS  timeout des requêtes HTTP (10)
//   DREAMBOARD_DATA_DIR           répertoire du cache du cours
//   RUST_LOG                      filtre des logs
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::DEFAULT_QUOTE_URL;
use crate::feed::FeedConfig;

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    pub quote_url: String,
    pub refresh_interval: Duration,
    pub http_timeout: Duration,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Charge .env (sans écraser les variables déjà définies) puis lit l'environnement
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration depuis une fonction de lecture
    ///
    /// Séparé de from_env() pour tester sans toucher aux variables du process.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let quote_url = lookup("DREAMBOARD_QUOTE_URL").unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string());

        let refresh_secs = parse_secs(&lookup, "DREAMBOARD_REFRESH_SECS", 15 * 60)?;
        let timeout_secs = parse_secs(&lookup, "DREAMBOARD_HTTP_TIMEOUT_SECS", 10)?;

        let data_dir = lookup("DREAMBOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| "dreamboard=debug,info".to_string());

        Ok(Self {
            quote_url,
            refresh_interval: Duration::from_secs(refresh_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            data_dir,
            log_filter,
        })
    }

    /// Paramètres du flux de prix dérivés de la configuration
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            refresh_interval: self.refresh_interval,
            ..FeedConfig::default()
        }
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} invalide : {:?}", key, raw))?;
            anyhow::ensure!(secs > 0, "{} doit être strictement positif", key);
            Ok(secs)
        }
        None => Ok(default),
    }
}

/// ~/.local/share/dreamboard sur Linux, ./data si introuvable
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("dreamboard"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.quote_url, DEFAULT_QUOTE_URL);
        assert_eq!(config.refresh_interval, Duration::from_secs(900));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.log_filter, "dreamboard=debug,info");
        assert_eq!(config.feed_config().refresh_interval, Duration::from_secs(900));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DREAMBOARD_QUOTE_URL", "http://localhost:8080/price"),
            ("DREAMBOARD_REFRESH_SECS", "60"),
            ("DREAMBOARD_DATA_DIR", "/tmp/dreamboard-test"),
        ]))
        .unwrap();

        assert_eq!(config.quote_url, "http://localhost:8080/price");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dreamboard-test"));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[("DREAMBOARD_REFRESH_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DREAMBOARD_HTTP_TIMEOUT_SECS", "0")])).is_err());
    }
}
