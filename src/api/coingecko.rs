// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère le cours SOL/USD depuis l'endpoint "simple/price" de CoinGecko
//
// Réponse attendue :
//   {"solana": {"usd": 152.34}}
//
// CONCEPTS RUST :
// 1. Trait + async_trait : le flux de prix dépend d'une QuoteSource abstraite,
//    les tests fournissent leur propre implémentation sans réseau
// 2. serde_json::Value : le payload est traité comme une entrée non fiable,
//    validé champ par champ avant usage
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::error::FeedError;

/// URL par défaut de l'API CoinGecko pour SOL en dollars
pub const DEFAULT_QUOTE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

/// Source de cotation : fournit le cours brut (dollars par unité d'actif)
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self) -> Result<f64, FeedError>;
}

/// Client HTTP CoinGecko
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    client: reqwest::Client,
    url: String,
    asset_id: String,
    vs_currency: String,
}

impl CoinGeckoSource {
    /// Crée un client pour `url`, lisant le champ `solana.usd`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dreamboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            asset_id: "solana".to_string(),
            vs_currency: "usd".to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteSource for CoinGeckoSource {
    #[instrument(skip(self))]
    async fn fetch_quote(&self) -> Result<f64, FeedError> {
        debug!(url = %self.url, "Sending HTTP request to CoinGecko");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "CoinGecko returned error status");
            return Err(FeedError::Status(status));
        }

        let body: Value = response.json().await?;
        let quote = parse_quote(&body, &self.asset_id, &self.vs_currency)?;

        debug!(quote, "Parsed quote from CoinGecko");
        Ok(quote)
    }
}

/// Extrait `body[asset_id][vs_currency]` et vérifie que c'est un cours utilisable
///
/// Un champ absent, non numérique, nul, négatif ou non fini est un payload
/// malformé.
pub fn parse_quote(body: &Value, asset_id: &str, vs_currency: &str) -> Result<f64, FeedError> {
    let field = body
        .get(asset_id)
        .and_then(|asset| asset.get(vs_currency))
        .ok_or_else(|| {
            FeedError::MalformedPayload(format!("missing field {}.{}", asset_id, vs_currency))
        })?;

    let value = field.as_f64().ok_or_else(|| {
        FeedError::MalformedPayload(format!("{}.{} is not a number: {}", asset_id, vs_currency, field))
    })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(FeedError::MalformedPayload(format!(
            "{}.{} is not a positive price: {}",
            asset_id, vs_currency, value
        )));
    }

    Ok(value)
}

// ============================================================================
// Tests unitaires
// ============================================================================
