// ============================================================================
// Module : api
// ============================================================================
// Clients des sources de cotation externes
// ============================================================================

pub mod coingecko;  // Client API CoinGecko

// Re-export des éléments principaux
pub use coingecko::{parse_quote, CoinGeckoSource, QuoteSource, DEFAULT_QUOTE_URL};
