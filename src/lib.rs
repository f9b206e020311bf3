// ============================================================================
// DreamBoard - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Sources de cotation (CoinGecko)
pub mod app;     // État de l'application TUI
pub mod catalog; // Catalogue filtrable et liste de rêve
pub mod config;  // Configuration depuis l'environnement
pub mod error;   // Erreurs du flux de prix
pub mod feed;    // Flux du cours SOL/USD
pub mod models;  // Structures de données
pub mod storage; // Stockage clé/valeur du cours
pub mod ui;      // Interface utilisateur
