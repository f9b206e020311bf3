// ============================================================================
// Module : models
// ============================================================================
// Structures de données du dream board : cours, produits, liste de rêve
// ============================================================================

pub mod rate;       // Cours USD/SOL et notifications
pub mod product;    // Produits et catalogue par défaut
pub mod dream_list; // Liste de rêve (panier)

// Re-export des structures principales pour simplifier les imports
pub use rate::{Rate, RateOrigin, RateUpdate};
pub use product::{default_catalog, Category, Product, ProductId};
pub use dream_list::{DreamList, DreamListEntry};
