// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu du dream board
pub mod format;    // Formatage des montants et messages

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::render;
