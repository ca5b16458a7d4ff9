// ============================================================================
// Module : ui
// ============================================================================
// Rendu HTML (pur) et Renderer Host terminal
// ============================================================================

pub mod dashboard; // Rendu de l'interface terminal
pub mod events;    // Gestion des événements clavier
pub mod host;      // Renderer branché sur App + fichier HTML
pub mod html;      // HtmlBuilder : tickers → fragment HTML

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
pub use host::TerminalHost;
pub use html::{BuildOptions, HtmlBuilder, NOT_FOUND_PLACEHOLDER};
