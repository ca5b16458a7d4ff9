// ============================================================================
// lazycoin - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Connector + Provider CoinMarketCap
pub mod app;     // État de l'interface terminal
pub mod config;  // Configuration (variables d'environnement)
pub mod display; // Boucle d'affichage, recherche, timers
pub mod error;   // Erreurs typées
pub mod models;  // Structures de données
pub mod ui;      // Rendu HTML et interface terminal

pub use error::{CoinError, Result};
