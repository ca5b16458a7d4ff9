// ============================================================================
// Module : api
// ============================================================================
// Couche données : connecteur HTTP vers CoinMarketCap et fournisseur avec
// cache au-dessus
// ============================================================================

pub mod coinmarketcap; // Connecteur : options, URL, requête GET
pub mod provider;      // Provider : cache current/previous

// Re-export des types principaux
pub use coinmarketcap::{Connector, DEFAULT_BASE_URL};
pub use provider::Provider;
