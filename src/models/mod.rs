// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod currency; // Devises supportées (currency.rs)
pub mod options;  // Options de requête et d'affichage (options.rs)
pub mod ticker;   // Instantané d'une crypto (ticker.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazycoin::models::ticker::TickerRecord;
// On peut faire : use lazycoin::models::TickerRecord;
pub use currency::Currency;
pub use options::{DisplayOptions, RequestOptions, SanitizedOptions};
pub use ticker::{ChangeWindow, TickerRecord, Trend};
