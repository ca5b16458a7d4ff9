// ============================================================================
// Module : error
// ============================================================================
// Erreurs typées de la librairie
//
// CONCEPT RUST : thiserror
// - #[derive(thiserror::Error)] génère l'implémentation de std::error::Error
// - #[error("...")] définit le message affiché (trait Display)
// - #[from] génère un From<T> pour que ? convertisse automatiquement
//
// Le binaire continue d'utiliser anyhow ; la librairie expose un enum pour
// que l'appelant puisse matcher sur le type d'échec.
// ============================================================================

/// Alias utilisé dans toute la librairie
pub type Result<T> = std::result::Result<T, CoinError>;

/// Toutes les erreurs possibles de la couche données
#[derive(Debug, thiserror::Error)]
pub enum CoinError {
    /// Devise hors de la liste supportée (rejetée avant tout appel réseau)
    #[error("Devise non supportée : {0}")]
    UnsupportedCurrency(String),

    /// Échec de transport (connexion, DNS, lecture du body, timeout)
    #[error("Échec de la requête HTTP : {0}")]
    Network(#[from] reqwest::Error),

    /// Le serveur a répondu avec un statut non 2xx
    #[error("L'API a retourné une erreur : HTTP {status} ({url})")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// L'API a répondu {"error": "..."} (ex: id inconnu)
    #[error("L'API a retourné une erreur : {0}")]
    Api(String),

    /// Le body n'est pas un JSON de tickers valide
    #[error("Échec du parsing JSON de la réponse : {0}")]
    Parse(#[from] serde_json::Error),

    /// Lecture du cache avant le premier remplissage réussi
    #[error("Le cache est vide")]
    CacheEmpty,

    /// Variable d'environnement invalide
    #[error("Configuration invalide : {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err: CoinError = json_err.into();
        assert!(matches!(err, CoinError::Parse(_)));
    }

    #[test]
    fn test_display_messages() {
        let err = CoinError::UnsupportedCurrency("XYZ".to_string());
        assert!(err.to_string().contains("XYZ"));
        assert_eq!(CoinError::CacheEmpty.to_string(), "Le cache est vide");
    }
}
