// ============================================================================
// Options de requête et d'affichage
// ============================================================================
// Les options arrivent en couches (défauts, options d'instance, options
// d'appel). Chaque couche ne définit que ce qu'elle veut changer, d'où les
// Option<T> partout dans RequestOptions.
//
// CONCEPT RUST : Deux types pour deux états
// - RequestOptions : brut, non validé
// - SanitizedOptions : validé, construit uniquement par Connector
// ============================================================================

use crate::models::Currency;

/// Options brutes d'une requête (une couche)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Nombre max de tickers (valeur absolue appliquée, 0 = pas de limite)
    pub limit: Option<i64>,

    /// Code devise, n'importe quelle casse
    pub currency: Option<String>,

    /// Identifiant d'une crypto précise (ex: "bitcoin")
    pub id: Option<String>,

    /// Le résultat doit-il remplir le cache du Provider
    pub cache: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fusionne une couche par-dessus celle-ci
    ///
    /// Chaque champ défini dans `later` écrase celui de `self`.
    pub fn merge(&self, later: &RequestOptions) -> RequestOptions {
        RequestOptions {
            limit: later.limit.or(self.limit),
            currency: later.currency.clone().or_else(|| self.currency.clone()),
            id: later.id.clone().or_else(|| self.id.clone()),
            cache: later.cache.or(self.cache),
        }
    }
}

/// Options validées, prêtes à construire une URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedOptions {
    pub limit: u64,
    pub currency: Currency,
    pub id: Option<String>,
    /// Vrai si un id non vide est demandé
    pub fetch_single: bool,
    /// Vrai si la devise n'est pas USD
    pub convert_currency: bool,
}

/// Options de lecture du cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Nombre max de tickers retournés (<= 0 : tout le cache)
    pub display_limit: i64,
}

impl DisplayOptions {
    pub fn limited(display_limit: i64) -> Self {
        Self { display_limit }
    }

    /// Limite venant de la configuration, bornée à `i64::MAX`
    pub fn from_count(display_limit: usize) -> Self {
        Self::limited(i64::try_from(display_limit).unwrap_or(i64::MAX))
    }

    /// Lecture complète du cache
    pub fn unlimited() -> Self {
        Self { display_limit: 0 }
    }

    /// Limite effective, None si pas de limite
    pub fn effective_limit(&self) -> Option<usize> {
        match self.display_limit.max(0) {
            0 => None,
            n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_later_layer_wins() {
        let defaults = RequestOptions::new().with_limit(0).with_currency("USD");
        let instance = RequestOptions::new().with_currency("eur");
        let call = RequestOptions::new().with_limit(5).with_id("bitcoin");

        let merged = defaults.merge(&instance).merge(&call);

        assert_eq!(merged.limit, Some(5));
        assert_eq!(merged.currency.as_deref(), Some("eur"));
        assert_eq!(merged.id.as_deref(), Some("bitcoin"));
        assert_eq!(merged.cache, None);
    }

    #[test]
    fn test_merge_unset_fields_keep_earlier_values() {
        let base = RequestOptions::new().with_cache(true).with_limit(3);
        let merged = base.merge(&RequestOptions::new());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_display_limit_sanitized() {
        assert_eq!(DisplayOptions::limited(-4).effective_limit(), None);
        assert_eq!(DisplayOptions::unlimited().effective_limit(), None);
        assert_eq!(DisplayOptions::limited(20).effective_limit(), Some(20));
    }

    #[test]
    fn test_display_limit_from_count_does_not_wrap() {
        assert_eq!(DisplayOptions::from_count(20).effective_limit(), Some(20));
        assert_eq!(DisplayOptions::from_count(0).effective_limit(), None);

        let huge = DisplayOptions::from_count(usize::MAX);
        assert!(huge.display_limit > 0);
        assert!(huge.effective_limit().is_some());
    }
}
