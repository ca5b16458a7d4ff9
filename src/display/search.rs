// ============================================================================
// Recherche dans le cache
// ============================================================================
// Trois issues possibles pour une requête non vide :
// 1. Correspondance exacte (symbole, id ou nom) : un seul ticker
// 2. Sinon, les tickers dont le nom contient la requête (limités)
// 3. Sinon, rien : le rendu affichera le placeholder "not found"
//
// La comparaison est insensible à la casse.
// ============================================================================

use crate::models::TickerRecord;

/// Résultat d'une recherche
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Requête vide : afficher la liste normale
    All,

    /// Correspondance exacte
    Exact(TickerRecord),

    /// Correspondances partielles sur le nom
    Partial(Vec<TickerRecord>),

    NotFound,
}

/// Filtre `records` selon `query`
///
/// `limit` borne le nombre de correspondances partielles (0 = pas de borne).
/// Si plusieurs tickers correspondent exactement, le dernier l'emporte.
pub fn search(records: &[TickerRecord], query: &str, limit: usize) -> SearchOutcome {
    if query.is_empty() {
        return SearchOutcome::All;
    }

    let needle = query.to_lowercase();

    if let Some(exact) = records.iter().rev().find(|r| r.matches_exactly(&needle)) {
        return SearchOutcome::Exact(exact.clone());
    }

    let max = if limit == 0 { usize::MAX } else { limit };
    let partial: Vec<TickerRecord> = records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .take(max)
        .cloned()
        .collect();

    if partial.is_empty() {
        SearchOutcome::NotFound
    } else {
        SearchOutcome::Partial(partial)
    }
}
