// ============================================================================
// Enum : Currency
// ============================================================================
// Liste fermée des devises acceptées par l'API pour la conversion
//
// CONCEPT RUST : Enum au lieu de String
// - Une devise invalide ne peut pas exister une fois parsée
// - Le compilateur garantit qu'on gère tous les cas
// - Copy : petite valeur, copiée au lieu d'être déplacée
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoinError;

/// Devise utilisée pour les statistiques fiat
///
/// USD est le cas spécial : c'est la devise native de l'API, les autres
/// déclenchent une conversion (paramètre `convert`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Aud,
    Brl,
    Cad,
    Chf,
    Clp,
    Cny,
    Czk,
    Dkk,
    Eur,
    Gbp,
    Hkd,
    Huf,
    Idr,
    Ils,
    Inr,
    Jpy,
    Krw,
    Mxn,
    Myr,
    Nok,
    Nzd,
    Php,
    Pkr,
    Pln,
    Rub,
    Sek,
    Sgd,
    Thb,
    Try,
    Twd,
    Zar,
}

impl Currency {
    /// Toutes les devises supportées, dans l'ordre du sélecteur
    pub const ALL: [Currency; 32] = [
        Currency::Usd,
        Currency::Aud,
        Currency::Brl,
        Currency::Cad,
        Currency::Chf,
        Currency::Clp,
        Currency::Cny,
        Currency::Czk,
        Currency::Dkk,
        Currency::Eur,
        Currency::Gbp,
        Currency::Hkd,
        Currency::Huf,
        Currency::Idr,
        Currency::Ils,
        Currency::Inr,
        Currency::Jpy,
        Currency::Krw,
        Currency::Mxn,
        Currency::Myr,
        Currency::Nok,
        Currency::Nzd,
        Currency::Php,
        Currency::Pkr,
        Currency::Pln,
        Currency::Rub,
        Currency::Sek,
        Currency::Sgd,
        Currency::Thb,
        Currency::Try,
        Currency::Twd,
        Currency::Zar,
    ];

    /// Code ISO en majuscules (ex: "EUR")
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Aud => "AUD",
            Currency::Brl => "BRL",
            Currency::Cad => "CAD",
            Currency::Chf => "CHF",
            Currency::Clp => "CLP",
            Currency::Cny => "CNY",
            Currency::Czk => "CZK",
            Currency::Dkk => "DKK",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Hkd => "HKD",
            Currency::Huf => "HUF",
            Currency::Idr => "IDR",
            Currency::Ils => "ILS",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Krw => "KRW",
            Currency::Mxn => "MXN",
            Currency::Myr => "MYR",
            Currency::Nok => "NOK",
            Currency::Nzd => "NZD",
            Currency::Php => "PHP",
            Currency::Pkr => "PKR",
            Currency::Pln => "PLN",
            Currency::Rub => "RUB",
            Currency::Sek => "SEK",
            Currency::Sgd => "SGD",
            Currency::Thb => "THB",
            Currency::Try => "TRY",
            Currency::Twd => "TWD",
            Currency::Zar => "ZAR",
        }
    }

    /// Vrai si l'API doit convertir les prix (tout sauf USD)
    pub fn needs_conversion(&self) -> bool {
        *self != Currency::Usd
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    /// Devise suivante dans la liste (boucle à la fin)
    pub fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Devise précédente dans la liste (boucle au début)
    pub fn previous(&self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

/// CONCEPT RUST : FromStr
/// - Permet "eur".parse::<Currency>()
/// - La casse est normalisée avant la comparaison
impl FromStr for Currency {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or(CoinError::UnsupportedCurrency(code))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        for currency in Currency::ALL {
            let lower = currency.code().to_lowercase();
            assert_eq!(lower.parse::<Currency>().unwrap(), currency);
            assert_eq!(currency.code().parse::<Currency>().unwrap(), currency);
        }
    }

    #[test]
    fn test_unsupported_currency() {
        let err = "XYZ".parse::<Currency>().unwrap_err();
        assert!(matches!(err, CoinError::UnsupportedCurrency(code) if code == "XYZ"));
    }

    #[test]
    fn test_needs_conversion() {
        assert!(!Currency::Usd.needs_conversion());
        assert!(Currency::Eur.needs_conversion());
    }

    #[test]
    fn test_cycle() {
        assert_eq!(Currency::Usd.next(), Currency::Aud);
        assert_eq!(Currency::Zar.next(), Currency::Usd);
        assert_eq!(Currency::Usd.previous(), Currency::Zar);
        assert_eq!(Currency::Eur.next().previous(), Currency::Eur);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Currency::Eur).unwrap();
        assert_eq!(json, "\"EUR\"");
    }
}
