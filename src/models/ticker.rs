// ============================================================================
// Structure : TickerRecord
// ============================================================================
// Instantané d'une cryptomonnaie tel que retourné par l'API CoinMarketCap
//
// CONCEPTS RUST :
// 1. #[serde(rename = "...")] : "24h_volume_usd" n'est pas un identifiant
//    Rust valide, on le mappe vers volume_24h_usd
// 2. #[serde(flatten)] : capture tous les champs non déclarés (les champs
//    convertis comme "price_eur") dans une map
// 3. deserialize_with : l'API envoie des nombres sous forme de chaînes,
//    on accepte les deux formes
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Currency;

/// Un ticker (prix, volume, offre, variations)
///
/// Les champs numériques restent des chaînes décimales : on les affiche
/// tels quels, sans perte de précision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    /// Identifiant API (ex: "bitcoin")
    pub id: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// Symbole (ex: "BTC")
    pub symbol: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub rank: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub price_usd: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub price_btc: Option<String>,

    #[serde(rename = "24h_volume_usd", default, deserialize_with = "string_or_number")]
    pub volume_24h_usd: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub market_cap_usd: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub available_supply: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub total_supply: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub max_supply: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub percent_change_1h: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub percent_change_24h: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub percent_change_7d: Option<String>,

    /// Timestamp Unix (en secondes) de la dernière mise à jour côté API
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_updated: Option<String>,

    /// Champs ajoutés par la conversion (price_eur, 24h_volume_eur, ...)
    #[serde(flatten)]
    pub converted: BTreeMap<String, serde_json::Value>,
}

/// Fenêtre de variation du prix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeWindow {
    OneHour,
    OneDay,
    SevenDays,
}

impl ChangeWindow {
    pub const ALL: [ChangeWindow; 3] = [
        ChangeWindow::OneHour,
        ChangeWindow::OneDay,
        ChangeWindow::SevenDays,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChangeWindow::OneHour => "1h",
            ChangeWindow::OneDay => "24h",
            ChangeWindow::SevenDays => "7d",
        }
    }
}

/// Sens de la variation : strictement positif = hausse, sinon baisse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Une valeur absente ou non numérique compte comme une baisse
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(value) if value > 0.0 => Trend::Up,
            _ => Trend::Down,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
        }
    }
}

impl TickerRecord {
    /// Crée un ticker minimal (utile pour les tests et les placeholders)
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            rank: None,
            price_usd: None,
            price_btc: None,
            volume_24h_usd: None,
            market_cap_usd: None,
            available_supply: None,
            total_supply: None,
            max_supply: None,
            percent_change_1h: None,
            percent_change_24h: None,
            percent_change_7d: None,
            last_updated: None,
            converted: BTreeMap::new(),
        }
    }

    /// Prix dans la devise demandée
    ///
    /// `None` si l'API n'a pas renvoyé de conversion vers cette devise :
    /// un prix USD ne doit jamais s'afficher sous une autre étiquette.
    pub fn price_in(&self, currency: Currency) -> Option<String> {
        self.field_in("price_", currency, &self.price_usd)
    }

    /// Volume 24h dans la devise demandée
    pub fn volume_24h_in(&self, currency: Currency) -> Option<String> {
        self.field_in("24h_volume_", currency, &self.volume_24h_usd)
    }

    /// Capitalisation dans la devise demandée
    pub fn market_cap_in(&self, currency: Currency) -> Option<String> {
        self.field_in("market_cap_", currency, &self.market_cap_usd)
    }

    /// Variation en pourcentage, parsée en f64
    pub fn change(&self, window: ChangeWindow) -> Option<f64> {
        let raw = match window {
            ChangeWindow::OneHour => self.percent_change_1h.as_deref(),
            ChangeWindow::OneDay => self.percent_change_24h.as_deref(),
            ChangeWindow::SevenDays => self.percent_change_7d.as_deref(),
        }?;
        raw.trim().parse().ok()
    }

    /// Chaîne brute d'une variation
    pub fn change_text(&self, window: ChangeWindow) -> Option<&str> {
        match window {
            ChangeWindow::OneHour => self.percent_change_1h.as_deref(),
            ChangeWindow::OneDay => self.percent_change_24h.as_deref(),
            ChangeWindow::SevenDays => self.percent_change_7d.as_deref(),
        }
    }

    pub fn trend(&self, window: ChangeWindow) -> Trend {
        Trend::from_change(self.change(window))
    }

    /// Date de dernière mise à jour côté API
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        let seconds: i64 = self.last_updated.as_deref()?.trim().parse().ok()?;
        DateTime::from_timestamp(seconds, 0)
    }

    /// Correspondance exacte (insensible à la casse) sur symbole, id ou nom
    pub fn matches_exactly(&self, needle_lower: &str) -> bool {
        self.symbol.to_lowercase() == needle_lower
            || self.id.to_lowercase() == needle_lower
            || self.name.to_lowercase() == needle_lower
    }

    fn field_in(&self, prefix: &str, currency: Currency, usd: &Option<String>) -> Option<String> {
        if !currency.needs_conversion() {
            return usd.clone();
        }
        let key = format!("{}{}", prefix, currency.code().to_lowercase());
        value_to_string(self.converted.get(&key)?)
    }
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Désérialisation tolérante : "123.4" ou 123.4 ou null
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.map(|r| match r {
        RawNumber::Text(s) => s,
        RawNumber::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN_EUR: &str = r#"{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "BTC",
        "rank": "1",
        "price_usd": "9250.12",
        "price_btc": "1.0",
        "24h_volume_usd": "7500000000.0",
        "market_cap_usd": "157000000000",
        "available_supply": "17000000.0",
        "total_supply": "17000000.0",
        "max_supply": null,
        "percent_change_1h": "0.12",
        "percent_change_24h": "-1.5",
        "percent_change_7d": 3.2,
        "last_updated": "1525137271",
        "price_eur": "7650.5",
        "24h_volume_eur": "6200000000.0",
        "market_cap_eur": "130000000000"
    }"#;

    #[test]
    fn test_deserialize_ticker() {
        let ticker: TickerRecord = serde_json::from_str(BITCOIN_EUR).unwrap();

        assert_eq!(ticker.id, "bitcoin");
        assert_eq!(ticker.volume_24h_usd.as_deref(), Some("7500000000.0"));
        assert_eq!(ticker.max_supply, None);
        // Nombre JSON accepté et converti en chaîne
        assert_eq!(ticker.percent_change_7d.as_deref(), Some("3.2"));
        assert!(ticker.converted.contains_key("price_eur"));
    }

    #[test]
    fn test_missing_optional_fields() {
        let ticker: TickerRecord =
            serde_json::from_str(r#"{"id":"x","name":"X","symbol":"X"}"#).unwrap();
        assert_eq!(ticker.price_usd, None);
        assert!(ticker.converted.is_empty());
    }

    #[test]
    fn test_converted_fields() {
        let ticker: TickerRecord = serde_json::from_str(BITCOIN_EUR).unwrap();

        assert_eq!(ticker.price_in(Currency::Eur).as_deref(), Some("7650.5"));
        assert_eq!(ticker.market_cap_in(Currency::Eur).as_deref(), Some("130000000000"));
        assert_eq!(ticker.price_in(Currency::Usd).as_deref(), Some("9250.12"));
        // Pas de champ price_gbp : pas de repli sur le prix USD
        assert_eq!(ticker.price_in(Currency::Gbp), None);
        assert_eq!(ticker.volume_24h_in(Currency::Gbp), None);
        assert_eq!(ticker.market_cap_in(Currency::Gbp), None);
    }

    #[test]
    fn test_trend() {
        let ticker: TickerRecord = serde_json::from_str(BITCOIN_EUR).unwrap();

        assert_eq!(ticker.trend(ChangeWindow::OneHour), Trend::Up);
        assert_eq!(ticker.trend(ChangeWindow::OneDay), Trend::Down);
        assert_eq!(Trend::from_change(Some(0.0)), Trend::Down);
        assert_eq!(Trend::from_change(None), Trend::Down);
    }

    #[test]
    fn test_last_updated_at() {
        let ticker: TickerRecord = serde_json::from_str(BITCOIN_EUR).unwrap();
        let date = ticker.last_updated_at().unwrap();
        assert_eq!(date.timestamp(), 1525137271);
    }

    #[test]
    fn test_matches_exactly() {
        let ticker = TickerRecord::new("bitcoin", "Bitcoin", "BTC");
        assert!(ticker.matches_exactly("btc"));
        assert!(ticker.matches_exactly("bitcoin"));
        assert!(!ticker.matches_exactly("coin"));
    }
}
