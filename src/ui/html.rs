// ============================================================================
// HtmlBuilder - Rendu HTML de la liste des tickers
// ============================================================================
// Fonction pure : mêmes tickers + mêmes options = même chaîne, octet pour
// octet. Aucun appel externe, aucun état modifié.
//
// CONCEPT RUST : String building
// - push_str pour concaténer sans réallouer à chaque étape
// - format! pour les morceaux avec interpolation
// ============================================================================

use crate::models::{ChangeWindow, Currency, TickerRecord, Trend};

/// Placeholder affiché quand la recherche ne trouve rien
pub const NOT_FOUND_PLACEHOLDER: &str =
    r#"<div class="placeholder">Cryptocurrency not found :(</div>"#;

/// Valeur affichée pour un champ absent
const MISSING: &str = "N/A";

const TRUNCATION_NOTICE: &str = r#"<li class="coin"><div class="truncation-notice"><span class="question"><abbr title="Results are truncated for performance reasons.">Think we're missing something?</abbr></span><br><span class="hint"><abbr title="Use the search function.">Seek and you shall find.</abbr></span></div></li>"#;

/// Options de rendu (une couche, fusionnée comme les options de requête)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Devise des blocs prix/marché (USD si absente)
    pub currency: Option<Currency>,

    /// Ajoute l'encart "résultats tronqués" en fin de liste
    pub trunc_info_block: Option<bool>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_trunc_info_block(mut self, enabled: bool) -> Self {
        self.trunc_info_block = Some(enabled);
        self
    }

    fn merge(&self, later: &BuildOptions) -> BuildOptions {
        BuildOptions {
            currency: later.currency.or(self.currency),
            trunc_info_block: later.trunc_info_block.or(self.trunc_info_block),
        }
    }
}

/// Générateur de fragments HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlBuilder {
    options: BuildOptions,
}

impl HtmlBuilder {
    /// Crée un builder avec des options d'instance
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Construit la liste `<ul class="coins">` des tickers
    pub fn build(&self, data: &[TickerRecord], options: &BuildOptions) -> String {
        let options = self.options.merge(options);
        let currency = options.currency.unwrap_or_default();

        let mut html = String::from(r#"<ul class="coins">"#);
        for ticker in data {
            html.push_str(&render_ticker(ticker, currency));
        }

        if options.trunc_info_block.unwrap_or(false) {
            html.push_str(TRUNCATION_NOTICE);
        }

        html.push_str("</ul>");
        html
    }
}

/// Un <li> complet pour un ticker
fn render_ticker(ticker: &TickerRecord, currency: Currency) -> String {
    let symbol = escape(&ticker.symbol);
    let code = currency.code();

    let mut html = String::from(r#"<li class="coin">"#);

    // Header
    html.push_str(&format!(
        r#"<div class="header"><span class="coin-name">{}</span><span class="coin-symbol">{}</span></div>"#,
        escape(&ticker.name),
        symbol
    ));

    html.push_str(r#"<div class="market">"#);

    // Prix
    html.push_str(r#"<div class="cat cat-price"><span class="title">Price</span>"#);
    html.push_str(&elem("Fiat", ticker.price_in(currency).as_deref(), code));
    html.push_str(&elem("Crypto", ticker.price_btc.as_deref(), "BTC"));
    html.push_str("</div>");

    // Marché
    html.push_str(r#"<div class="cat cat-market"><span class="title">Market</span>"#);
    html.push_str(&elem("24h Volume", ticker.volume_24h_in(currency).as_deref(), code));
    html.push_str(&elem("Market Cap", ticker.market_cap_in(currency).as_deref(), code));
    html.push_str(&elem("Available Supply", ticker.available_supply.as_deref(), &symbol));
    html.push_str(&elem("Total Supply", ticker.total_supply.as_deref(), &symbol));
    html.push_str("</div>");

    // Variations
    html.push_str(r#"<div class="cat cat-change"><span class="title">Change</span>"#);
    for window in ChangeWindow::ALL {
        html.push_str(&change_elem(ticker, window));
    }
    html.push_str("</div>");

    html.push_str("</div></li>");
    html
}

/// `unit` est déjà échappé par l'appelant quand il vient du ticker
fn elem(label: &str, value: Option<&str>, unit: &str) -> String {
    format!(
        r#"<div class="elem"><span class="label">{}</span><span class="value">{}</span><span class="currency">{}</span></div>"#,
        label,
        escape(value.unwrap_or(MISSING)),
        unit
    )
}

fn change_elem(ticker: &TickerRecord, window: ChangeWindow) -> String {
    let trend = ticker.trend(window);
    let arrow = match trend {
        Trend::Up => "&uarr;",
        Trend::Down => "&darr;",
    };

    format!(
        r#"<div class="elem"><span class="label">{}</span><span class="value">{}</span><span class="unit">%</span><span class="arrow arrow-{}">{}</span></div>"#,
        window.label(),
        escape(ticker.change_text(window).unwrap_or(MISSING)),
        trend.label(),
        arrow
    )
}

/// Document HTML complet autour d'un fragment (fichier de sortie)
///
/// La page se recharge toute seule pour suivre les réécritures du fichier.
pub fn page(fragment: &str, currency: Currency) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="5">
<title>lazycoin ({})</title>
<style>
body {{ font-family: sans-serif; background: #1d1f21; color: #c5c8c6; }}
ul.coins {{ list-style: none; padding: 0; }}
li.coin {{ border-bottom: 1px solid #373b41; padding: 8px 0; }}
.coin-symbol {{ margin-left: 8px; color: #81a2be; }}
.cat {{ display: inline-block; vertical-align: top; margin-right: 24px; }}
.title {{ font-weight: bold; }}
.elem .label {{ margin-right: 6px; color: #969896; }}
.arrow-up {{ color: #b5bd68; }}
.arrow-down {{ color: #cc6666; }}
.placeholder {{ padding: 16px; text-align: center; }}
</style>
</head>
<body>
{}
</body>
</html>
"#,
        currency.code(),
        fragment
    )
}

/// Échappe les caractères spéciaux HTML d'un texte
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bitcoin() -> TickerRecord {
        let mut ticker = TickerRecord::new("bitcoin", "Bitcoin", "BTC");
        ticker.price_usd = Some("9250.12".to_string());
        ticker.price_btc = Some("1.0".to_string());
        ticker.percent_change_1h = Some("0.5".to_string());
        ticker.percent_change_24h = Some("-1.5".to_string());
        ticker.percent_change_7d = Some("0".to_string());
        ticker
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = HtmlBuilder::default();
        let data = vec![bitcoin(), TickerRecord::new("ethereum", "Ethereum", "ETH")];
        let options = BuildOptions::new().with_currency(Currency::Eur);

        assert_eq!(builder.build(&data, &options), builder.build(&data, &options));
    }

    #[test]
    fn test_change_indicators() {
        let html = HtmlBuilder::default().build(&[bitcoin()], &BuildOptions::new());

        let one_hour = html.find(">1h<").unwrap();
        let one_day = html.find(">24h<").unwrap();
        let seven_days = html.find(">7d<").unwrap();

        assert!(html[one_hour..one_day].contains("arrow-up"));
        assert!(html[one_day..seven_days].contains("arrow-down"));
        // Zéro compte comme une baisse
        assert!(html[seven_days..].contains("arrow-down"));
    }

    #[test]
    fn test_truncation_block() {
        let builder = HtmlBuilder::new(BuildOptions::new().with_trunc_info_block(true));

        let with_notice = builder.build(&[bitcoin()], &BuildOptions::new());
        assert!(with_notice.contains("truncation-notice"));

        // L'option d'appel écrase l'option d'instance
        let without = builder.build(&[bitcoin()], &BuildOptions::new().with_trunc_info_block(false));
        assert!(!without.contains("truncation-notice"));
    }

    #[test]
    fn test_wraps_in_list_and_uses_currency() {
        let html = HtmlBuilder::default().build(
            &[bitcoin()],
            &BuildOptions::new().with_currency(Currency::Chf),
        );

        assert!(html.starts_with(r#"<ul class="coins">"#));
        assert!(html.ends_with("</ul>"));
        assert!(html.contains(r#"<span class="currency">CHF</span>"#));
        assert!(html.contains(r#"<span class="coin-name">Bitcoin</span>"#));
    }

    #[test]
    fn test_missing_values_and_escaping() {
        let ticker = TickerRecord::new("x", "<script>", "A&B");
        let html = HtmlBuilder::default().build(&[ticker], &BuildOptions::new());

        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(html.contains(MISSING));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_list() {
        let html = HtmlBuilder::default().build(&[], &BuildOptions::new());
        assert_eq!(html, r#"<ul class="coins"></ul>"#);
    }

    #[test]
    fn test_page_wraps_fragment() {
        let html = page(NOT_FOUND_PLACEHOLDER, Currency::Eur);
        assert!(html.contains(NOT_FOUND_PLACEHOLDER));
        assert!(html.contains("<title>lazycoin (EUR)</title>"));
    }
}
