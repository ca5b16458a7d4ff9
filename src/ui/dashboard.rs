// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui :
// - header : titre, devise sélectionnée, heure du dernier rendu
// - barre de recherche
// - liste des tickers du dernier rendu
// - footer : raccourcis, confirmation de sortie ou dernière erreur
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Widgets : Block, Paragraph, List
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::display::ViewKind;
use crate::models::{ChangeWindow, Currency, TickerRecord, Trend};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

/// Header, recherche, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Recherche
            Constraint::Min(0),    // Liste : tout le reste
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" lazycoin ")
        .title_alignment(Alignment::Center);

    let updated = app
        .last_render_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "chargement...".to_string());

    let text = Line::from(vec![
        Span::raw("Devise : "),
        Span::styled(
            app.currency.code(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Mis à jour : "),
        Span::styled(updated, Style::default().fg(Color::Gray)),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Recherche ");

    let line = Line::from(vec![
        Span::styled(&app.search_input, Style::default().fg(Color::White)),
        Span::styled(
            "█", // Curseur
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Cryptomonnaies ");

    let message = match &app.view {
        None => Some("Chargement des données..."),
        Some(view) if view.kind == ViewKind::NotFound => Some("Cryptocurrency not found :("),
        Some(view) if view.records.is_empty() => Some("Aucune donnée"),
        Some(_) => None,
    };

    if let Some(message) = message {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let Some(view) = &app.view else {
        return;
    };

    // CONCEPT RUST : Iterator chaining
    // - .enumerate() ajoute l'index pour marquer la sélection
    let items: Vec<ListItem> = view
        .records
        .iter()
        .enumerate()
        .map(|(index, ticker)| {
            let style = match ticker.trend(ChangeWindow::OneDay) {
                Trend::Up => Style::default().fg(Color::Green),
                Trend::Down => Style::default().fg(Color::Red),
            };

            let item = ListItem::new(format_ticker(ticker, view.currency)).style(style);
            if index == app.selected_index {
                item.style(style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Format : " BTC      Bitcoin              9250.12 USD  ▲ 0.52%"
fn format_ticker(ticker: &TickerRecord, currency: Currency) -> String {
    let price = ticker
        .price_in(currency)
        .map(|p| format!("{} {}", p, currency.code()))
        .unwrap_or_else(|| "N/A".to_string());

    let change = match ticker.change(ChangeWindow::OneDay) {
        Some(c) => {
            let arrow = if c > 0.0 { "▲" } else { "▼" };
            format!("{} {:+.2}%", arrow, c)
        }
        None => String::new(),
    };

    // Tronque le nom à 20 caractères avec ellipse si nécessaire
    let name = if ticker.name.chars().count() <= 20 {
        ticker.name.clone()
    } else {
        let truncated: String = ticker.name.chars().take(19).collect();
        format!("{}…", truncated)
    };

    format!(" {:<8} {:<20} {:>22}  {}", ticker.symbol, name, price, change)
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", key),
            Span::styled(
                "[Échap]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠", key),
        ])
    } else if let Some(error) = &app.last_error {
        Line::from(Span::styled(
            format!("Erreur : {}", error),
            Style::default().fg(Color::Red),
        ))
    } else {
        let mut spans = vec![
            Span::styled("[Échap]", key),
            Span::raw(" Quit  "),
            Span::styled("[←→ / Tab]", key),
            Span::raw(" Devise  "),
            Span::styled("[↑↓]", key),
            Span::raw(" Navigate  "),
            Span::styled("[Ctrl+U]", key),
            Span::raw(" Effacer"),
        ];
        if app.is_truncated() {
            spans.push(Span::styled(
                "  (liste tronquée, utilisez la recherche)",
                Style::default().fg(Color::Gray),
            ));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ticker() {
        let mut ticker = TickerRecord::new("bitcoin", "Bitcoin", "BTC");
        ticker.price_usd = Some("9250.12".to_string());
        ticker.percent_change_24h = Some("-1.5".to_string());

        let line = format_ticker(&ticker, Currency::Usd);
        assert!(line.contains("BTC"));
        assert!(line.contains("9250.12 USD"));
        assert!(line.contains("▼ -1.50%"));
    }

    #[test]
    fn test_format_ticker_without_conversion() {
        let mut ticker = TickerRecord::new("bitcoin", "Bitcoin", "BTC");
        ticker.price_usd = Some("9250.12".to_string());

        let line = format_ticker(&ticker, Currency::Eur);
        assert!(line.contains("N/A"));
        assert!(!line.contains("9250.12"));
    }

    #[test]
    fn test_format_ticker_truncates_long_names() {
        let ticker = TickerRecord::new("x", "A very long cryptocurrency name", "X");
        let line = format_ticker(&ticker, Currency::Usd);
        assert!(line.contains("A very long cryptoc…"));
        assert!(line.contains("N/A"));
    }
}
