// ============================================================================
// TerminalHost - Renderer Host de l'application
// ============================================================================
// Reçoit les rendus de la boucle d'affichage (thread worker) :
// 1. écrit la page HTML complète dans le fichier de sortie
// 2. met à jour l'état App partagé, lu par la boucle TUI
//
// CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
// - Arc : Reference counting pour ownership partagé
// - Mutex : accès exclusif temporaire, relâché à la fin du bloc
// ============================================================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::app::App;
use crate::display::{RenderedView, Renderer};
use crate::error::CoinError;
use crate::ui::html;

/// Renderer branché sur le terminal et le fichier HTML
pub struct TerminalHost {
    app: Arc<Mutex<App>>,
    output_path: Option<PathBuf>,
}

impl TerminalHost {
    /// `output_path` à None : pas de fichier, terminal uniquement
    pub fn new(app: Arc<Mutex<App>>, output_path: Option<PathBuf>) -> Self {
        Self { app, output_path }
    }

    /// Un thread qui a paniqué avec le verrou ne doit pas figer l'affichage
    fn lock(&self) -> MutexGuard<'_, App> {
        self.app.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_page(&self, view: &RenderedView) {
        let Some(path) = &self.output_path else {
            return;
        };

        let page = html::page(&view.markup, view.currency);
        match std::fs::write(path, page) {
            Ok(()) => debug!(path = %path.display(), "HTML page written"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write HTML page"),
        }
    }
}

impl Renderer for TerminalHost {
    fn render(&mut self, view: RenderedView) {
        self.write_page(&view);
        self.lock().apply_view(view);
    }

    fn report_error(&mut self, error: &CoinError) {
        self.lock().apply_error(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ViewKind;
    use crate::models::{Currency, TickerRecord};

    fn view() -> RenderedView {
        RenderedView {
            markup: r#"<ul class="coins"></ul>"#.to_string(),
            records: vec![TickerRecord::new("bitcoin", "Bitcoin", "BTC")],
            currency: Currency::Eur,
            query: String::new(),
            kind: ViewKind::Listing { truncated: false },
        }
    }

    #[test]
    fn test_render_updates_app_and_file() {
        let app = Arc::new(Mutex::new(App::default()));
        let path = std::env::temp_dir().join(format!("lazycoin-host-{}.html", std::process::id()));
        let mut host = TerminalHost::new(app.clone(), Some(path.clone()));

        host.render(view());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(r#"<ul class="coins"></ul>"#));
        assert!(written.contains("EUR"));
        assert_eq!(app.lock().unwrap().view.as_ref().unwrap().records.len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_report_error_keeps_view() {
        let app = Arc::new(Mutex::new(App::default()));
        let mut host = TerminalHost::new(app.clone(), None);

        host.render(view());
        host.report_error(&CoinError::CacheEmpty);

        let app = app.lock().unwrap();
        assert!(app.view.is_some());
        assert_eq!(app.last_error.as_deref(), Some("Le cache est vide"));
    }
}
