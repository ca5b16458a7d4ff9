// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'interface terminal (le Renderer Host)
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Partage : App vit dans un Arc<Mutex<>>, écrite par le renderer (thread
//    worker) et lue par la boucle TUI (thread principal)
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use chrono::{DateTime, Local};

use crate::display::{RenderedView, ViewKind};
use crate::models::Currency;

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Texte de la barre de recherche
    pub search_input: String,

    /// Devise sélectionnée (remplace le menu "Convert Currency")
    pub currency: Currency,

    /// Dernier rendu reçu de la boucle d'affichage
    pub view: Option<RenderedView>,

    /// Heure du dernier rendu
    pub last_render_at: Option<DateTime<Local>>,

    /// Dernière erreur de cycle (effacée au rendu suivant)
    pub last_error: Option<String>,

    /// Index du ticker sélectionné dans la liste affichée
    pub selected_index: usize,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression d'Échap : confirm_quit = true
    /// - Deuxième pression d'Échap : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,
}

impl App {
    pub fn new(currency: Currency) -> Self {
        Self {
            running: true,
            search_input: String::new(),
            currency,
            view: None,
            last_render_at: None,
            last_error: None,
            selected_index: 0,
            confirm_quit: false,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    /// Ajoute un caractère à la recherche, retourne la nouvelle requête
    pub fn append_char(&mut self, c: char) -> String {
        self.search_input.push(c);
        self.search_input.clone()
    }

    /// Supprime le dernier caractère, retourne la nouvelle requête
    pub fn backspace(&mut self) -> String {
        self.search_input.pop();
        self.search_input.clone()
    }

    /// Vide la recherche
    pub fn clear_search(&mut self) -> String {
        self.search_input.clear();
        String::new()
    }

    // ========================================================================
    // Devise
    // ========================================================================

    /// Passe à la devise suivante et la retourne
    ///
    /// CONCEPT : Cycle d'états
    /// - USD → AUD → ... → ZAR → USD
    pub fn next_currency(&mut self) -> Currency {
        self.currency = self.currency.next();
        self.currency
    }

    pub fn previous_currency(&mut self) -> Currency {
        self.currency = self.currency.previous();
        self.currency
    }

    // ========================================================================
    // Rendus
    // ========================================================================

    /// Installe un nouveau rendu
    pub fn apply_view(&mut self, view: RenderedView) {
        let max_index = view.records.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
        self.view = Some(view);
        self.last_render_at = Some(Local::now());
        self.last_error = None;
    }

    /// Note un échec ; le rendu courant reste affiché
    pub fn apply_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    /// Vrai si la liste affichée est tronquée
    pub fn is_truncated(&self) -> bool {
        matches!(
            self.view.as_ref().map(|v| v.kind),
            Some(ViewKind::Listing { truncated: true })
        )
    }

    fn visible_len(&self) -> usize {
        self.view.as_ref().map(|v| v.records.len()).unwrap_or(0)
    }

    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.visible_len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
