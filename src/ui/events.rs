// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'interface
//
// Toutes les touches imprimables vont dans la barre de recherche : les
// actions passent donc par des touches non imprimables (flèches, Tab,
// Échap, Ctrl).
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (rafraîchissement de l'affichage)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Ctrl+C : sortie immédiate
pub fn is_interrupt_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    } else {
        false
    }
}

/// Échap : quitter (en deux temps)
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Ctrl+U : vider la recherche (comme dans un shell)
pub fn is_clear_search_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char('u') && key.modifiers.contains(KeyModifiers::CONTROL)
    } else {
        false
    }
}

pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up)
    } else {
        false
    }
}

pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down)
    } else {
        false
    }
}

/// → ou Tab : devise suivante
pub fn is_next_currency_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Right | KeyCode::Tab)
    } else {
        false
    }
}

/// ← ou Shift+Tab : devise précédente
pub fn is_previous_currency_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Left | KeyCode::BackTab)
    } else {
        false
    }
}

pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Caractère à ajouter à la recherche (sans Ctrl/Alt)
pub fn search_char(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_interrupt_and_escape() {
        assert!(is_interrupt_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_interrupt_event(&key(KeyCode::Char('c'), KeyModifiers::empty())));
        assert!(is_escape_event(&key(KeyCode::Esc, KeyModifiers::empty())));
        assert!(!is_escape_event(&Event::Tick));
    }

    #[test]
    fn test_search_char() {
        assert_eq!(search_char(&key(KeyCode::Char('q'), KeyModifiers::empty())), Some('q'));
        assert_eq!(search_char(&key(KeyCode::Char('B'), KeyModifiers::SHIFT)), Some('B'));
        assert_eq!(search_char(&key(KeyCode::Char('u'), KeyModifiers::CONTROL)), None);
        assert_eq!(search_char(&key(KeyCode::Enter, KeyModifiers::empty())), None);
    }

    #[test]
    fn test_currency_keys() {
        assert!(is_next_currency_event(&key(KeyCode::Tab, KeyModifiers::empty())));
        assert!(is_previous_currency_event(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert!(!is_next_currency_event(&key(KeyCode::Left, KeyModifiers::empty())));
    }
}
