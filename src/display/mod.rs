// ============================================================================
// Module : display
// ============================================================================
// Boucle d'affichage : garde le rendu synchronisé avec le cache
//
// PATTERN : Command queue avec un seul consommateur
// - Les timers (rafraîchissement, surveillance de la devise) et la saisie
//   de recherche envoient des DisplayCommand dans un channel
// - DisplayLoop traite une commande à la fois
// - Une requête HTTP en vol ne bloque pas la queue : son résultat est
//   appliqué au cache et rendu en une seule étape quand il arrive
// - Un changement de devise ne peut donc jamais s'intercaler entre le
//   remplissage du cache et le rendu qui le suit
// - Le rendu utilise la devise du cache, jamais une devise demandée dont
//   le remplissage n'a pas encore réussi
//
// CONCEPT RUST : Ownership au lieu de verrous
// - DisplayLoop possède le Provider par valeur
// - La requête en vol travaille sur un clone du Connector, le cache n'est
//   écrit que par DisplayLoop : pas de Mutex
// ============================================================================

pub mod search;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::Provider;
use crate::error::{CoinError, Result};
use crate::models::{Currency, DisplayOptions, RequestOptions, TickerRecord};
use crate::ui::html::{BuildOptions, HtmlBuilder, NOT_FOUND_PLACEHOLDER};

pub use search::{search, SearchOutcome};

/// Nombre de tickers affichés par défaut
pub const DEFAULT_DISPLAY_LIMIT: usize = 20;

/// Période de rafraîchissement du cache
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20);

/// Période de surveillance de la devise sélectionnée
pub const DEFAULT_CURRENCY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Intentions traitées par la boucle d'affichage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    /// Rafraîchir le cache puis le rendu
    Refresh,

    /// La devise sélectionnée a changé
    CurrencyChanged(Currency),

    /// Nouveau texte de recherche (peut être vide)
    Search(String),

    /// Arrêter la boucle
    Shutdown,
}

/// Nature du dernier rendu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Liste normale (tronquée à la limite d'affichage)
    Listing { truncated: bool },
    Exact,
    Partial,
    NotFound,
}

/// Ce qui est transmis au Renderer Host
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    /// Fragment HTML prêt à injecter
    pub markup: String,

    /// Tickers effectivement rendus
    pub records: Vec<TickerRecord>,

    pub currency: Currency,
    pub query: String,
    pub kind: ViewKind,
}

/// Contrat du Renderer Host
///
/// CONCEPT RUST : Trait comme point d'extension
/// - La boucle ne connaît pas le terminal, la fenêtre ou le fichier
/// - Les tests branchent un renderer qui enregistre les vues
pub trait Renderer {
    /// Reçoit un nouveau rendu
    fn render(&mut self, view: RenderedView);

    /// Un cycle a échoué ; le rendu précédent reste en place
    fn report_error(&mut self, _error: &CoinError) {}
}

/// Remplissage en vol dans `run`
struct PendingFill {
    currency: Currency,
    fetch: Pin<Box<dyn Future<Output = Result<Vec<TickerRecord>>>>>,
}

/// Suite à donner à une commande
enum Step {
    Done,
    Fill(Currency),
    Stop,
}

/// Boucle d'affichage
pub struct DisplayLoop<R> {
    provider: Provider,
    builder: HtmlBuilder,
    renderer: R,
    /// Devise sous laquelle le cache a été rempli, utilisée pour le rendu
    currency: Currency,
    /// Devise sélectionnée, pas encore forcément dans le cache
    requested: Currency,
    query: String,
    display_limit: usize,
}

impl<R: Renderer> DisplayLoop<R> {
    pub fn new(provider: Provider, renderer: R, currency: Currency, display_limit: usize) -> Self {
        Self {
            provider,
            builder: HtmlBuilder::default(),
            renderer,
            currency,
            requested: currency,
            query: String::new(),
            display_limit,
        }
    }

    /// Devise des données en cache (et donc du dernier rendu)
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Devise sélectionnée ; diffère de `currency()` tant qu'aucun
    /// remplissage n'a réussi pour elle
    pub fn requested_currency(&self) -> Currency {
        self.requested
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Rend le renderer (fin de boucle)
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Premier remplissage puis rendu de la liste
    pub async fn initialize(&mut self) -> Result<()> {
        let currency = self.requested;
        info!(%currency, "Initial cache fill");
        let result = self.provider.fetch(&fill_options(currency)).await;
        self.complete(currency, result)
    }

    /// Traite une commande jusqu'au bout, remplissage compris
    ///
    /// Retourne `Ok(false)` quand la boucle doit s'arrêter.
    pub async fn handle(&mut self, command: DisplayCommand) -> Result<bool> {
        match self.begin(command)? {
            Step::Done => Ok(true),
            Step::Stop => Ok(false),
            Step::Fill(currency) => {
                let result = self.provider.fetch(&fill_options(currency)).await;
                self.complete(currency, result)?;
                Ok(true)
            }
        }
    }

    /// Consomme les commandes une par une
    ///
    /// Un remplissage en cours ne bloque pas la queue : les recherches sont
    /// servies depuis le cache en attendant, et son résultat est appliqué
    /// (cache + rendu) d'un seul tenant quand il arrive. Un nouveau
    /// changement de devise remplace le remplissage en vol.
    ///
    /// `Shutdown` arrête immédiatement, en abandonnant un remplissage en vol.
    /// Quand tous les émetteurs sont fermés, la boucle attend d'abord la fin
    /// du remplissage en cours. Un échec est journalisé et signalé au
    /// renderer, sans interrompre la boucle.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<DisplayCommand>) -> R {
        let mut pending: Option<PendingFill> = None;
        let mut open = true;

        while open || pending.is_some() {
            tokio::select! {
                (currency, result) = wait_fill(&mut pending), if pending.is_some() => {
                    pending = None;
                    if let Err(e) = self.complete(currency, result) {
                        self.fail(&e);
                    }
                }
                command = commands.recv(), if open => match command {
                    None => {
                        debug!("Command queue closed");
                        open = false;
                    }
                    Some(command) => match self.begin(command) {
                        Ok(Step::Done) => {}
                        Ok(Step::Stop) => break,
                        Ok(Step::Fill(currency)) => self.start_fill(&mut pending, currency),
                        Err(e) => self.fail(&e),
                    },
                },
            }
        }

        self.renderer
    }

    /// Partie synchrone d'une commande
    fn begin(&mut self, command: DisplayCommand) -> Result<Step> {
        debug!(?command, "Display loop received command");

        match command {
            DisplayCommand::Refresh => Ok(Step::Fill(self.requested)),
            DisplayCommand::CurrencyChanged(currency) => {
                if currency == self.requested {
                    debug!(%currency, "Currency unchanged, ignoring");
                    return Ok(Step::Done);
                }
                info!(from = %self.requested, to = %currency, "Currency changed");
                self.requested = currency;
                Ok(Step::Fill(currency))
            }
            DisplayCommand::Search(query) => {
                self.query = query;
                self.render_dynamic()?;
                Ok(Step::Done)
            }
            DisplayCommand::Shutdown => {
                info!("Display loop shutting down");
                Ok(Step::Stop)
            }
        }
    }

    fn start_fill(&self, pending: &mut Option<PendingFill>, currency: Currency) {
        if let Some(fill) = pending.as_ref() {
            if fill.currency == currency {
                debug!(%currency, "Fill already in flight, skipping");
                return;
            }
            debug!(from = %fill.currency, to = %currency, "Dropping in-flight fill");
        }

        *pending = Some(PendingFill {
            currency,
            fetch: Box::pin(self.provider.fetch(&fill_options(currency))),
        });
    }

    /// Applique le résultat d'un remplissage
    ///
    /// Sur échec, ni le cache ni la devise du rendu ne changent ; la devise
    /// demandée reste en attente et le prochain `Refresh` la redemande.
    fn complete(&mut self, currency: Currency, result: Result<Vec<TickerRecord>>) -> Result<()> {
        let data = result?;
        info!(tickers = data.len(), %currency, "Cache filled");
        self.provider.store(data);
        self.currency = currency;
        self.render_dynamic()
    }

    fn fail(&mut self, error: &CoinError) {
        error!(error = %error, "Display cycle failed, keeping previous render");
        self.renderer.report_error(error);
    }

    /// Rendu de la liste tronquée, avec l'encart de troncature
    pub fn render_listing(&mut self) -> Result<()> {
        let display = DisplayOptions::from_count(self.display_limit);
        let records = self.provider.retrieve_cached(display)?;
        let truncated = records.len() < self.provider.current().len();

        let options = BuildOptions::new()
            .with_currency(self.currency)
            .with_trunc_info_block(true);
        let markup = self.builder.build(&records, &options);

        self.emit(markup, records, ViewKind::Listing { truncated });
        Ok(())
    }

    /// Rendu selon la recherche en cours (liste normale si vide)
    pub fn render_dynamic(&mut self) -> Result<()> {
        if self.query.is_empty() {
            return self.render_listing();
        }

        let all = self.provider.retrieve_cached(DisplayOptions::unlimited())?;
        let options = BuildOptions::new().with_currency(self.currency);

        match search(&all, &self.query, self.display_limit) {
            SearchOutcome::All => return self.render_listing(),
            SearchOutcome::Exact(ticker) => {
                let records = vec![ticker];
                let markup = self.builder.build(&records, &options);
                self.emit(markup, records, ViewKind::Exact);
            }
            SearchOutcome::Partial(records) => {
                let markup = self.builder.build(&records, &options);
                self.emit(markup, records, ViewKind::Partial);
            }
            SearchOutcome::NotFound => {
                self.emit(NOT_FOUND_PLACEHOLDER.to_string(), Vec::new(), ViewKind::NotFound);
            }
        }

        Ok(())
    }

    fn emit(&mut self, markup: String, records: Vec<TickerRecord>, kind: ViewKind) {
        debug!(records = records.len(), ?kind, "Rendering view");
        self.renderer.render(RenderedView {
            markup,
            records,
            currency: self.currency,
            query: self.query.clone(),
            kind,
        });
    }
}

fn fill_options(currency: Currency) -> RequestOptions {
    RequestOptions::new().with_currency(currency.code())
}

/// Attend le remplissage en vol (jamais prêt s'il n'y en a pas)
async fn wait_fill(pending: &mut Option<PendingFill>) -> (Currency, Result<Vec<TickerRecord>>) {
    match pending {
        Some(fill) => {
            let currency = fill.currency;
            let result = fill.fetch.as_mut().await;
            (currency, result)
        }
        None => std::future::pending().await,
    }
}

// ============================================================================
// Timers
// ============================================================================
// CONCEPT RUST : tokio::time::interval
// - Le premier tick est immédiat, on le consomme avant la boucle
// - Chaque timer s'arrête seul quand le channel est fermé
// ============================================================================

/// Envoie `Refresh` toutes les `period`
pub fn spawn_refresh_timer(
    commands: mpsc::UnboundedSender<DisplayCommand>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if commands.send(DisplayCommand::Refresh).is_err() {
                debug!("Refresh timer stopping (queue closed)");
                break;
            }
        }
    })
}

/// Compare la devise sélectionnée à la dernière vue toutes les `period`
///
/// `cell` est la cellule écrite par le host (sélecteur de devise).
pub fn spawn_currency_watch(
    commands: mpsc::UnboundedSender<DisplayCommand>,
    cell: watch::Receiver<Currency>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut observed = *cell.borrow();
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let current = *cell.borrow();
            if current == observed {
                continue;
            }

            debug!(from = %observed, to = %current, "Currency cell changed");
            observed = current;
            if commands.send(DisplayCommand::CurrencyChanged(current)).is_err() {
                warn!("Currency watch stopping (queue closed)");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_timer_sends_refresh() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_refresh_timer(tx, Duration::from_millis(10));

        let command = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(command, Some(DisplayCommand::Refresh));

        // Fermer la queue arrête le timer
        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_currency_watch_reports_changes_only() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (cell_tx, cell_rx) = watch::channel(Currency::Usd);
        let _handle = spawn_currency_watch(tx, cell_rx, Duration::from_millis(10));

        // Aucun changement : rien pendant quelques périodes
        let nothing = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(nothing.is_err());

        cell_tx.send(Currency::Eur).unwrap();
        let command = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(command, Some(DisplayCommand::CurrencyChanged(Currency::Eur)));
    }
}
