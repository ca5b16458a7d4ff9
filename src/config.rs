// ============================================================================
// Configuration
// ============================================================================
// Tous les réglages ont une valeur par défaut et peuvent être surchargés par
// des variables d'environnement (valeurs non vides uniquement) :
//
// - LAZYCOIN_API_URL           endpoint de l'API
// - LAZYCOIN_CURRENCY          devise initiale (ex: EUR)
// - LAZYCOIN_DISPLAY_LIMIT     nombre de tickers affichés
// - LAZYCOIN_REFRESH_SECS      période de rafraîchissement
// - LAZYCOIN_CURRENCY_POLL_MS  période de surveillance de la devise
// - LAZYCOIN_TIMEOUT_SECS      timeout HTTP (aucun par défaut)
// - LAZYCOIN_OUTPUT            fichier HTML généré
// - LAZYCOIN_LOG_DIR           répertoire des logs
// ============================================================================

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::display::{DEFAULT_CURRENCY_POLL_INTERVAL, DEFAULT_DISPLAY_LIMIT, DEFAULT_REFRESH_INTERVAL};
use crate::error::{CoinError, Result};
use crate::models::Currency;

const DEFAULT_OUTPUT: &str = "lazycoin.html";

/// Configuration complète de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub initial_currency: Currency,
    pub display_limit: usize,
    pub refresh_interval: Duration,
    pub currency_poll_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub output_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            initial_currency: Currency::Usd,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            currency_poll_interval: DEFAULT_CURRENCY_POLL_INTERVAL,
            request_timeout: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            log_dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Charge la configuration depuis l'environnement du process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration depuis une source de variables quelconque
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - Les tests passent une HashMap au lieu de modifier l'environnement
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = var("LAZYCOIN_API_URL") {
            config.api_base_url = url;
        }
        if let Some(code) = var("LAZYCOIN_CURRENCY") {
            config.initial_currency = code.trim().parse::<Currency>()?;
        }
        if let Some(limit) = var("LAZYCOIN_DISPLAY_LIMIT") {
            config.display_limit = parse_number("LAZYCOIN_DISPLAY_LIMIT", &limit)?;
        }
        if let Some(secs) = var("LAZYCOIN_REFRESH_SECS") {
            config.refresh_interval =
                Duration::from_secs(parse_positive("LAZYCOIN_REFRESH_SECS", &secs)?);
        }
        if let Some(millis) = var("LAZYCOIN_CURRENCY_POLL_MS") {
            config.currency_poll_interval =
                Duration::from_millis(parse_positive("LAZYCOIN_CURRENCY_POLL_MS", &millis)?);
        }
        if let Some(secs) = var("LAZYCOIN_TIMEOUT_SECS") {
            config.request_timeout =
                Some(Duration::from_secs(parse_positive("LAZYCOIN_TIMEOUT_SECS", &secs)?));
        }
        if let Some(path) = var("LAZYCOIN_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Some(dir) = var("LAZYCOIN_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

/// Répertoire des logs : ~/.local/share/lazycoin/logs sur Linux, ./logs sinon
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("lazycoin").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoinError::Config(format!("{} n'est pas un nombre valide : {:?}", name, value)))
}

/// Une période nulle ferait tourner les timers en boucle
fn parse_positive(name: &str, value: &str) -> Result<u64> {
    match parse_number::<u64>(name, value)? {
        0 => Err(CoinError::Config(format!("{} doit être strictement positif", name))),
        n => Ok(n),
    }
}
