// ============================================================================
// API Client : CoinMarketCap
// ============================================================================
// Récupère les tickers depuis l'API publique CoinMarketCap (v1)
//
// Un seul appel GET par requête : pas de retry, pas de timeout par défaut.
// Les options sont fusionnées en couches puis validées avant tout appel
// réseau : une devise invalide ne quitte jamais la machine.
//
// CONCEPTS RUST :
// 1. async/await : l'appel HTTP est le seul point de suspension
// 2. Result<T, CoinError> : erreurs typées, propagées avec ?
// 3. #[serde(untagged)] : la réponse peut avoir plusieurs formes
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::error::{CoinError, Result};
use crate::models::{Currency, RequestOptions, SanitizedOptions, TickerRecord};

/// Endpoint par défaut de l'API
pub const DEFAULT_BASE_URL: &str = "https://api.coinmarketcap.com/v1/ticker/";

const USER_AGENT: &str = concat!("lazycoin/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Formes possibles de la réponse JSON
// ============================================================================
// - Liste de tickers (cas normal, et aussi pour un id précis)
// - {"error": "id not found"} quand l'id est inconnu
// - Un ticker seul (toléré, normalisé en liste d'un élément)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TickerResponse {
    Many(Vec<TickerRecord>),
    Failure { error: String },
    One(Box<TickerRecord>),
}

/// Connecteur vers l'API : construit l'URL et envoie la requête
#[derive(Debug, Clone)]
pub struct Connector {
    client: reqwest::Client,
    base_url: String,
    /// Options d'instance, fusionnées entre les défauts et les options d'appel
    options: RequestOptions,
}

impl Connector {
    /// Crée un connecteur avec les options par défaut
    pub fn new() -> Result<Self> {
        Self::with_options(RequestOptions::default())
    }

    /// Crée un connecteur avec des options d'instance
    pub fn with_options(options: RequestOptions) -> Result<Self> {
        Self::build(options, None)
    }

    /// Crée un connecteur dont chaque requête expire après `timeout`
    pub fn with_timeout(options: RequestOptions, timeout: Duration) -> Result<Self> {
        Self::build(options, Some(timeout))
    }

    fn build(options: RequestOptions, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            options,
        })
    }

    /// Remplace l'endpoint (serveur de test, miroir)
    ///
    /// L'URL est normalisée pour finir par un seul '/'.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fusionne défauts ← options d'instance ← options d'appel, puis valide
    ///
    /// # Erreurs
    /// `CoinError::UnsupportedCurrency` si la devise n'est pas dans la liste
    pub fn build_options(&self, raw: &RequestOptions) -> Result<SanitizedOptions> {
        let defaults = RequestOptions::new()
            .with_limit(0)
            .with_currency(Currency::Usd.code());
        let merged = defaults.merge(&self.options).merge(raw);

        // Limite : entier positif (valeur absolue)
        let limit = merged.limit.unwrap_or(0).unsigned_abs();

        // Devise : chaîne vide traitée comme absente
        let currency = match merged.currency.as_deref() {
            Some(code) if !code.is_empty() => code.parse::<Currency>()?,
            _ => Currency::Usd,
        };

        let id = merged.id.filter(|id| !id.is_empty());

        Ok(SanitizedOptions {
            limit,
            currency,
            fetch_single: id.is_some(),
            convert_currency: currency.needs_conversion(),
            id,
        })
    }

    /// Construit l'URL de la requête (fonction pure des options)
    ///
    /// Ordre : base, puis "{id}/", puis limit, puis convert.
    pub fn build_request_url(&self, options: &SanitizedOptions) -> String {
        let mut url = self.base_url.clone();

        if options.fetch_single {
            if let Some(id) = &options.id {
                url.push_str(id);
                url.push('/');
            }
        }

        let mut params = Vec::new();
        if options.limit > 0 {
            params.push(format!("limit={}", options.limit));
        }
        if options.convert_currency {
            params.push(format!("convert={}", options.currency.code()));
        }

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        url
    }

    /// Envoie une requête et retourne les tickers
    ///
    /// # Erreurs
    /// - `UnsupportedCurrency` : avant tout appel réseau
    /// - `Network` : échec de transport
    /// - `HttpStatus` : statut non 2xx
    /// - `Api` : l'API a répondu {"error": ...}
    /// - `Parse` : JSON invalide
    #[instrument(
        skip(self, raw),
        fields(currency = tracing::field::Empty, limit = tracing::field::Empty)
    )]
    pub async fn send_request(&self, raw: &RequestOptions) -> Result<Vec<TickerRecord>> {
        let options = self.build_options(raw)?;
        tracing::Span::current()
            .record("currency", options.currency.code())
            .record("limit", options.limit);

        let url = self.build_request_url(&options);
        debug!(url = %url, "Built CoinMarketCap API URL");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "CoinMarketCap returned error status");
            return Err(CoinError::HttpStatus { status, url });
        }

        // Body lu entièrement d'abord : une coupure ici est une erreur réseau,
        // un JSON invalide ensuite est une erreur de parsing
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Parsing JSON response");

        let tickers = match serde_json::from_slice::<TickerResponse>(&body)? {
            TickerResponse::Many(tickers) => tickers,
            TickerResponse::One(ticker) => vec![*ticker],
            TickerResponse::Failure { error } => {
                error!(api_error = %error, "CoinMarketCap returned an error body");
                return Err(CoinError::Api(error));
            }
        };

        info!(tickers = tickers.len(), "Successfully fetched tickers");
        Ok(tickers)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
