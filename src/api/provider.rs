// ============================================================================
// Structure : Provider
// ============================================================================
// Ajoute une couche de cache au-dessus du Connector
//
// Le cache a deux emplacements :
// - current : résultat du dernier remplissage réussi
// - previous : l'ancien current, conservé au remplissage suivant
//
// CONCEPT RUST : Ownership exclusif
// - Le Provider possède son cache, personne d'autre n'a de &mut dessus
// - Les lecteurs reçoivent des clones (Vec<TickerRecord>), jamais une
//   référence mutable vers l'intérieur
// - store (et donc fill_cache) prend &mut self : un seul écrivain, garanti à
//   la compilation
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::api::Connector;
use crate::error::{CoinError, Result};
use crate::models::{DisplayOptions, RequestOptions, TickerRecord};

/// Cache à deux emplacements
#[derive(Debug, Clone, Default)]
struct TickerCache {
    current: Vec<TickerRecord>,
    previous: Vec<TickerRecord>,
    filled_at: Option<Instant>,
}

impl TickerCache {
    /// current → previous, puis data → current (une seule étape)
    fn store(&mut self, data: Vec<TickerRecord>) {
        self.previous = std::mem::replace(&mut self.current, data);
        self.filled_at = Some(Instant::now());
    }
}

/// Fournisseur de tickers avec cache
#[derive(Debug)]
pub struct Provider {
    connector: Connector,
    cache: TickerCache,
}

impl Provider {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            cache: TickerCache::default(),
        }
    }

    /// Envoie une requête, met en cache le résultat si `cache` est vrai
    ///
    /// En cas d'échec, le cache n'est pas touché et l'erreur du Connector
    /// est propagée telle quelle.
    pub async fn send_request(&mut self, options: &RequestOptions) -> Result<Vec<TickerRecord>> {
        let defaults = RequestOptions::new().with_cache(false).with_limit(0);
        let options = defaults.merge(options);
        let cache = options.cache.unwrap_or(false);

        let data = self.connector.send_request(&options).await?;

        if cache {
            self.store(data.clone());
        }

        Ok(data)
    }

    /// Requête détachée du Provider, pour un appelant qui veut continuer à
    /// lire le cache pendant qu'elle est en vol
    ///
    /// Le cache n'est pas touché : le résultat passe ensuite par `store`.
    pub fn fetch(
        &self,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Vec<TickerRecord>>> + 'static {
        let connector = self.connector.clone();
        let options = options.clone();
        async move { connector.send_request(&options).await }
    }

    /// Remplace le cache par le résultat d'un `fetch` réussi
    pub fn store(&mut self, data: Vec<TickerRecord>) {
        debug!(
            current = self.cache.current.len(),
            incoming = data.len(),
            "Replacing cached tickers"
        );
        self.cache.store(data);
    }

    /// Remplit le cache
    pub async fn fill_cache(&mut self, options: &RequestOptions) -> Result<Vec<TickerRecord>> {
        let options = options.clone().with_cache(true);
        let data = self.send_request(&options).await?;
        info!(tickers = data.len(), "Cache filled");
        Ok(data)
    }

    /// Lit le cache, tronqué à `display_limit` si > 0
    ///
    /// # Erreurs
    /// `CoinError::CacheEmpty` si aucun remplissage n'a encore réussi
    pub fn retrieve_cached(&self, display: DisplayOptions) -> Result<Vec<TickerRecord>> {
        if self.cache.current.is_empty() {
            return Err(CoinError::CacheEmpty);
        }

        let data = match display.effective_limit() {
            Some(limit) => self.cache.current.iter().take(limit).cloned().collect(),
            None => self.cache.current.clone(),
        };

        Ok(data)
    }

    /// Lit le cache en le rafraîchissant s'il est vide ou trop vieux
    ///
    /// Le cache est considéré périmé quand son dernier remplissage date de
    /// plus de `max_age`.
    pub async fn query(
        &mut self,
        options: &RequestOptions,
        display: DisplayOptions,
        max_age: Duration,
    ) -> Result<Vec<TickerRecord>> {
        let stale = match self.cache.filled_at {
            Some(filled_at) => filled_at.elapsed() > max_age,
            None => true,
        };

        if stale || self.cache.current.is_empty() {
            debug!(stale, "Cache needs a refill before query");
            self.fill_cache(options).await?;
        }

        self.retrieve_cached(display)
    }

    /// Tickers du dernier remplissage
    pub fn current(&self) -> &[TickerRecord] {
        &self.cache.current
    }

    /// Tickers du remplissage précédent
    pub fn previous(&self) -> &[TickerRecord] {
        &self.cache.previous
    }

    pub fn is_empty(&self) -> bool {
        self.cache.current.is_empty()
    }

    /// Instant du dernier remplissage réussi
    pub fn last_filled(&self) -> Option<Instant> {
        self.cache.filled_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tickers_json(symbols: &[(&str, &str, &str)]) -> String {
        let items: Vec<String> = symbols
            .iter()
            .map(|(id, name, symbol)| {
                format!(r#"{{"id":"{}","name":"{}","symbol":"{}"}}"#, id, name, symbol)
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    async fn provider_for(server: &MockServer) -> Provider {
        let connector = Connector::new().unwrap().with_base_url(server.uri());
        Provider::new(connector)
    }

    #[tokio::test]
    async fn test_retrieve_cached_on_empty_cache() {
        let server = MockServer::start().await;
        let provider = provider_for(&server).await;

        let err = provider.retrieve_cached(DisplayOptions::unlimited()).unwrap_err();
        assert!(matches!(err, CoinError::CacheEmpty));
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn test_fill_then_retrieve_with_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(tickers_json(&[
                ("bitcoin", "Bitcoin", "BTC"),
                ("ethereum", "Ethereum", "ETH"),
                ("ripple", "Ripple", "XRP"),
            ])))
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        provider.fill_cache(&RequestOptions::new()).await.unwrap();

        let limited = provider.retrieve_cached(DisplayOptions::limited(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].symbol, "BTC");
        assert_eq!(limited[1].symbol, "ETH");

        let larger = provider.retrieve_cached(DisplayOptions::limited(50)).unwrap();
        assert_eq!(larger.len(), 3);

        let all = provider.retrieve_cached(DisplayOptions::limited(-1)).unwrap();
        assert_eq!(all.len(), 3);
        assert!(provider.last_filled().is_some());
    }

    #[tokio::test]
    async fn test_send_request_without_cache_flag_leaves_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(tickers_json(&[("bitcoin", "Bitcoin", "BTC")])),
            )
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        let data = provider.send_request(&RequestOptions::new()).await.unwrap();

        assert_eq!(data.len(), 1);
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_leaves_cache_until_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(tickers_json(&[("bitcoin", "Bitcoin", "BTC")])),
            )
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        let pending = provider.fetch(&RequestOptions::new());

        // Le cache reste lisible pendant que la requête est en vol
        assert!(provider.is_empty());
        let data = pending.await.unwrap();
        assert!(provider.is_empty());

        provider.store(data);
        assert_eq!(provider.current().len(), 1);
        assert!(provider.last_filled().is_some());
    }

    #[tokio::test]
    async fn test_two_fills_shift_current_to_previous() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("limit", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(tickers_json(&[("bitcoin", "Bitcoin", "BTC")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(tickers_json(&[
                ("ethereum", "Ethereum", "ETH"),
                ("ripple", "Ripple", "XRP"),
            ])))
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        let first = provider
            .fill_cache(&RequestOptions::new().with_limit(1))
            .await
            .unwrap();
        let second = provider
            .fill_cache(&RequestOptions::new().with_limit(2))
            .await
            .unwrap();

        assert_eq!(provider.current(), second.as_slice());
        assert_eq!(provider.previous(), first.as_slice());
    }

    #[tokio::test]
    async fn test_failed_fill_keeps_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("limit", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(tickers_json(&[("bitcoin", "Bitcoin", "BTC")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        provider
            .fill_cache(&RequestOptions::new().with_limit(1))
            .await
            .unwrap();
        let err = provider
            .fill_cache(&RequestOptions::new().with_limit(2))
            .await
            .unwrap_err();

        assert!(matches!(err, CoinError::HttpStatus { .. }));
        assert_eq!(provider.current().len(), 1);
        assert!(provider.previous().is_empty());
    }

    #[tokio::test]
    async fn test_query_uses_fresh_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(tickers_json(&[("bitcoin", "Bitcoin", "BTC")])),
            )
            // Premier query : remplissage. Second query : cache frais, pas d'appel
            .expect(1)
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        let options = RequestOptions::new();
        let hour = Duration::from_secs(3600);

        let first = provider.query(&options, DisplayOptions::unlimited(), hour).await.unwrap();
        let second = provider.query(&options, DisplayOptions::unlimited(), hour).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_query_refills_stale_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(tickers_json(&[("bitcoin", "Bitcoin", "BTC")])),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut provider = provider_for(&server).await;
        let options = RequestOptions::new();

        provider.query(&options, DisplayOptions::unlimited(), Duration::ZERO).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        provider.query(&options, DisplayOptions::unlimited(), Duration::ZERO).await.unwrap();

        assert!(!provider.previous().is_empty());
    }
}
