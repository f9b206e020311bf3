// ============================================================================
// RateFeed : flux du cours SOL/USD
// ============================================================================
// Maintient le cours courant et le rafraîchit périodiquement :
//
//   succès  : cotation + jitter (±2$) → plancher → accepté, persisté, notifié
//   échec   : dernier cours persisté + jitter (±1$) → plancher → notifié,
//             mais JAMAIS persisté (une estimation n'est pas une vérité)
//   échec sans cache : rien ne change, aucune notification
//
// Dans tous les cas la tentative suivante est planifiée après le délai fixe
// (15 minutes par défaut). Le délai fixe sert aussi de mécanisme de retry.
//
// CONCEPTS RUST :
// 1. Observer pattern : callbacks enregistrés via subscribe()
// 2. tokio::spawn : la boucle de rafraîchissement est une tâche possédée,
//    arrêtable via FeedHandle::shutdown()
// 3. tokio::sync::watch : accesseur en lecture du cours courant
// ============================================================================

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::QuoteSource;
use crate::models::{Rate, RateOrigin, RateUpdate};
use crate::storage::RateCache;

// ============================================================================
// Jitter : micro-volatilité simulée
// ============================================================================

/// Source de perturbation pseudo-aléatoire
pub trait Jitter: Send {
    /// Retourne une valeur dans [-amplitude, +amplitude]
    fn sample(&mut self, amplitude: f64) -> f64;
}

/// Jitter uniforme basé sur `rand`
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Jitter reproductible (même graine → même séquence)
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Jitter for RandomJitter {
    fn sample(&mut self, amplitude: f64) -> f64 {
        if amplitude.is_nan() || amplitude <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-amplitude..=amplitude)
    }
}

// ============================================================================
// Configuration du flux
// ============================================================================

/// Paramètres du flux de prix
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Délai entre deux tentatives
    pub refresh_interval: Duration,

    /// Plancher appliqué à chaque nouvelle valeur
    pub floor: Rate,

    /// Amplitude du jitter après une cotation réussie (en dollars)
    pub success_jitter: f64,

    /// Amplitude du jitter sur le cours de repli (en dollars)
    pub fallback_jitter: f64,

    /// Cours initial en mémoire avant toute restauration
    pub initial: Rate,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(15 * 60),
            floor: Rate::FLOOR,
            success_jitter: 2.0,
            fallback_jitter: 1.0,
            initial: Rate::DEFAULT,
        }
    }
}

/// Résultat d'une tentative de rafraîchissement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshOutcome {
    /// Cotation reçue : cours accepté et persisté
    Accepted(Rate),

    /// Échec, estimation depuis le cache : notifiée mais non persistée
    Fallback(Rate),

    /// Échec sans cache : cours inchangé, pas de notification
    Unchanged,
}

/// Callback de notification
pub type Subscriber = Box<dyn FnMut(RateUpdate) + Send>;

// ============================================================================
// RateFeed
// ============================================================================

/// Flux du cours : seul propriétaire (et seul écrivain) du cours courant
pub struct RateFeed {
    source: Box<dyn QuoteSource>,
    cache: RateCache,
    jitter: Box<dyn Jitter>,
    config: FeedConfig,
    current: watch::Sender<Rate>,
    subscribers: Vec<Subscriber>,
}

impl RateFeed {
    pub fn new(
        source: Box<dyn QuoteSource>,
        cache: RateCache,
        jitter: Box<dyn Jitter>,
        config: FeedConfig,
    ) -> Self {
        let (current, _) = watch::channel(config.initial);
        Self {
            source,
            cache,
            jitter,
            config,
            current,
            subscribers: Vec::new(),
        }
    }

    /// Enregistre un observateur appelé à chaque cours émis
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(RateUpdate) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Cours courant en mémoire
    pub fn current_rate(&self) -> Rate {
        *self.current.borrow()
    }

    /// Restaure le cours persisté, le notifie, puis lance la boucle
    ///
    /// Doit être appelé depuis un runtime tokio (utilise tokio::spawn).
    /// Le FeedHandle retourné donne accès au cours courant.
    pub fn initialize(mut self) -> FeedHandle {
        match self.restore() {
            Some(rate) => info!(rate = rate.value(), "Restored cached rate"),
            None => info!(rate = self.current_rate().value(), "No cached rate, using default"),
        }
        self.start()
    }

    /// Lit le cours persisté et l'adopte s'il est bien formé
    pub fn restore(&mut self) -> Option<Rate> {
        let cached = self.cache.load()?;
        let rate = Rate::at_least(cached.value(), self.config.floor);
        self.publish(RateUpdate::new(rate, RateOrigin::Cache));
        Some(rate)
    }

    /// Une tentative de rafraîchissement (ne retourne jamais d'erreur)
    pub async fn refresh_cycle(&mut self) -> RefreshOutcome {
        match self.source.fetch_quote().await {
            Ok(quote) => {
                let noise = self.jitter.sample(self.config.success_jitter);
                let rate = Rate::at_least(quote + noise, self.config.floor);

                // Une erreur d'écriture ne remet pas en cause le cours reçu
                if let Err(e) = self.cache.save(rate) {
                    warn!(error = ?e, "Failed to persist accepted rate");
                }

                info!(quote, rate = rate.value(), "Accepted new rate from feed");
                self.publish(RateUpdate::new(rate, RateOrigin::Feed));
                RefreshOutcome::Accepted(rate)
            }
            Err(e) => {
                warn!(error = %e, network = e.is_network(), "Quote fetch failed");

                match self.cache.load() {
                    Some(saved) => {
                        let noise = self.jitter.sample(self.config.fallback_jitter);
                        let rate = Rate::at_least(saved.value() + noise, self.config.floor);

                        info!(saved = saved.value(), rate = rate.value(), "Using fallback estimate");
                        self.publish(RateUpdate::new(rate, RateOrigin::Fallback));
                        RefreshOutcome::Fallback(rate)
                    }
                    None => {
                        debug!(rate = self.current_rate().value(), "No cached rate, keeping current");
                        RefreshOutcome::Unchanged
                    }
                }
            }
        }
    }

    /// Lance la boucle de rafraîchissement dans une tâche tokio
    ///
    /// La première tentative est immédiate. Chaque tentative se termine
    /// avant que la suivante soit planifiée : deux cycles ne se chevauchent
    /// jamais.
    pub fn start(mut self) -> FeedHandle {
        let rate = self.current.subscribe();
        let interval = self.config.refresh_interval;

        let task = tokio::spawn(async move {
            loop {
                let outcome = self.refresh_cycle().await;
                debug!(?outcome, next_in = ?interval, "Refresh cycle complete");
                tokio::time::sleep(interval).await;
            }
        });

        FeedHandle { rate, task }
    }

    /// Met à jour le cours courant PUIS notifie les observateurs
    fn publish(&mut self, update: RateUpdate) {
        self.current.send_replace(update.rate);
        for subscriber in self.subscribers.iter_mut() {
            subscriber(update);
        }
    }
}

// ============================================================================
// FeedHandle
// ============================================================================

/// Poignée sur la boucle de rafraîchissement lancée
pub struct FeedHandle {
    rate: watch::Receiver<Rate>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Dernier cours émis (ou cours initial)
    pub fn current_rate(&self) -> Rate {
        *self.rate.borrow()
    }

    /// Arrête la boucle (la tentative en cours est abandonnée)
    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::error::FeedError;
    use crate::storage::{KeyValueStore, RATE_KEY};

    // ------------------------------------------------------------------------
    // Fakes
    // ------------------------------------------------------------------------

    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Quote(f64),
        Malformed,
        Unavailable,
    }

    /// Source scriptée : rejoue les réponses, puis échoue indéfiniment
    struct ScriptedSource {
        replies: Mutex<VecDeque<Reply>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(replies: &[Reply]) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                replies: Mutex::new(replies.iter().copied().collect()),
                calls: calls.clone(),
            };
            (source, calls)
        }
    }

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        async fn fetch_quote(&self) -> Result<f64, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Unavailable);
            match reply {
                Reply::Quote(q) => Ok(q),
                Reply::Malformed => Err(FeedError::MalformedPayload("missing field solana.usd".into())),
                Reply::Unavailable => Err(FeedError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            }
        }
    }

    /// Stockage partagé : le test garde un accès après que le feed l'a pris
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<HashMap<String, String>>>);

    impl SharedStore {
        fn with_rate(raw: &str) -> Self {
            let store = Self::default();
            store.0.lock().unwrap().insert(RATE_KEY.to_string(), raw.to_string());
            store
        }

        fn rate_text(&self) -> Option<String> {
            self.0.lock().unwrap().get(RATE_KEY).cloned()
        }
    }

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    /// Jitter fixe : `factor` × amplitude
    struct FixedJitter(f64);

    impl Jitter for FixedJitter {
        fn sample(&mut self, amplitude: f64) -> f64 {
            self.0 * amplitude
        }
    }

    type Notifications = Arc<Mutex<Vec<RateUpdate>>>;

    fn feed_with(replies: &[Reply], store: SharedStore, jitter: f64) -> (RateFeed, Notifications) {
        let (source, _) = ScriptedSource::new(replies);
        let mut feed = RateFeed::new(
            Box::new(source),
            RateCache::new(Box::new(store)),
            Box::new(FixedJitter(jitter)),
            FeedConfig::default(),
        );

        let seen: Notifications = Arc::default();
        let sink = seen.clone();
        feed.subscribe(move |update| sink.lock().unwrap().push(update));
        (feed, seen)
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_is_jittered_persisted_and_notified() {
        let store = SharedStore::default();
        let (mut feed, seen) = feed_with(&[Reply::Quote(150.0)], store.clone(), 1.0);

        let outcome = feed.refresh_cycle().await;

        let expected = Rate::new(152.0).unwrap();
        assert_eq!(outcome, RefreshOutcome::Accepted(expected));
        assert_eq!(feed.current_rate(), expected);
        assert_eq!(store.rate_text().as_deref(), Some("152"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].rate, expected);
        assert_eq!(seen[0].origin, RateOrigin::Feed);
    }

    #[tokio::test]
    async fn test_success_below_floor_is_clamped() {
        let store = SharedStore::default();
        let (mut feed, _) = feed_with(&[Reply::Quote(42.0)], store.clone(), -1.0);

        assert_eq!(feed.refresh_cycle().await, RefreshOutcome::Accepted(Rate::FLOOR));
        assert!(feed.current_rate() >= Rate::FLOOR);
        assert_eq!(store.rate_text().as_deref(), Some("100"));
    }

    #[tokio::test]
    async fn test_failure_with_cache_falls_back_without_persisting() {
        let store = SharedStore::with_rate("150");
        let (mut feed, seen) = feed_with(&[Reply::Malformed], store.clone(), -1.0);

        let outcome = feed.refresh_cycle().await;

        let expected = Rate::new(149.0).unwrap();
        assert_eq!(outcome, RefreshOutcome::Fallback(expected));
        assert_eq!(feed.current_rate(), expected);
        assert_eq!(store.rate_text().as_deref(), Some("150"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].origin, RateOrigin::Fallback);
        assert_eq!(seen[0].rate, expected);
    }

    #[tokio::test]
    async fn test_fallback_respects_floor() {
        let store = SharedStore::with_rate("100.2");
        let (mut feed, _) = feed_with(&[Reply::Unavailable], store.clone(), -1.0);

        assert_eq!(feed.refresh_cycle().await, RefreshOutcome::Fallback(Rate::FLOOR));
        assert_eq!(store.rate_text().as_deref(), Some("100.2"));
    }

    #[tokio::test]
    async fn test_failure_without_cache_changes_nothing() {
        let store = SharedStore::default();
        let (mut feed, seen) = feed_with(&[Reply::Unavailable], store.clone(), 1.0);

        assert_eq!(feed.refresh_cycle().await, RefreshOutcome::Unchanged);
        assert_eq!(feed.current_rate(), Rate::DEFAULT);
        assert!(seen.lock().unwrap().is_empty());
        assert!(store.rate_text().is_none());
    }

    #[tokio::test]
    async fn test_fallback_uses_last_accepted_rate() {
        let store = SharedStore::default();
        let (mut feed, _) = feed_with(&[Reply::Quote(150.0), Reply::Unavailable], store.clone(), 1.0);

        feed.refresh_cycle().await;
        assert_eq!(store.rate_text().as_deref(), Some("152"));

        // 152 (persisté) + 1 (jitter de repli)
        assert_eq!(feed.refresh_cycle().await, RefreshOutcome::Fallback(Rate::new(153.0).unwrap()));
        assert_eq!(store.rate_text().as_deref(), Some("152"));
    }

    #[test]
    fn test_restore_adopts_cached_rate() {
        let (mut feed, seen) = feed_with(&[], SharedStore::with_rate("155.5"), 0.0);

        assert_eq!(feed.restore().map(|r| r.value()), Some(155.5));
        assert_eq!(feed.current_rate().value(), 155.5);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].origin, RateOrigin::Cache);
    }

    #[test]
    fn test_restore_ignores_malformed_cache() {
        let (mut feed, seen) = feed_with(&[], SharedStore::with_rate("NaN"), 0.0);

        assert!(feed.restore().is_none());
        assert_eq!(feed.current_rate(), Rate::DEFAULT);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loop_keeps_scheduling_after_failures() {
        let (source, calls) = ScriptedSource::new(&[Reply::Unavailable, Reply::Malformed]);
        let config = FeedConfig {
            refresh_interval: Duration::from_millis(10),
            ..FeedConfig::default()
        };
        let feed = RateFeed::new(
            Box::new(source),
            RateCache::new(Box::new(SharedStore::default())),
            Box::new(FixedJitter(0.0)),
            config,
        );

        let handle = feed.initialize();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert!(!handle.is_finished());
        assert_eq!(handle.current_rate(), Rate::DEFAULT);

        handle.shutdown();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_handle_sees_accepted_rate() {
        let (source, _) = ScriptedSource::new(&[Reply::Quote(170.0)]);
        let feed = RateFeed::new(
            Box::new(source),
            RateCache::new(Box::new(SharedStore::default())),
            Box::new(FixedJitter(0.0)),
            FeedConfig::default(),
        );

        let handle = feed.initialize();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(handle.current_rate().value(), 170.0);
        handle.shutdown();
    }

    #[test]
    fn test_random_jitter_is_bounded() {
        let mut jitter = RandomJitter::seeded(7);
        for _ in 0..1000 {
            let noise = jitter.sample(2.0);
            assert!((-2.0..=2.0).contains(&noise));
        }
        assert_eq!(jitter.sample(0.0), 0.0);
    }
}
