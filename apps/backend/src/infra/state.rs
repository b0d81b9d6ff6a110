use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;

use crate::config::{AppConfig, ConfigError};
use crate::domain::board::BOARD_SIZE;
use crate::domain::words::WordPool;
use crate::error::AppError;
use crate::services::games::GameService;
use crate::state::app_state::AppState;
use crate::store::{GameStore, MemoryGameStore};
use crate::ws::hub::WsRegistry;
use crate::ws::notifier::{Notifier, WsNotifier};

/// Builder for creating AppState instances (used in both tests and main)
#[derive(Default)]
pub struct StateBuilder {
    config: AppConfig,
    store: Option<Arc<dyn GameStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    words: Option<WordPool>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the socket notifier, e.g. with a recording one in tests.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_words(mut self, words: WordPool) -> Self {
        self.words = Some(words);
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        let words = match (self.words, &self.config.words_file) {
            (Some(words), _) => words,
            (None, Some(path)) => WordPool::from_file(path).map_err(|source| {
                ConfigError::WordsFile {
                    path: path.clone(),
                    source,
                }
            })?,
            (None, None) => WordPool::builtin(),
        };
        if words.len() < BOARD_SIZE {
            return Err(ConfigError::TooFewWords {
                found: words.len(),
                needed: BOARD_SIZE,
            }
            .into());
        }

        let rng = match self.config.rng_seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_os_rng(),
        };

        let registry = Arc::new(WsRegistry::new());
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(WsNotifier::new(registry.clone())),
        };
        let store: Arc<dyn GameStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryGameStore::new()),
        };

        info!(
            words = words.len(),
            seeded = self.config.rng_seed.is_some(),
            conflict_retries = self.config.conflict_retries,
            "application state built"
        );

        let games = GameService::new(
            store,
            notifier,
            Arc::new(words),
            rng,
            self.config.conflict_retries,
        );
        Ok(AppState::new(Arc::new(games), registry, self.config))
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
