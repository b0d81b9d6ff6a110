use std::sync::Arc;

use codeword_backend::infra::state::build_state;
use codeword_backend::state::app_state::AppState;
use codeword_backend::store::GameStore;
use codeword_backend::AppConfig;

use super::notifier::RecordingNotifier;

/// Seeded config so board layouts are reproducible across runs.
pub fn test_config() -> AppConfig {
    AppConfig {
        rng_seed: Some(0x5eed),
        ..AppConfig::default()
    }
}

/// App state over a fresh in-memory store, with a notifier that records
/// every push.
pub fn build_test_state() -> (AppState, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = build_state()
        .with_config(test_config())
        .with_notifier(notifier.clone())
        .build()
        .expect("build test state");
    (state, notifier)
}

/// Like [`build_test_state`] over a caller-supplied store.
pub fn build_test_state_with_store(
    store: Arc<dyn GameStore>,
) -> (AppState, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = build_state()
        .with_config(test_config())
        .with_store(store)
        .with_notifier(notifier.clone())
        .build()
        .expect("build test state");
    (state, notifier)
}
