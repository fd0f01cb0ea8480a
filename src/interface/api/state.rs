//! Shared handler state

use crate::application::CallOrchestrator;
use crate::config::{Config, TelephonyConfig};
use crate::domain::campaign::target::CallTarget;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<CallOrchestrator>,
    /// Targets of the most recently started session, used for stats
    pub selected: Arc<RwLock<Arc<[CallTarget]>>>,
    pub telephony: Arc<TelephonyConfig>,
    pub recent_calls_limit: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<CallOrchestrator>, config: &Config) -> Self {
        Self {
            orchestrator,
            selected: Arc::new(RwLock::new(Arc::from(Vec::new()))),
            telephony: Arc::new(config.telephony.clone()),
            recent_calls_limit: config.dialer.recent_calls_limit,
        }
    }

    pub async fn selected_targets(&self) -> Arc<[CallTarget]> {
        self.selected.read().await.clone()
    }
}
