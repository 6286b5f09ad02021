//! Bundled service dependencies handed to the analysis pipeline.

use std::sync::Arc;

use crate::domains::analysis::history::BaseHistoryStore;
use crate::kernel::traits::{
    BaseNetworkIntel, BaseRenderer, BaseReputationService, BaseSummarizer,
};

/// Shared handles to every external collaborator. Cloning is cheap; all
/// fields are `Arc`s.
#[derive(Clone)]
pub struct ServerDeps {
    pub reputation: Arc<dyn BaseReputationService>,
    pub network_intel: Arc<dyn BaseNetworkIntel>,
    pub summarizer: Arc<dyn BaseSummarizer>,
    pub renderer: Arc<dyn BaseRenderer>,
    pub history: Arc<dyn BaseHistoryStore>,
}

impl ServerDeps {
    pub fn new(
        reputation: Arc<dyn BaseReputationService>,
        network_intel: Arc<dyn BaseNetworkIntel>,
        summarizer: Arc<dyn BaseSummarizer>,
        renderer: Arc<dyn BaseRenderer>,
        history: Arc<dyn BaseHistoryStore>,
    ) -> Self {
        Self {
            reputation,
            network_intel,
            summarizer,
            renderer,
            history,
        }
    }
}
