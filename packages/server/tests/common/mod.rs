#![allow(dead_code)]

//! Shared fixtures for integration tests: canned service bundles and a
//! pipeline harness wired against in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use server_core::domains::analysis::{AnalysisPipeline, InMemoryHistoryStore};
use server_core::kernel::jobs::{JobStore, ResultCache};
use server_core::kernel::test_dependencies::{
    verdict_report, CountingSummarizer, StaticNetworkIntel, StaticRenderer, StaticReputation,
};
use server_core::kernel::ServerDeps;

pub struct TestServices {
    pub renderer: Arc<StaticRenderer>,
    pub reputation: Arc<StaticReputation>,
    pub network_intel: Arc<StaticNetworkIntel>,
    pub summarizer: Arc<CountingSummarizer>,
    pub history: Arc<InMemoryHistoryStore>,
}

impl TestServices {
    /// Clean verdict (0 malicious / 58 harmless), resolvable IP, working
    /// renderer and intel.
    pub fn benign() -> Self {
        Self {
            renderer: Arc::new(StaticRenderer::ok()),
            reputation: Arc::new(StaticReputation::with_report(verdict_report(
                0,
                58,
                Some("93.184.216.34"),
            ))),
            network_intel: Arc::new(StaticNetworkIntel::located("Netherlands", "Amsterdam")),
            summarizer: Arc::new(CountingSummarizer::new()),
            history: Arc::new(InMemoryHistoryStore::new()),
        }
    }

    pub fn with_renderer(mut self, renderer: StaticRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_reputation(mut self, reputation: StaticReputation) -> Self {
        self.reputation = Arc::new(reputation);
        self
    }

    pub fn with_network_intel(mut self, network_intel: StaticNetworkIntel) -> Self {
        self.network_intel = Arc::new(network_intel);
        self
    }

    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.reputation.clone(),
            self.network_intel.clone(),
            self.summarizer.clone(),
            self.renderer.clone(),
            self.history.clone(),
        )
    }
}

pub struct PipelineHarness {
    pub jobs: Arc<JobStore>,
    pub cache: Arc<ResultCache>,
    pub pipeline: Arc<AnalysisPipeline>,
    pub services: TestServices,
}

pub fn harness(services: TestServices) -> PipelineHarness {
    harness_with_timeout(services, Duration::from_secs(5))
}

pub fn harness_with_timeout(services: TestServices, job_timeout: Duration) -> PipelineHarness {
    let jobs = Arc::new(JobStore::with_defaults());
    let cache = Arc::new(ResultCache::with_defaults());
    let pipeline = Arc::new(AnalysisPipeline::new(
        jobs.clone(),
        cache.clone(),
        services.deps(),
        job_timeout,
    ));

    PipelineHarness {
        jobs,
        cache,
        pipeline,
        services,
    }
}
