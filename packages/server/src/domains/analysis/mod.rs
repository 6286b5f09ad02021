//! URL analysis domain: result model, pipeline orchestration, history.

pub mod history;
pub mod models;
pub mod pipeline;

pub use history::{BaseHistoryStore, InMemoryHistoryStore, PostgresHistoryStore};
pub use models::{
    ActivityEntry, AnalysisReport, AnalysisResult, GeoInfo, HistoryRecord, HostLocation,
    RiskLevel, VendorResult, VerdictReport,
};
pub use pipeline::{AnalysisPipeline, PipelineError};
