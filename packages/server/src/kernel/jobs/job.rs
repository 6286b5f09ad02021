//! Job model for background analysis execution.

use serde::Serialize;
use uuid::Uuid;

use crate::domains::analysis::models::HistoryRecord;

/// Lifecycle state of an analysis job. Transitions only
/// Processing→Complete or Processing→Error; terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Processing,
    Complete,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// One in-flight or completed analysis request.
///
/// Serialization is the poller-facing snapshot shape: `{status, progress,
/// step, results?, message?}`. The id is the lookup key, not part of the
/// body.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    #[serde(skip)]
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: f32,
    pub step: String,
    #[serde(rename = "results", skip_serializing_if = "Option::is_none")]
    pub result: Option<HistoryRecord>,
    #[serde(rename = "message", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Job {
    /// Fresh job awaiting pipeline execution.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            progress: 0.0,
            step: "Request received".to_string(),
            result: None,
            error_message: None,
        }
    }

    /// Job born complete from a cached result; no pipeline ever runs.
    pub fn completed_from_cache(id: Uuid, record: HistoryRecord) -> Self {
        Self {
            id,
            status: JobStatus::Complete,
            progress: 1.0,
            step: "Request received".to_string(),
            result: Some(record),
            error_message: None,
        }
    }

    /// Record a stage boundary. Progress never decreases and terminal jobs
    /// never move.
    pub fn advance(&mut self, progress: f32, step: &str) {
        if self.status.is_terminal() {
            return;
        }
        self.progress = self.progress.max(progress);
        self.step = step.to_string();
    }

    pub fn complete(&mut self, record: HistoryRecord) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Complete;
        self.progress = 1.0;
        self.result = Some(record);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Error;
        self.error_message = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::analysis::models::{
        AnalysisReport, AnalysisResult, GeoInfo, RiskLevel,
    };
    use chrono::Utc;
    use std::collections::HashMap;

    fn sample_record() -> HistoryRecord {
        HistoryRecord {
            id: "r1".into(),
            result: AnalysisResult {
                request_url: "http://example.com".into(),
                screenshot_url: "/static/screenshots/x.png".into(),
                activity_log: vec![],
                report: AnalysisReport {
                    risk_level: RiskLevel::Info,
                    stats: HashMap::new(),
                    vendor_results: vec![],
                    summary: "ok".into(),
                    geo_info: GeoInfo::unavailable("No IP address found"),
                },
            },
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn new_job_starts_processing_at_zero() {
        let job = Job::new(Uuid::new_v4());
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.step, "Request received");
    }

    #[test]
    fn progress_never_decreases() {
        let mut job = Job::new(Uuid::new_v4());
        job.advance(0.6, "Analyzing with reputation service");
        job.advance(0.3, "Capturing screenshot");
        assert_eq!(job.progress, 0.6);
    }

    #[test]
    fn complete_sets_progress_to_exactly_one() {
        let mut job = Job::new(Uuid::new_v4());
        job.advance(0.8, "Generating AI summary");
        job.complete(sample_record());
        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.progress, 1.0);
        assert!(job.result.is_some());
    }

    #[test]
    fn terminal_jobs_ignore_further_transitions() {
        let mut job = Job::new(Uuid::new_v4());
        job.complete(sample_record());

        job.fail("too late");
        assert_eq!(job.status, JobStatus::Complete);
        assert!(job.error_message.is_none());

        job.advance(0.1, "Capturing screenshot");
        assert_eq!(job.progress, 1.0);
    }

    #[test]
    fn failed_job_keeps_message_and_stays_failed() {
        let mut job = Job::new(Uuid::new_v4());
        job.fail("unexpected error: boom");
        assert_eq!(job.status, JobStatus::Error);

        job.complete(sample_record());
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error_message.as_deref(), Some("unexpected error: boom"));
    }

    #[test]
    fn snapshot_shape_omits_id_and_empty_fields() {
        let job = Job::new(Uuid::new_v4());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["step"], "Request received");
        assert!(json.get("id").is_none());
        assert!(json.get("results").is_none());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn cached_job_is_complete_on_first_observation() {
        let job = Job::completed_from_cache(Uuid::new_v4(), sample_record());
        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.progress, 1.0);
        assert!(job.result.is_some());
    }
}
