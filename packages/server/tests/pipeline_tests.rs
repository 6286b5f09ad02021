//! Orchestration tests: the pipeline drives mock collaborators and every
//! outcome lands in the job store with the right classification.

mod common;

use std::time::Duration;

use common::{harness, harness_with_timeout, PipelineHarness, TestServices};
use server_core::domains::analysis::{GeoInfo, RiskLevel};
use server_core::kernel::jobs::{AnalysisRequest, Job, JobStatus};
use server_core::kernel::test_dependencies::{
    verdict_report, StaticNetworkIntel, StaticRenderer, StaticReputation,
};
use server_core::kernel::NO_THREAT_SUMMARY;
use uuid::Uuid;

/// Create the job the way the submit path does, then run its pipeline.
async fn submit_and_run(harness: &PipelineHarness, url: &str) -> Uuid {
    let job_id = Uuid::new_v4();
    harness.jobs.insert(Job::new(job_id)).await;
    harness
        .pipeline
        .execute(AnalysisRequest {
            job_id,
            url: url.to_string(),
        })
        .await;
    job_id
}

#[tokio::test]
async fn benign_url_completes_with_info_risk_and_canned_summary() {
    let harness = harness(TestServices::benign());
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.progress, 1.0);

    let record = job.result.unwrap();
    assert_eq!(record.result.request_url, "http://example.com");
    assert_eq!(record.result.report.risk_level, RiskLevel::Info);
    assert_eq!(record.result.report.stats["harmless"], 58);
    assert_eq!(record.result.report.summary, NO_THREAT_SUMMARY);
    assert_eq!(
        record.result.screenshot_url,
        format!("/static/screenshots/{}.png", job_id)
    );
    assert!(matches!(
        record.result.report.geo_info,
        GeoInfo::Located(_)
    ));

    // Clean verdicts must not reach the upstream model.
    assert_eq!(harness.services.summarizer.upstream_call_count(), 0);
    assert_eq!(harness.services.history.len().await, 1);
}

#[tokio::test]
async fn malicious_url_reports_high_risk_and_invokes_summarizer() {
    let services = TestServices::benign().with_reputation(StaticReputation::with_report(
        verdict_report(2, 50, Some("93.184.216.34")),
    ));
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://malware.test").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);

    let record = job.result.unwrap();
    assert_eq!(record.result.report.risk_level, RiskLevel::High);
    assert_eq!(harness.services.summarizer.upstream_call_count(), 1);
}

#[tokio::test]
async fn network_intel_failure_degrades_but_job_still_completes() {
    let services = TestServices::benign().with_network_intel(StaticNetworkIntel::unavailable());
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);

    let record = job.result.unwrap();
    assert_eq!(
        record.result.report.geo_info,
        GeoInfo::unavailable("Could not retrieve Shodan data.")
    );
}

#[tokio::test]
async fn missing_ip_records_marker_without_intel_lookup() {
    let services = TestServices::benign()
        .with_reputation(StaticReputation::with_report(verdict_report(0, 58, None)));
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(
        job.result.unwrap().result.report.geo_info,
        GeoInfo::unavailable("No IP address found")
    );
    assert_eq!(harness.services.network_intel.call_count(), 0);
}

#[tokio::test]
async fn domain_resolution_fallback_feeds_intel_lookup() {
    let services = TestServices::benign().with_reputation(
        StaticReputation::with_report(verdict_report(0, 58, None)).with_resolved_ip("203.0.113.7"),
    );
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(harness.services.network_intel.call_count(), 1);
    assert!(matches!(
        job.result.unwrap().result.report.geo_info,
        GeoInfo::Located(_)
    ));
}

#[tokio::test]
async fn failed_report_fetch_fails_job_without_cache_or_history_writes() {
    let services = TestServices::benign().with_reputation(StaticReputation::failing_report());
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("unexpected error:"));
    assert!(job.result.is_none());

    assert!(harness.cache.get("http://example.com").await.is_none());
    assert!(harness.services.history.is_empty().await);
}

#[tokio::test]
async fn navigation_failure_is_classified_as_unreachable_url() {
    let services = TestServices::benign().with_renderer(StaticRenderer::failing_navigation());
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://no-such-host.invalid").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("URL unreachable or invalid:"));
    assert!(harness.services.history.is_empty().await);
}

#[tokio::test]
async fn provision_failure_is_classified_as_unexpected() {
    let services = TestServices::benign().with_renderer(StaticRenderer::failing_provision());
    let harness = harness(services);
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("unexpected error:"));
}

#[tokio::test]
async fn completed_analysis_populates_the_result_cache() {
    let harness = harness(TestServices::benign());
    submit_and_run(&harness, "http://example.com").await;

    let cached = harness.cache.get("http://example.com").await.unwrap();
    assert_eq!(cached.result.request_url, "http://example.com");

    // Exact-string keying: a trailing slash is a different URL.
    assert!(harness.cache.get("http://example.com/").await.is_none());
}

#[tokio::test]
async fn polled_progress_is_monotonic_and_ends_at_one() {
    let services = TestServices::benign().with_reputation(
        StaticReputation::with_report(verdict_report(0, 58, Some("93.184.216.34")))
            .with_report_delay(Duration::from_millis(100)),
    );
    let harness = harness(services);

    let job_id = Uuid::new_v4();
    harness.jobs.insert(Job::new(job_id)).await;

    let pipeline = harness.pipeline.clone();
    let run = tokio::spawn(async move {
        pipeline
            .execute(AnalysisRequest {
                job_id,
                url: "http://example.com".to_string(),
            })
            .await;
    });

    let mut observed = Vec::new();
    loop {
        let job = harness.jobs.snapshot(&job_id).await.unwrap();
        observed.push(job.progress);
        if job.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    run.await.unwrap();

    assert!(
        observed.windows(2).all(|pair| pair[0] <= pair[1]),
        "progress went backwards: {:?}",
        observed
    );
    assert!(observed.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(*observed.last().unwrap(), 1.0);
}

#[tokio::test]
async fn stalled_stage_times_out_and_fails_the_job() {
    let services = TestServices::benign().with_reputation(
        StaticReputation::with_report(verdict_report(0, 58, None))
            .with_report_delay(Duration::from_secs(30)),
    );
    let harness = harness_with_timeout(services, Duration::from_millis(50));
    let job_id = submit_and_run(&harness, "http://example.com").await;

    let job = harness.jobs.snapshot(&job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error_message.as_deref().unwrap().contains("timed out"));
    assert!(harness.services.history.is_empty().await);
}
