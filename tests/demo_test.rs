use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use showrun::demo::{DemoRequest, DemoResponse, DemoService};
use showrun::engine::mock::MockEngine;
use showrun::engine::{AutomationResult, Engine};
use showrun::extract::Extractor;
use showrun::relay::{NullTransport, Relay, Transport};
use showrun::runs::RunRegistry;
use showrun::task::Task;

/// Transport that records every delivery.
struct RecordingTransport {
    peer: Option<String>,
    deliveries: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingTransport {
    fn with_peer(identity: &str) -> Arc<Self> {
        Arc::new(Self {
            peer: Some(identity.to_string()),
            deliveries: Mutex::new(Vec::new()),
        })
    }

    fn deliveries(&self) -> Vec<(String, serde_json::Value)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn resolve_peer(&self) -> Option<String> {
        self.peer.clone()
    }

    async fn call(
        &self,
        _destination: &str,
        method: &str,
        payload: serde_json::Value,
        _timeout: Duration,
    ) -> Result<String> {
        self.deliveries
            .lock()
            .unwrap()
            .push((method.to_string(), payload));
        Ok(String::new())
    }
}

/// Extractor that returns a canned instruction block.
struct CannedExtractor(&'static str);

#[async_trait]
impl Extractor for CannedExtractor {
    async fn extract_usage(&self, _text: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

fn service_with(engine: Arc<dyn Engine>, transport: Arc<dyn Transport>) -> DemoService {
    DemoService::new(engine, Arc::new(RunRegistry::new()), Relay::new(transport))
}

fn started(response: DemoResponse) -> showrun::demo::StartedDemo {
    match response {
        DemoResponse::Started(started) => started,
        DemoResponse::Failed { error } => panic!("demo failed to start: {}", error),
    }
}

// ── Start-and-relay orchestration ─────────────────────────────────

#[tokio::test(start_paused = true)]
async fn live_url_published_at_two_seconds_is_picked_up_promptly() {
    let engine = Arc::new(
        MockEngine::new()
            .with_live_url("https://live.example/run", Duration::from_secs(2))
            .with_run_duration(Duration::from_secs(3600)),
    );
    let service = service_with(engine, Arc::new(NullTransport));

    let before = tokio::time::Instant::now();
    let response = started(service.start(&Task::new("show the dashboard")).await);

    assert!(response.success);
    assert_eq!(response.live_url.as_deref(), Some("https://live.example/run"));
    let elapsed = before.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed <= Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn response_is_bounded_by_the_polling_budget_not_the_run() {
    // The run takes an hour and never produces a live URL; the caller still
    // hears back right after the 15s polling budget.
    let engine = Arc::new(MockEngine::new().with_run_duration(Duration::from_secs(3600)));
    let service = service_with(engine, Arc::new(NullTransport));

    let before = tokio::time::Instant::now();
    let response = started(service.start(&Task::new("slow task")).await);

    assert!(response.success);
    assert!(response.live_url.is_none());
    assert_eq!(before.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn obtained_url_is_relayed_to_the_peer() {
    let engine = Arc::new(
        MockEngine::new().with_live_url("https://live.example/run", Duration::from_secs(1)),
    );
    let transport = RecordingTransport::with_peer("viewer");
    let service = service_with(engine, transport.clone());

    started(service.start(&Task::new("show the dashboard")).await);

    let deliveries = transport.deliveries();
    assert_eq!(deliveries.len(), 1);
    let (method, payload) = &deliveries[0];
    assert_eq!(method, "presentDemoToUser");
    assert_eq!(payload["liveUrl"], "https://live.example/run");
    assert_eq!(payload["type"], "demo");
}

#[tokio::test(start_paused = true)]
async fn missing_url_means_nothing_is_relayed() {
    let engine = Arc::new(MockEngine::new());
    let transport = RecordingTransport::with_peer("viewer");
    let service = service_with(engine, transport.clone());

    let response = started(service.start(&Task::new("task")).await);

    assert!(response.live_url.is_none());
    assert!(transport.deliveries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn no_peer_still_yields_a_success_response_with_the_url() {
    let engine = Arc::new(
        MockEngine::new().with_live_url("https://live.example/run", Duration::from_secs(1)),
    );
    let service = service_with(engine, Arc::new(NullTransport));

    let response = started(service.start(&Task::new("task")).await);

    assert!(response.success);
    assert_eq!(response.live_url.as_deref(), Some("https://live.example/run"));
}

#[tokio::test(start_paused = true)]
async fn preflight_failure_is_reported_without_polling() {
    let engine = Arc::new(MockEngine::new().with_preflight_error("missing credentials"));
    let service = service_with(engine.clone(), Arc::new(NullTransport));

    let before = tokio::time::Instant::now();
    let response = service.start(&Task::new("task")).await;

    match response {
        DemoResponse::Failed { error } => assert!(error.contains("missing credentials")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(before.elapsed(), Duration::ZERO);
    assert_eq!(engine.executions(), 0);
}

#[tokio::test(start_paused = true)]
async fn sequential_runs_never_see_each_others_urls() {
    let registry = Arc::new(RunRegistry::new());

    let engine_a = Arc::new(
        MockEngine::new().with_live_url("https://live.example/run-a", Duration::ZERO),
    );
    let service_a = DemoService::new(engine_a, registry.clone(), Relay::new(Arc::new(NullTransport)));
    let response_a = started(service_a.start(&Task::new("run a")).await);
    assert_eq!(response_a.live_url.as_deref(), Some("https://live.example/run-a"));

    // Run B's engine never publishes a URL; polling must come up empty
    // rather than seeing run A's value.
    let engine_b = Arc::new(MockEngine::new());
    let service_b = DemoService::new(engine_b, registry, Relay::new(Arc::new(NullTransport)));
    let response_b = started(service_b.start(&Task::new("run b")).await);
    assert!(response_b.live_url.is_none());
}

#[tokio::test]
async fn started_response_serializes_to_the_wire_shape() {
    let engine = Arc::new(
        MockEngine::new().with_live_url("https://live.example/run", Duration::ZERO),
    );
    let service = service_with(engine, Arc::new(NullTransport));

    let response = service.start(&Task::new("task")).await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["live_url"], "https://live.example/run");
    assert!(json["run_id"].is_string());
}

// ── Demo creation (run to completion) ─────────────────────────────

#[tokio::test(start_paused = true)]
async fn create_waits_for_the_terminal_state() {
    let engine = Arc::new(
        MockEngine::new()
            .with_live_url("https://live.example/run", Duration::from_secs(1))
            .with_run_duration(Duration::from_secs(120))
            .with_result(AutomationResult::completed("done", Some("workflow created".into()))),
    );
    let service = service_with(engine, Arc::new(NullTransport));

    let report = service
        .create(DemoRequest {
            task: "create a workflow".to_string(),
            ..DemoRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(report.message, "Demo created successfully");
    assert_eq!(report.task, "create a workflow");
    assert_eq!(report.live_url.as_deref(), Some("https://live.example/run"));
    assert!(report.automation_result.success);
    assert_eq!(
        report.automation_result.final_result.as_deref(),
        Some("workflow created")
    );
}

#[tokio::test(start_paused = true)]
async fn create_reports_unsuccessful_automation_without_erroring() {
    let engine = Arc::new(
        MockEngine::new()
            .with_result(AutomationResult::failed("automation failed", "element not found")),
    );
    let service = service_with(engine, Arc::new(NullTransport));

    let report = service
        .create(DemoRequest {
            task: "task".to_string(),
            ..DemoRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(report.message, "Demo created but automation failed");
    assert!(!report.automation_result.success);
    assert_eq!(
        report.automation_result.error.as_deref(),
        Some("element not found")
    );
}

#[tokio::test(start_paused = true)]
async fn create_folds_extracted_instructions_into_the_task() {
    let engine = Arc::new(MockEngine::new());
    let service = service_with(engine.clone(), Arc::new(NullTransport))
        .with_extractor(Arc::new(CannedExtractor("1. Open settings\n2. Enable it")));

    let report = service
        .create(DemoRequest {
            task: "demo the feature".to_string(),
            feature_name: Some("bulk import".to_string()),
            docs: Some(("feature.md".to_string(), "# Bulk import\n...".to_string())),
        })
        .await
        .unwrap();

    let executed = engine.last_task().unwrap();
    assert!(executed.starts_with("demo the feature"));
    assert!(executed.contains("Feature Usage Instructions:\n1. Open settings"));

    // The echoed task stays the original; the extras land in their own fields.
    assert_eq!(report.task, "demo the feature");
    assert_eq!(report.uploaded_file.as_deref(), Some("feature.md"));
    assert_eq!(
        report.feature_usage_instructions.as_deref(),
        Some("1. Open settings\n2. Enable it")
    );
    assert_eq!(report.feature_name.as_deref(), Some("bulk import"));
}

#[tokio::test]
async fn create_with_docs_but_no_extractor_is_a_configuration_error() {
    let engine = Arc::new(MockEngine::new());
    let service = service_with(engine.clone(), Arc::new(NullTransport));

    let result = service
        .create(DemoRequest {
            task: "task".to_string(),
            feature_name: None,
            docs: Some(("feature.md".to_string(), "# Feature\n...".to_string())),
        })
        .await;

    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("no extractor configured")
    );
    assert_eq!(engine.executions(), 0);
}

#[tokio::test]
async fn create_propagates_launch_failure() {
    let engine = Arc::new(MockEngine::new().with_preflight_error("missing credentials"));
    let service = service_with(engine, Arc::new(NullTransport));

    let result = service
        .create(DemoRequest {
            task: "task".to_string(),
            ..DemoRequest::default()
        })
        .await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("missing credentials"));
}
