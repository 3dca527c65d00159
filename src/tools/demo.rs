use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::Tool;
use crate::demo::DemoService;
use crate::task::Task;

/// The voice-agent tool for "show me a demo": kicks off the configured demo
/// automation and reports the live URL (if it arrived in time) as JSON.
///
/// The tool itself never fails just because the URL was late or the relay
/// went nowhere; its output carries `live_url: null` in that case.
pub struct PresentDemoTool {
    demos: Arc<DemoService>,
    default_task: String,
}

impl PresentDemoTool {
    pub fn new(demos: Arc<DemoService>, default_task: impl Into<String>) -> Self {
        Self {
            demos,
            default_task: default_task.into(),
        }
    }
}

#[async_trait]
impl Tool for PresentDemoTool {
    fn name(&self) -> &str {
        "present_demo"
    }

    fn description(&self) -> &str {
        "Present a live browser-automation demo to the user. \
         Optional args: {\"task\": \"<override the configured demo task>\"}. \
         Returns JSON with the demo's live URL once the browser session is up."
    }

    async fn execute(&self, args: &HashMap<String, String>) -> Result<String> {
        let description = args
            .get("task")
            .filter(|t| !t.is_empty())
            .map(String::as_str)
            .unwrap_or(&self.default_task);

        let response = self.demos.start(&Task::new(description)).await;
        Ok(serde_json::to_string(&response)?)
    }
}
