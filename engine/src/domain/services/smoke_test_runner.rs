//! Smoke test runner
//! Exercises health, search and ask of a running stack in order

use crate::constants::smoke;
use crate::domain::ports::{AskRequest, HealthProbe, SearchRequest, ServiceClient};
use crate::domain::{
    DomainError, NewsHighlight, Result, ServiceSpec, SmokeTestReport, TestStepResult,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Inputs and timeouts of a smoke run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeTestConfig {
    pub search_query: String,
    pub search_top_k: u32,
    pub question: String,
    pub ask_top_k: u32,
    pub health_timeout: Duration,
    pub search_timeout: Duration,
    pub ask_timeout: Duration,
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        Self {
            search_query: smoke::DEFAULT_SEARCH_QUERY.to_string(),
            search_top_k: smoke::DEFAULT_SEARCH_TOP_K,
            question: smoke::DEFAULT_QUESTION.to_string(),
            ask_top_k: smoke::DEFAULT_ASK_TOP_K,
            health_timeout: Duration::from_secs(smoke::DEFAULT_HEALTH_TIMEOUT_SECS),
            search_timeout: Duration::from_secs(smoke::DEFAULT_SEARCH_TIMEOUT_SECS),
            ask_timeout: Duration::from_secs(smoke::DEFAULT_ASK_TIMEOUT_SECS),
        }
    }
}

pub struct SmokeTestRunner {
    probe: Arc<dyn HealthProbe>,
    client: Arc<dyn ServiceClient>,
    config: SmokeTestConfig,
}

impl SmokeTestRunner {
    pub fn new(probe: Arc<dyn HealthProbe>, client: Arc<dyn ServiceClient>) -> Self {
        Self {
            probe,
            client,
            config: SmokeTestConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SmokeTestConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the four steps, stopping at the first failure
    ///
    /// `specs[0]` is the collector (search), `specs[1]` the agent (ask).
    pub async fn run(&self, specs: &[ServiceSpec]) -> Result<SmokeTestReport> {
        let [collector, agent, ..] = specs else {
            return Err(DomainError::InvalidConfiguration(format!(
                "smoke test needs two services, got {}",
                specs.len()
            )));
        };

        let mut report = SmokeTestReport::default();

        if !report.record(self.health_step(collector).await)
            || !report.record(self.health_step(agent).await)
            || !report.record(self.search_step(collector).await)
        {
            self.log_failure(&report);
            return Ok(report);
        }

        let (step, highlights) = self.ask_step(agent).await;
        report.highlights = highlights;
        if !report.record(step) {
            self.log_failure(&report);
            return Ok(report);
        }

        info!(steps = report.steps.len(), "Smoke test passed");
        Ok(report)
    }

    async fn health_step(&self, spec: &ServiceSpec) -> TestStepResult {
        let step_name = format!("{} health", spec.name());
        let status = self.probe.check(spec, self.config.health_timeout).await;
        if status.is_up() {
            TestStepResult::pass(step_name, spec.health_url())
        } else {
            TestStepResult::fail(step_name, format!("{} is {}", spec.health_url(), status))
        }
    }

    async fn search_step(&self, spec: &ServiceSpec) -> TestStepResult {
        let request = SearchRequest {
            query: self.config.search_query.clone(),
            top_k: self.config.search_top_k,
        };
        let body = match self
            .client
            .search(spec, &request, self.config.search_timeout)
            .await
        {
            Ok(body) => body,
            Err(e) => return TestStepResult::fail("search", e.to_string()),
        };

        match body.get("total_found").and_then(Value::as_u64) {
            Some(total) => TestStepResult::pass("search", format!("total_found={}", total)),
            None => TestStepResult::fail("search", "response has no numeric total_found"),
        }
    }

    async fn ask_step(&self, spec: &ServiceSpec) -> (TestStepResult, Vec<NewsHighlight>) {
        let request = AskRequest {
            question: self.config.question.clone(),
            top_k: self.config.ask_top_k,
        };
        let body = match self.client.ask(spec, &request, self.config.ask_timeout).await {
            Ok(body) => body,
            Err(e) => return (TestStepResult::fail("ask", e.to_string()), Vec::new()),
        };

        let Some(answer) = body.get("answer") else {
            return (
                TestStepResult::fail("ask", "response has no answer"),
                Vec::new(),
            );
        };

        let detail = match body.get("news_found").and_then(Value::as_u64) {
            Some(found) => format!("answer received, news_found={}", found),
            None => "answer received".to_string(),
        };
        debug!(answer_len = answer.as_str().map_or(0, str::len), "Ask answered");

        (TestStepResult::pass("ask", detail), extract_highlights(&body))
    }

    fn log_failure(&self, report: &SmokeTestReport) {
        if let Some(step) = report.failed_step() {
            warn!(step = %step.step_name, detail = %step.detail, "Smoke test step failed");
        }
    }
}

/// Up to three `top_news` entries; malformed entries are skipped
pub fn extract_highlights(body: &Value) -> Vec<NewsHighlight> {
    let Some(items) = body.get("top_news").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?;
            let similarity = item.get("similarity").and_then(Value::as_f64).unwrap_or(0.0);
            let critical = item
                .get("critical_keywords")
                .and_then(Value::as_u64)
                .unwrap_or(0)
                > 0;
            Some(NewsHighlight {
                title: title.to_string(),
                similarity_percent: similarity * 100.0,
                critical,
            })
        })
        .take(smoke::HIGHLIGHT_COUNT)
        .collect()
}
