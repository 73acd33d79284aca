// ============================================================================
// Fan-Out Aggregator
// ============================================================================
//
// One submission = one task per selected (provider, model). All tasks start
// together, nothing is ordered between them, and the submission resolves
// only after every task has settled. Successes are kept in the order they
// completed; failures are logged, counted and dropped.
//
// ============================================================================

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::client::{HttpSummaryBackend, SummaryBackend, SummaryError};
use super::types::{Preamble, ProviderSelection, ResultSet, SummaryRequest};
use crate::config::UpstreamConfig;
use crate::metrics;

pub struct FanOutAggregator {
    backend: Arc<dyn SummaryBackend>,
    preamble: Preamble,
}

impl FanOutAggregator {
    pub fn new(backend: Arc<dyn SummaryBackend>, preamble: Preamble) -> Self {
        Self { backend, preamble }
    }

    /// Aggregator talking HTTP to the configured summarization endpoint
    pub fn from_config(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let backend = HttpSummaryBackend::new(config)?;
        Ok(Self::new(
            Arc::new(backend),
            Preamble::new(&config.system_prompt, &config.task_prompt),
        ))
    }

    /// One request per selected pair, each carrying the same content
    pub fn build_requests(&self, content: &str, selection: &ProviderSelection) -> Vec<SummaryRequest> {
        selection
            .pairs()
            .map(|(provider, model)| SummaryRequest::new(provider, model, content, &self.preamble))
            .collect()
    }

    /// Summarize `content` with every selected model.
    ///
    /// Never fails as a whole: an empty selection yields an empty set without
    /// any network traffic, and individual failures only shrink the result.
    pub async fn submit(&self, content: &str, selection: &ProviderSelection) -> ResultSet {
        let requests = self.build_requests(content, selection);
        if requests.is_empty() {
            debug!("Empty selection, nothing to submit");
            return ResultSet::new();
        }

        let issued = requests.len();
        let started = Instant::now();

        // Spawning happens while collecting, so every request is in flight
        // before the first completion is awaited.
        let mut pending: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| {
                let backend = Arc::clone(&self.backend);
                let provider = request.provider().to_string();
                let model = request.model().to_string();
                metrics::SUMMARY_REQUESTS_TOTAL.inc();

                let handle = tokio::spawn(async move { backend.summarize(&request).await });
                async move {
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(SummaryError::Join(e.to_string())),
                    };
                    (provider, model, outcome)
                }
            })
            .collect();

        let mut results = Vec::with_capacity(issued);
        while let Some((provider, model, outcome)) = pending.next().await {
            match outcome {
                Ok(result) => {
                    debug!(provider = %provider, model = %model, "Summary received");
                    results.push(result);
                }
                Err(e) => {
                    metrics::SUMMARY_REQUESTS_FAILED_TOTAL
                        .with_label_values(&[e.kind()])
                        .inc();
                    warn!(
                        provider = %provider,
                        model = %model,
                        error = %e,
                        "Summary request failed, dropping it from the results"
                    );
                }
            }
        }

        let elapsed = started.elapsed();
        metrics::SUMMARY_BATCH_DURATION.observe(elapsed.as_secs_f64());
        info!(
            issued = issued,
            succeeded = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Summary batch settled"
        );

        ResultSet::from(results)
    }
}
