use std::sync::Arc;
use std::time::Instant;

use futures::{stream, StreamExt};
use log::debug;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::result_aggregator::ProbeResult;
use crate::core::targets::ProbeTarget;
use crate::http::HttpClient;
use crate::utils::detector::Detector;

/// Concurrent probe executor.
///
/// Dispatches GET requests for a batch of probe targets with at most
/// `concurrency` in flight, classifies each response as soon as it lands, and
/// emits exactly one [`ProbeResult`] per dispatched target. Transport
/// failures are expected during a scan: they become results with no status
/// code instead of aborting the batch, and nothing is ever retried.
pub struct ProbeEngine {
    client: Arc<HttpClient>,
    detector: Arc<Detector>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl ProbeEngine {
    pub fn new(client: Arc<HttpClient>, detector: Arc<Detector>, concurrency: usize) -> Self {
        Self {
            client,
            detector,
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Handle for cancelling the batch, e.g. from a Ctrl-C handler.
    ///
    /// Cancelling stops dispatch of new targets; requests already in flight
    /// finish or hit their timeout, and their results still arrive on the
    /// channel. Partial result sets stay valid.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Probes every target, sending results over `result_tx` as they
    /// complete. Completion order is not dispatch order; consumers recover
    /// the association through the URL carried on each result.
    pub async fn run(self, targets: Vec<ProbeTarget>, result_tx: mpsc::Sender<ProbeResult>) {
        stream::iter(targets)
            .take_until(self.cancel.clone().cancelled_owned())
            .map(|target| {
                let client = Arc::clone(&self.client);
                let detector = Arc::clone(&self.detector);
                let tx = result_tx.clone();

                async move {
                    let result = probe_one(&client, &detector, target).await;
                    let _ = tx.send(result).await;
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<()>>()
            .await;
    }
}

async fn probe_one(client: &HttpClient, detector: &Detector, target: ProbeTarget) -> ProbeResult {
    let url = target.url.to_string();
    let start = Instant::now();

    let failure = |reason: &dyn std::fmt::Display, elapsed: u128| {
        debug!("request to {} failed: {}", url, reason);
        ProbeResult {
            url: url.clone(),
            param: target.param.clone(),
            variant: target.variant.clone(),
            status: None,
            vulnerable: false,
            waf_detected: false,
            timing_ms: elapsed,
        }
    };

    let response = match client.get(&url).await {
        Ok(response) => response,
        Err(e) => return failure(&e, start.elapsed().as_millis()),
    };

    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    // A body that dies mid-read (timeout, reset) counts as a transport
    // failure even though the status line arrived.
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return failure(&e, start.elapsed().as_millis()),
    };
    let timing_ms = start.elapsed().as_millis();

    let verdict = detector.classify(Some(status), &headers, &body);

    ProbeResult {
        url,
        param: target.param,
        variant: target.variant,
        status: Some(status),
        vulnerable: verdict.vulnerable,
        waf_detected: verdict.waf_detected,
        timing_ms,
    }
}
