pub mod core;
pub mod errors;
pub mod http;
pub mod utils;

pub use crate::core::engine::ProbeEngine;
pub use crate::core::mutator::{set_query_param, with_query_param};
pub use crate::core::result_aggregator::{ProbeResult, ResultAggregator, ScanRecord};
pub use crate::core::targets::{build_targets, ProbeTarget};
pub use crate::core::variants::{generate_variants, VARIANTS_PER_PAYLOAD};
pub use crate::errors::ScanError;
pub use crate::http::HttpClient;
pub use crate::utils::detector::{Classification, DetectionRules, Detector};
pub use crate::utils::payload_loader::{
    default_payloads, load_indicators, load_payloads, DEFAULT_PAYLOADS,
};

/// Parses `Key: Value` header strings from the CLI into pairs.
/// Entries without a key are dropped; a missing value becomes empty.
pub fn parse_custom_headers(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|h| {
            let mut parts = h.splitn(2, ':');
            let key = parts.next()?.trim().to_string();
            let val = parts.next().unwrap_or("").trim().to_string();
            if key.is_empty() {
                return None;
            }
            Some((key, val))
        })
        .collect()
}
