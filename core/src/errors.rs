use std::io;

use thiserror::Error;

/// Fatal scan errors. All of these abort the run before any probing starts;
/// per-request transport failures are not errors and flow through the result
/// channel as `ProbeResult`s with no status code.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid target URL '{url}': {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to load payloads from '{path}': {source}")]
    PayloadLoad {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to load indicator list from '{path}': {source}")]
    IndicatorLoad {
        path: String,
        #[source]
        source: io::Error,
    },
}
