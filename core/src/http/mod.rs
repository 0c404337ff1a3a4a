pub mod client;

pub use client::HttpClient;

/// Identifying User-Agent sent with every probe request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; Traversa/1.0)";
