//! Network fetching: a reqwest-backed fetcher with bounded retries, a
//! rate-limited wrapper, and charset detection for mislabeled pages.

pub mod encoding;
pub mod http;

pub use encoding::{detect_encoding, decode_with_fallbacks, DetectedEncoding, EncodingSource};
pub use http::{HttpFetcher, RateLimitedFetcher};
