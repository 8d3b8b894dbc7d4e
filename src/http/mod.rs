pub mod client;
pub mod transport;

pub use client::{ApiClient, RequestOptions, UnauthorizedObserver};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, ReqwestTransport};

/// Base timeout applied to every request, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
