use std::sync::{Arc, PoisonError, RwLock, Weak};

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::host::{LocalStorage, Navigator, Notifier, TOKEN_KEY};
use crate::http::transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
use crate::router::LOGIN_PATH;

/// Per-request behaviour of the failure interception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Show the failure message to the user
    pub notify_failure: bool,
}

impl RequestOptions {
    /// Failures are logged but never shown; 401 handling still applies
    pub const QUIET: RequestOptions = RequestOptions {
        notify_failure: false,
    };
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            notify_failure: true,
        }
    }
}

/// Reacts to the server rejecting the bearer credential
pub trait UnauthorizedObserver: Send + Sync {
    /// Called synchronously once per 401 response with the token that was sent
    fn on_unauthorized(&self, rejected_token: Option<&str>);
}

/// Client wrapper every console request goes through
///
/// Outgoing requests get the persisted bearer token attached. Failed
/// responses are reported to the user once; a 401 additionally drops the
/// persisted token and forces a full reload onto the login page. The
/// original error is always handed back to the caller afterwards.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    storage: Arc<dyn LocalStorage>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    observers: RwLock<Vec<Weak<dyn UnauthorizedObserver>>>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        storage: Arc<dyn LocalStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            notifier,
            navigator,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for rejected credentials
    ///
    /// Observers are held weakly and pruned once dropped.
    pub fn observe_unauthorized(&self, observer: Weak<dyn UnauthorizedObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Send a request and apply the response interception
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<ApiResponse> {
        self.request_with(method, path, body, RequestOptions::default())
            .await
    }

    /// Like [`ApiClient::request`] with explicit interception options
    pub async fn request_with(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let span = info_span!(
            "api_request",
            method = %method,
            path,
            request_id = %Uuid::new_v4()
        );

        async move {
            let mut request = ApiRequest::new(method, format!("{}{}", self.base_url, path));
            if let Some(body) = body {
                let encoded =
                    serde_json::to_string(&body).map_err(|e| ApiError::Encode(e.to_string()))?;
                request
                    .headers
                    .insert(CONTENT_TYPE.as_str().to_string(), "application/json".to_string());
                request.body = Some(encoded);
            }
            let sent_token = self.attach_token(&mut request);

            let result = match self.transport.send(request).await {
                Ok(response) if response.is_success() => Ok(response),
                Ok(response) => Err(ApiError::status(response.status(), response.detail())),
                Err(e) => Err(e),
            };

            match result {
                Ok(response) => {
                    debug!(status = response.status(), "Request succeeded");
                    Ok(response)
                }
                Err(e) => Err(self.intercept_failure(e, options, sent_token.as_deref())),
            }
        }
        .instrument(span)
        .await
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(HttpMethod::GET, path, None).await?.json()
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.request(HttpMethod::POST, path, Some(body)).await?.json()
    }

    /// PUT a JSON body, ignoring the answer's shape
    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ApiResponse> {
        self.put_json_with(path, body, RequestOptions::default())
            .await
    }

    /// GET a JSON resource with explicit interception options
    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.request_with(HttpMethod::GET, path, None, options)
            .await?
            .json()
    }

    /// PUT a JSON body with explicit interception options
    pub async fn put_json_with<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let body = encode(body)?;
        self.request_with(HttpMethod::PUT, path, Some(body), options)
            .await
    }

    /// Attach the persisted bearer token, if any, and return it
    fn attach_token(&self, request: &mut ApiRequest) -> Option<String> {
        let token = self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())?;
        request
            .headers
            .insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {}", token));
        Some(token)
    }

    /// Side effects for a failed request; returns the error unchanged
    fn intercept_failure(
        &self,
        error: ApiError,
        options: RequestOptions,
        sent_token: Option<&str>,
    ) -> ApiError {
        let message = error.user_message();
        warn!(
            status = ?error.status_code(),
            category = %error.category(),
            message = %message,
            "Request failed"
        );
        if options.notify_failure {
            self.notifier.error(&message);
        }

        if error.category().resets_session() {
            if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
                warn!(error = %e, "Failed to clear persisted token");
            }
            for observer in self.live_observers() {
                observer.on_unauthorized(sent_token);
            }
            self.navigator.hard_redirect(LOGIN_PATH);
        }

        error
    }

    fn live_observers(&self) -> Vec<Arc<dyn UnauthorizedObserver>> {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        observers.retain(|o| o.strong_count() > 0);
        observers.iter().filter_map(Weak::upgrade).collect()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}
