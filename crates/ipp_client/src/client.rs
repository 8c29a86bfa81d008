use reqwest::{Response, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, trace};

use crate::{
    error::{Error, Result},
    types::{
        ChatResponse, EvaluationRequest, Health, InterviewRequest, SearchQuery, SessionDetails,
    },
};

/// Message reported when a failed response carries no diagnostic text.
pub(crate) const GENERIC_STREAM_FAILURE: &str = "Failed to stream response";

/// Client for the interview backend.
///
/// Holds the HTTP client used for the chat stream and the collaborator REST
/// calls. The speech socket URL is derived from the same base URL.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) http_client: reqwest::Client,
    pub(crate) base_url: String,

    /// Fail speech sessions whose socket closes before the completion
    /// sentinel, instead of reporting them as
    /// [`SpeechOutcome::ClosedWithoutSentinel`].
    ///
    /// [`SpeechOutcome::ClosedWithoutSentinel`]: crate::SpeechOutcome::ClosedWithoutSentinel
    pub(crate) strict_close: bool,
}

impl Client {
    /// Create a client for the API rooted at `base_url`, e.g.
    /// `http://localhost:8080/api/v1`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            strict_close: false,
        }
    }

    #[must_use]
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    #[must_use]
    pub fn with_strict_close(mut self, strict_close: bool) -> Self {
        self.strict_close = strict_close;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn health(&self) -> Result<Health> {
        self.get("health").await
    }

    /// List the search queries available as interview context.
    pub async fn search_queries(&self) -> Result<Vec<SearchQuery>> {
        self.get("scrapers/queries").await
    }

    /// Fetch a session, including its committed messages.
    pub async fn session(&self, session_id: &str) -> Result<SessionDetails> {
        self.get(&format!("conversation_history/session/{session_id}"))
            .await
    }

    /// Ask the backend to evaluate a finished interview.
    pub async fn evaluate(&self, session_id: &str, search_query_id: i64) -> Result<()> {
        let body = EvaluationRequest {
            chat_session_id: session_id,
            search_query_id,
        };

        let response = self
            .http_client
            .post(self.endpoint("evaluation/evaluate"))
            .json(&body)
            .send()
            .await?;

        ensure_success(response).await.map(drop)
    }

    /// Send a message and wait for the complete answer, without streaming.
    pub async fn chat(
        &self,
        session_id: &str,
        search_query_id: i64,
        message: &str,
    ) -> Result<ChatResponse> {
        let body = InterviewRequest {
            search_query_id,
            query: message,
        };

        self.post(&format!("chat/interview/{session_id}"), &body)
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        trace!(%url, "Triggering request.");

        let response = self.http_client.get(&url).send().await?;
        ensure_success(response).await?.json().await.map_err(Into::into)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path);
        trace!(%url, "Triggering request.");

        let response = self.http_client.post(&url).json(body).send().await?;
        ensure_success(response).await?.json().await.map_err(Into::into)
    }
}

/// Turn a client or server error status into [`Error::Api`], carrying the
/// response body as the diagnostic message.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    trace!(
        status = response.status().as_u16(),
        content_length = response.content_length().unwrap_or_default(),
        content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or_default()),
        "Received response."
    );

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    error!(status = code, body, "Unexpected response.");

    let message = if body.trim().is_empty() {
        GENERIC_STREAM_FAILURE.to_owned()
    } else {
        body
    };

    Err(Error::Api { code, message })
}
