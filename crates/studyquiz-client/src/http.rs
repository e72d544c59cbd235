//! HTTP client for the document-processing service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use tracing::instrument;

use studyquiz_core::error::ServiceError;
use studyquiz_core::traits::{
    Document, GenerateRequest, QuizService, ServiceReply, SubmitRequest, PDF_MIME,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Talks to the `/api/upload`, `/api/generate` and `/api/submit-answers`
/// endpoints with the user's ID token as bearer credential.
pub struct HttpQuizService {
    base_url: String,
    id_token: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuizService {
    pub fn new(base_url: &str, id_token: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            id_token: id_token.to_string(),
            timeout_secs,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else {
            ServiceError::NetworkError(e.to_string())
        }
    }

    async fn read_reply(&self, response: Response) -> Result<ServiceReply, ServiceError> {
        let response = check_status(response).await?;
        response.json().await.map_err(|e| ServiceError::ApiError {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })
    }
}

/// Map error statuses to [`ServiceError`], passing successful responses through.
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status().as_u16();
    if status == 401 || status == 403 {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::AuthenticationFailed(body));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::ApiError {
            status,
            message: body,
        });
    }
    Ok(response)
}

#[async_trait]
impl QuizService for HttpQuizService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, document), fields(file = %document.file_name, bytes = document.size()))]
    async fn upload(&self, conversation_id: &str, document: &Document) -> anyhow::Result<()> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(PDF_MIME)
            .map_err(|e| ServiceError::InvalidDocument(e.to_string()))?;
        let form = Form::new().part("files", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .query(&[("id", conversation_id)])
            .bearer_auth(&self.id_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = check_status(response).await?;
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%body, "upload acknowledged");
        Ok(())
    }

    #[instrument(skip(self, request), fields(conversation_id = %request.id))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String> {
        let response = self
            .client
            .post(self.url("/api/generate"))
            .bearer_auth(&self.id_token)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let reply = self.read_reply(response).await?;
        if !reply.is_success() {
            return Err(ServiceError::GenerationFailed(reply.message).into());
        }
        tracing::debug!(chars = reply.message.len(), "generation reply received");
        Ok(reply.message)
    }

    #[instrument(skip(self, request), fields(conversation_id = %request.id, answers = request.answers.len()))]
    async fn submit_answers(&self, request: &SubmitRequest) -> anyhow::Result<()> {
        let response = self
            .client
            .post(self.url("/api/submit-answers"))
            .bearer_auth(&self.id_token)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let reply = self.read_reply(response).await?;
        if !reply.is_success() {
            return Err(ServiceError::SubmissionFailed(reply.message).into());
        }
        Ok(())
    }
}
