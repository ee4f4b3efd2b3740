//! Minimal client for the external generation/upload service.
//!
//! Two calls: `POST {base}/api/generate` (JSON) and `POST {base}/api/upload` (multipart).
//! Calls are instrumented and log sizes, statuses and latencies (not contents).

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::{GenerationResult, UploadFile, UploadResult};
use crate::error::UpstreamError;
use crate::util::{join_url, trunc_for_log};

const UA: &str = concat!("quizgen-backend/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct Upstream {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl Upstream {
  /// Build the client. `timeout_secs == 0` disables the request timeout.
  pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
      builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Ok(Self { client: builder.build()?, base_url })
  }

  /// Port the service is expected on (explicit or scheme default).
  pub fn port(&self) -> Option<u16> {
    reqwest::Url::parse(&self.base_url).ok()?.port_or_known_default()
  }

  /// Relative download paths are served by the same service.
  pub fn resolve_download_url(&self, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
      url.to_string()
    } else {
      join_url(&self.base_url, url)
    }
  }

  /// `body` is a `GenerationRequest` from the form, or the proxy's pass-through payload.
  #[instrument(level = "info", skip(self, body), fields(request_id = %Uuid::new_v4()))]
  pub async fn generate<B: Serialize + ?Sized>(&self, body: &B) -> Result<GenerationResult, UpstreamError> {
    let url = join_url(&self.base_url, "/api/generate");
    let started = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, UA)
      .header(CONTENT_TYPE, "application/json")
      .json(body)
      .send().await?;

    let out: GenerationResult = read_json(res).await?;
    info!(
      target: "upstream",
      success = out.success,
      generated_len = out.generated_test.as_ref().map(|t| t.len()).unwrap_or(0),
      has_download = out.download_url.is_some(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "Generation call finished"
    );
    Ok(out)
  }

  #[instrument(level = "info", skip(self, file), fields(request_id = %Uuid::new_v4(), filename = %file.name, size = file.bytes.len()))]
  pub async fn upload(&self, file: &UploadFile) -> Result<UploadResult, UpstreamError> {
    let url = join_url(&self.base_url, "/api/upload");
    let started = Instant::now();
    let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    let form = Form::new().part("file", part);

    let res = self.client.post(&url)
      .header(USER_AGENT, UA)
      .multipart(form)
      .send().await?;

    let out: UploadResult = read_json(res).await?;
    info!(
      target: "upstream",
      success = out.success,
      text_len = out.text.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "Upload call finished"
    );
    Ok(out)
  }
}

/// Turn a response into `T`, or a `Status` error carrying the server's explanation.
async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, UpstreamError> {
  let status = res.status();
  if !status.is_success() {
    let body = res.text().await.unwrap_or_default();
    error!(target: "upstream", status = status.as_u16(), body = %trunc_for_log(&body, 300), "Upstream returned an error status");
    return Err(UpstreamError::Status { status: status.as_u16(), detail: extract_error_detail(&body) });
  }
  let body = res.text().await?;
  serde_json::from_str::<T>(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Pull a human-readable explanation out of an error body.
/// Understands `{"detail": "..."}`, `{"error": "..."}` and `{"message": "..."}`.
fn extract_error_detail(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EBody {
    #[serde(default)] detail: Option<serde_json::Value>,
    #[serde(default)] error: Option<String>,
    #[serde(default)] message: Option<String>,
  }
  let b = serde_json::from_str::<EBody>(body).ok()?;
  let detail = b.detail.and_then(|d| match d {
    serde_json::Value::String(s) => Some(s),
    serde_json::Value::Null => None,
    other => Some(other.to_string()),
  });
  detail.or(b.error).or(b.message).filter(|s| !s.trim().is_empty())
}
