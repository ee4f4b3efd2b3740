//! Core behavior behind `POST /api/generate-test`: check that every parameter is
//! present, relay the payload to the generation service unchanged, and wrap its
//! single text result into the list-shaped response.

use tracing::{error, info, instrument};

use crate::error::ApiError;
use crate::protocol::{GenerateForward, GenerateTestIn, GenerateTestOut, QuestionOut};
use crate::state::AppState;
use crate::util::fill_template;

/// What survives the presence check: the relayed payload plus the echoed format.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedGenerate {
  pub forward: GenerateForward,
  pub file_format: String,
}

/// A field is present when it is truthy: non-empty strings, non-zero numbers.
fn present_str(v: &Option<String>) -> Option<&str> {
  v.as_deref().filter(|s| !s.is_empty())
}

fn present_count(v: &Option<serde_json::Value>) -> Option<&serde_json::Value> {
  v.as_ref().filter(|v| match v {
    serde_json::Value::Null | serde_json::Value::Bool(false) => false,
    serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
    serde_json::Value::String(s) => !s.is_empty(),
    _ => true,
  })
}

/// One message for any missing field. Values are not interpreted; the generation
/// service owns their meaning.
pub fn validate_generate(state: &AppState, body: &GenerateTestIn) -> Result<ValidatedGenerate, ApiError> {
  let (Some(content), Some(count), Some(difficulty), Some(file_format)) = (
    present_str(&body.content),
    present_count(&body.question_count),
    present_str(&body.difficulty),
    present_str(&body.file_format),
  ) else {
    return Err(ApiError::BadRequest(state.config.messages.missing_params.clone()));
  };

  Ok(ValidatedGenerate {
    forward: GenerateForward {
      text: content.to_string(),
      question_count: count.clone(),
      difficulty: difficulty.to_string(),
    },
    file_format: file_format.to_string(),
  })
}

/// Forward to the generation service and reshape its answer.
#[instrument(level = "info", skip(state, body), fields(content_len = body.content.as_ref().map(|c| c.len()).unwrap_or(0)))]
pub async fn generate_test(state: &AppState, body: GenerateTestIn) -> Result<GenerateTestOut, ApiError> {
  let valid = validate_generate(state, &body)?;
  let msgs = &state.config.messages;

  let result = state.upstream.generate(&valid.forward).await.map_err(|e| {
    error!(target: "generate", error = %e, "Generation upstream failed");
    ApiError::Upstream(fill_template(&msgs.proxy_failure_template, &[("cause", &e.to_string())]))
  })?;

  let questions = result
    .generated_test
    .filter(|t| !t.is_empty())
    .map(|content| vec![QuestionOut { question: msgs.generated_question_label.clone(), content }])
    .unwrap_or_default();

  info!(
    target: "generate",
    success = result.success,
    questions = questions.len(),
    format = %valid.file_format,
    "Generated test relayed"
  );
  Ok(GenerateTestOut { questions, format: valid.file_format, success: result.success })
}
