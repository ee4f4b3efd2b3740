//! Form controller: everything the user enters, progress flags, banners, and the
//! two outbound actions (file upload and test generation).
//!
//! The controller is cheap to clone; clones share one state. Actions take the lock
//! only around state transitions and never across a network await, so overlapping
//! generations race and whichever response resolves last wins.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::config::{FormDefaults, Messages};
use crate::domain::{
  clamp_question_count, Difficulty, GenerationRequest, GenerationResult, OutputFormat, UploadFile, UploadResult,
  MAX_QUESTIONS, MIN_QUESTIONS,
};
use crate::error::{FormError, UpstreamError};
use crate::protocol::{DifficultyOut, FormLayoutOut, QuestionCountOut};
use crate::upstream::Upstream;
use crate::util::{fill_template, is_blank};
use crate::widgets::{RadioGroup, Slider};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
  pub text: String,
  pub question_count: u32,
  pub difficulty: Difficulty,
  pub format: OutputFormat,

  pub is_uploading: bool,
  pub is_generating: bool,
  pub generated_test: String,
  pub download_url: String,
  pub error: String,
  pub success: String,
  /// Name of the file currently held by the file picker.
  pub file_input: Option<String>,
}

impl FormState {
  pub fn new(defaults: &FormDefaults) -> Self {
    Self {
      text: String::new(),
      question_count: clamp_question_count(defaults.question_count),
      difficulty: defaults.difficulty,
      format: defaults.format,
      is_uploading: false,
      is_generating: false,
      generated_test: String::new(),
      download_url: String::new(),
      error: String::new(),
      success: String::new(),
      file_input: None,
    }
  }

  pub fn difficulty_slider(&self) -> Slider {
    Slider::new(Difficulty::Easy.ordinal(), Difficulty::Hard.ordinal(), 1, [self.difficulty.ordinal()])
  }

  pub fn difficulty_labels(&self) -> RadioGroup {
    RadioGroup::new(Difficulty::ALL.map(|d| (d.as_str(), d.label())), self.difficulty.as_str())
  }

  pub fn format_group(&self) -> RadioGroup {
    RadioGroup::new(OutputFormat::ALL.map(|f| (f.as_str(), f.as_str())), self.format.as_str())
  }

  /// The generate button is enabled only when idle and there is text.
  pub fn can_generate(&self) -> bool {
    !self.is_generating && !is_blank(&self.text)
  }

  pub fn char_count_hint(&self, messages: &Messages) -> String {
    let count = self.text.chars().count().to_string();
    fill_template(&messages.char_count_template, &[("count", &count)])
  }

  pub fn download_label(&self, messages: &Messages) -> String {
    fill_template(&messages.download_label_template, &[("format", &self.format.label())])
  }

  /// Plain-data description of the controls for a renderer.
  pub fn layout(&self, messages: &Messages) -> FormLayoutOut {
    FormLayoutOut {
      question_count: QuestionCountOut { min: MIN_QUESTIONS, max: MAX_QUESTIONS, value: self.question_count },
      difficulty: DifficultyOut {
        slider: self.difficulty_slider().view(),
        labels: self.difficulty_labels().items(),
        selected_label: self.difficulty.label().to_string(),
      },
      format: self.format_group().items(),
      char_count_hint: self.char_count_hint(messages),
    }
  }
}

#[derive(Clone)]
pub struct FormController {
  upstream: Upstream,
  messages: Arc<Messages>,
  defaults: FormDefaults,
  state: Arc<RwLock<FormState>>,
}

impl FormController {
  pub fn new(upstream: Upstream, messages: Arc<Messages>, defaults: FormDefaults) -> Self {
    let state = Arc::new(RwLock::new(FormState::new(&defaults)));
    Self { upstream, messages, defaults, state }
  }

  pub async fn snapshot(&self) -> FormState {
    self.state.read().await.clone()
  }

  pub async fn layout(&self) -> FormLayoutOut {
    self.state.read().await.layout(&self.messages)
  }

  /// User typed into the text area. Any banner is dismissed.
  pub async fn set_text(&self, text: impl Into<String>) {
    let mut s = self.state.write().await;
    s.text = text.into();
    s.error.clear();
    s.success.clear();
  }

  /// Raw numeric input. Unparsable or zero input falls back to the default count.
  pub async fn set_question_count(&self, raw: &str) {
    let n = match raw.trim().parse::<f64>() {
      Ok(v) if v.is_finite() && v != 0.0 => clamp_question_count(v.round().max(0.0) as u32),
      _ => clamp_question_count(self.defaults.question_count),
    };
    self.state.write().await.question_count = n;
  }

  /// Value emitted by the difficulty slider.
  pub async fn set_difficulty_slider(&self, value: [i64; 1]) {
    self.state.write().await.difficulty = Difficulty::from_ordinal(value[0]);
  }

  /// Raw input from the difficulty slider control.
  pub async fn on_difficulty_input(&self, raw: &str) -> Option<Difficulty> {
    let emitted = self.state.read().await.difficulty_slider().on_input(raw)?;
    self.set_difficulty_slider(emitted).await;
    Some(Difficulty::from_ordinal(emitted[0]))
  }

  /// Key emitted by the format radio group. Unknown keys are ignored.
  pub async fn select_format(&self, key: &str) -> Option<OutputFormat> {
    let mut s = self.state.write().await;
    let format = s.format_group().on_select(key)?.parse::<OutputFormat>().ok()?;
    s.format = format;
    Some(format)
  }

  /// Send the file to the upload service and put the extracted text in the form.
  #[instrument(level = "info", skip(self, file), fields(filename = %file.name, size = file.bytes.len()))]
  pub async fn upload_file(&self, file: UploadFile) -> Result<UploadResult, FormError> {
    {
      let mut s = self.state.write().await;
      s.is_uploading = true;
      s.error.clear();
      s.file_input = Some(file.name.clone());
    }

    let outcome = self.upstream.upload(&file).await;

    let mut s = self.state.write().await;
    s.is_uploading = false;
    s.file_input = None;

    match outcome {
      Ok(res) => {
        if res.success && !res.text.is_empty() {
          let length = res.length.unwrap_or_else(|| res.text.chars().count()).to_string();
          let filename = if res.filename.is_empty() { file.name.as_str() } else { res.filename.as_str() };
          s.success = fill_template(&self.messages.upload_success_template, &[("filename", filename), ("length", &length)]);
          s.text = res.text.clone();
          info!(target: "form", %filename, %length, "File text loaded into the form");
        } else {
          warn!(target: "form", success = res.success, "Upload returned no text; form left unchanged");
        }
        Ok(res)
      }
      Err(e) => {
        let err = self.upload_error(e);
        s.error = err.to_string();
        Err(err)
      }
    }
  }

  /// Ask the generation service for a test built from the current form.
  #[instrument(level = "info", skip(self))]
  pub async fn generate_test(&self) -> Result<GenerationResult, FormError> {
    let req = {
      let mut s = self.state.write().await;
      if is_blank(&s.text) {
        let err = FormError::Validation(self.messages.empty_text.clone());
        s.error = err.to_string();
        return Err(err);
      }
      s.is_generating = true;
      s.generated_test.clear();
      s.download_url.clear();
      s.error.clear();
      s.success.clear();
      GenerationRequest {
        text: s.text.clone(),
        question_count: s.question_count,
        difficulty: s.difficulty,
        format: Some(s.format),
      }
    };

    let outcome = self.upstream.generate(&req).await;

    let mut s = self.state.write().await;
    s.is_generating = false;

    let err = match outcome {
      Ok(res) if res.success => {
        s.generated_test = res.generated_test.clone().unwrap_or_default();
        if let Some(url) = res.download_url.as_deref().filter(|u| !u.is_empty()) {
          s.download_url = self.upstream.resolve_download_url(url);
        }
        s.success = self.messages.generate_success.clone();
        return Ok(res);
      }
      Ok(res) => FormError::Rejected(
        res.message.filter(|m| !is_blank(m)).unwrap_or_else(|| self.messages.unknown_error.clone()),
      ),
      Err(e) => self.generation_error(e),
    };
    s.error = err.to_string();
    Err(err)
  }

  fn upload_error(&self, e: UpstreamError) -> FormError {
    error!(target: "form", error = %e, "Upload failed");
    let msg = e.detail().map(str::to_string).unwrap_or_else(|| self.messages.upload_failed.clone());
    match e {
      UpstreamError::Connect(_) => FormError::Connection(msg),
      UpstreamError::Status { .. } => FormError::Upstream(msg),
      UpstreamError::Transport(_) | UpstreamError::Decode(_) => FormError::Transport(msg),
    }
  }

  fn generation_error(&self, e: UpstreamError) -> FormError {
    error!(target: "form", error = %e, "Generation failed");
    match e {
      UpstreamError::Connect(_) => {
        let port = self.upstream.port().map(|p| p.to_string()).unwrap_or_else(|| self.upstream.base_url.clone());
        FormError::Connection(fill_template(&self.messages.connection_refused_template, &[("port", &port)]))
      }
      UpstreamError::Status { detail, .. } => {
        FormError::Upstream(detail.unwrap_or_else(|| self.messages.generate_failed.clone()))
      }
      UpstreamError::Transport(_) | UpstreamError::Decode(_) => FormError::Transport(self.messages.generic_failure.clone()),
    }
  }
}
