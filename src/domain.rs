//! Domain models: difficulty scale, output format, and the request/result shapes
//! exchanged with the generation and upload services.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;
pub const DEFAULT_QUESTIONS: u32 = 7;

/// Three-level ordinal difficulty understood by the generation service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  #[default]
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  /// Slider position. Easy = 0, Medium = 1, Hard = 2.
  pub fn ordinal(self) -> i64 {
    match self {
      Difficulty::Easy => 0,
      Difficulty::Medium => 1,
      Difficulty::Hard => 2,
    }
  }

  /// Positions outside the scale fall back to easy.
  pub fn from_ordinal(n: i64) -> Self {
    match n {
      1 => Difficulty::Medium,
      2 => Difficulty::Hard,
      _ => Difficulty::Easy,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easy => "Легкий",
      Difficulty::Medium => "Средний",
      Difficulty::Hard => "Сложный",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "easy" => Ok(Difficulty::Easy),
      "medium" => Ok(Difficulty::Medium),
      "hard" => Ok(Difficulty::Hard),
      other => Err(format!("unknown difficulty '{}'", other)),
    }
  }
}

/// Output format for the rendered test file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
  #[default]
  Txt,
  Pdf,
}

impl OutputFormat {
  pub const ALL: [OutputFormat; 2] = [OutputFormat::Txt, OutputFormat::Pdf];

  pub fn as_str(self) -> &'static str {
    match self {
      OutputFormat::Txt => "txt",
      OutputFormat::Pdf => "pdf",
    }
  }

  /// Upper-cased label used on the download button.
  pub fn label(self) -> String {
    self.as_str().to_ascii_uppercase()
  }
}

impl fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OutputFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "txt" => Ok(OutputFormat::Txt),
      "pdf" => Ok(OutputFormat::Pdf),
      other => Err(format!("unknown format '{}'", other)),
    }
  }
}

/// Clamp a question count into the accepted range.
pub fn clamp_question_count(n: u32) -> u32 {
  n.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}

/// Body sent to `POST /api/generate`. Built fresh for every request.
/// The proxy path omits `format`; the form always sends it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
  pub text: String,
  pub question_count: u32,
  pub difficulty: Difficulty,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<OutputFormat>,
}

/// Successful (2xx) body of the generation service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub generated_test: Option<String>,
  #[serde(default)]
  pub download_url: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

/// Successful (2xx) body of the upload service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UploadResult {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub filename: String,
  #[serde(default)]
  pub length: Option<usize>,
}

/// A file picked by the user, ready to be sent as multipart data.
#[derive(Clone, Debug)]
pub struct UploadFile {
  pub name: String,
  pub bytes: Vec<u8>,
}

impl UploadFile {
  pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    Self { name: name.into(), bytes: bytes.into() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_ordinals_follow_the_slider() {
    for d in Difficulty::ALL {
      assert_eq!(Difficulty::from_ordinal(d.ordinal()), d);
    }
    assert_eq!(Difficulty::from_ordinal(7), Difficulty::Easy);
    assert_eq!(Difficulty::from_ordinal(-1), Difficulty::Easy);
  }

  #[test]
  fn generation_request_uses_camel_case_and_skips_missing_format() {
    let req = GenerationRequest {
      text: "abc".into(),
      question_count: 5,
      difficulty: Difficulty::Hard,
      format: None,
    };
    let v = serde_json::to_value(&req).expect("json");
    assert_eq!(v, serde_json::json!({ "text": "abc", "questionCount": 5, "difficulty": "hard" }));

    let with_format = GenerationRequest { format: Some(OutputFormat::Pdf), ..req };
    let v = serde_json::to_value(&with_format).expect("json");
    assert_eq!(v["format"], "pdf");
  }

  #[test]
  fn generation_result_tolerates_missing_fields() {
    let r: GenerationResult = serde_json::from_str(r#"{"success":true,"generatedTest":"X"}"#).expect("parse");
    assert!(r.success);
    assert_eq!(r.generated_test.as_deref(), Some("X"));
    assert!(r.download_url.is_none());
  }

  #[test]
  fn parsing_is_case_insensitive() {
    assert_eq!("PDF".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
    assert_eq!(" Medium ".parse::<Difficulty>(), Ok(Difficulty::Medium));
    assert!("extreme".parse::<Difficulty>().is_err());
  }

  #[test]
  fn question_count_is_clamped() {
    assert_eq!(clamp_question_count(0), 1);
    assert_eq!(clamp_question_count(25), 20);
    assert_eq!(clamp_question_count(7), 7);
  }
}
