//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::theme::Theme;
use crate::widgets::{RadioItem, SliderView};

//
// POST /api/generate-test
//

/// Every field is optional on the wire so that a missing one becomes a 400 with
/// a readable message instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestIn {
    #[serde(default)]
    pub content: Option<String>,
    /// Any truthy JSON value; relayed unchanged.
    #[serde(default)]
    pub question_count: Option<serde_json::Value>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
}

/// Payload relayed to the generation service. Values are passed through as sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateForward {
    pub text: String,
    pub question_count: serde_json::Value,
    pub difficulty: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionOut {
    pub question: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerateTestOut {
    pub questions: Vec<QuestionOut>,
    /// `fileFormat` echoed back unchanged.
    pub format: String,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}

//
// GET /api/v1/form
//

#[derive(Debug, Serialize)]
pub struct QuestionCountOut {
    pub min: u32,
    pub max: u32,
    pub value: u32,
}

#[derive(Debug, Serialize)]
pub struct DifficultyOut {
    pub slider: SliderView,
    pub labels: Vec<RadioItem>,
    pub selected_label: String,
}

#[derive(Debug, Serialize)]
pub struct FormLayoutOut {
    pub question_count: QuestionCountOut,
    pub difficulty: DifficultyOut,
    pub format: Vec<RadioItem>,
    pub char_count_hint: String,
}

//
// GET/PUT /api/v1/theme
//

#[derive(Debug, Deserialize)]
pub struct ThemeIn {
    pub theme: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ThemeOut {
    pub theme: Theme,
    pub storage_key: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
