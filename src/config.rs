//! Loading application configuration (upstream, localized messages, form defaults,
//! theme storage) from TOML, with environment overrides for the upstream host.
//!
//! See `AppConfig` for the expected schema. Every section is optional.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Difficulty, OutputFormat, DEFAULT_QUESTIONS};
use crate::theme::Theme;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Zero disables the outbound request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 0;

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
  pub upstream: UpstreamCfg,
  pub messages: Messages,
  pub form: FormDefaults,
  pub theme: ThemeCfg,
  pub static_dir: Option<String>,
}

/// Where the generation/upload service lives.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamCfg {
  pub base_url: Option<String>,
  pub timeout_secs: u64,
}

impl Default for UpstreamCfg {
  fn default() -> Self {
    Self { base_url: None, timeout_secs: DEFAULT_TIMEOUT_SECS }
  }
}

/// Initial values of the form.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
  pub question_count: u32,
  pub difficulty: Difficulty,
  pub format: OutputFormat,
}

impl Default for FormDefaults {
  fn default() -> Self {
    Self {
      question_count: DEFAULT_QUESTIONS,
      difficulty: Difficulty::Easy,
      format: OutputFormat::Txt,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ThemeCfg {
  pub path: PathBuf,
  pub storage_key: String,
  pub default: Theme,
}

impl Default for ThemeCfg {
  fn default() -> Self {
    Self {
      path: PathBuf::from("./theme.toml"),
      storage_key: "theme".into(),
      default: Theme::System,
    }
  }
}

/// User-facing strings. Defaults are Russian; override in TOML to localize.
/// Templates use `{key}` placeholders (see `util::fill_template`).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
  // Proxy route
  pub missing_params: String,
  pub invalid_params_template: String,
  pub proxy_failure_template: String,
  pub generated_question_label: String,
  // Form: upload
  pub upload_failed: String,
  pub upload_success_template: String,
  // Form: generation
  pub empty_text: String,
  pub generate_failed: String,
  pub generate_success: String,
  pub unknown_error: String,
  pub connection_refused_template: String,
  pub generic_failure: String,
  // Form: decorations
  pub char_count_template: String,
  pub download_label_template: String,
  // Theme
  pub invalid_theme_template: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      missing_params: "Отсутствуют обязательные параметры".into(),
      invalid_params_template: "Некорректные параметры: {cause}".into(),
      proxy_failure_template: "Ошибка генерации: {cause}".into(),
      generated_question_label: "Сгенерированный тест".into(),
      upload_failed: "Ошибка загрузки файла".into(),
      upload_success_template: "Файл \"{filename}\" успешно загружен ({length} символов)".into(),
      empty_text: "Пожалуйста, введите текст или загрузите файл".into(),
      generate_failed: "Ошибка генерации теста".into(),
      generate_success: "Тест успешно сгенерирован!".into(),
      unknown_error: "Неизвестная ошибка".into(),
      connection_refused_template: "Не удается подключиться к серверу. Убедитесь, что API сервер запущен на порту {port}.".into(),
      generic_failure: "Произошла ошибка при генерации теста".into(),
      char_count_template: "Символов: {count} / рекомендуется 200-2000".into(),
      download_label_template: "Скачать {format}".into(),
      invalid_theme_template: "Неизвестная тема: {theme}".into(),
    }
  }
}

/// Pick the single upstream base URL.
/// Precedence: explicit override > deployment host > config file > local default.
pub fn resolve_base_url(explicit: Option<&str>, deployment_host: Option<&str>, configured: Option<&str>) -> String {
  let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

  if let Some(url) = non_empty(explicit) {
    return url.trim_end_matches('/').to_string();
  }
  if let Some(host) = non_empty(deployment_host) {
    return format!("https://{}", host.trim_end_matches('/'));
  }
  non_empty(configured)
    .map(|u| u.trim_end_matches('/').to_string())
    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

impl AppConfig {
  /// Base URL after applying `UPSTREAM_BASE_URL` and `VERCEL_URL`.
  pub fn base_url_from_env(&self) -> String {
    let explicit = std::env::var("UPSTREAM_BASE_URL").ok();
    let deployment = std::env::var("VERCEL_URL").ok();
    resolve_base_url(explicit.as_deref(), deployment.as_deref(), self.upstream.base_url.as_deref())
  }
}

/// Parse a TOML document into `AppConfig`.
pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Load `AppConfig` from QUIZGEN_CONFIG_PATH. On any parsing/IO error, falls back to defaults.
pub fn load_app_config_from_env() -> AppConfig {
  let Ok(path) = std::env::var("QUIZGEN_CONFIG_PATH") else {
    info!(target: "quizgen_backend", "QUIZGEN_CONFIG_PATH not set; using built-in defaults");
    return AppConfig::default();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "quizgen_backend", %path, "Loaded app config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "quizgen_backend", %path, error = %e, "Failed to parse TOML config; using defaults");
        AppConfig::default()
      }
    },
    Err(e) => {
      error!(target: "quizgen_backend", %path, error = %e, "Failed to read TOML config file; using defaults");
      AppConfig::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_url_precedence() {
    assert_eq!(resolve_base_url(Some("http://gen:9000/"), Some("app.example"), Some("http://cfg")), "http://gen:9000");
    assert_eq!(resolve_base_url(None, Some("app.example"), Some("http://cfg")), "https://app.example");
    assert_eq!(resolve_base_url(Some("  "), None, Some("http://cfg:1234")), "http://cfg:1234");
    assert_eq!(resolve_base_url(None, Some(""), None), DEFAULT_BASE_URL);
  }

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg = parse_app_config(
      r#"
        static_dir = "./web"

        [upstream]
        base_url = "http://generator:8000"

        [messages]
        generate_success = "Done!"

        [form]
        difficulty = "hard"
        format = "pdf"
      "#,
    )
    .expect("parse");
    assert_eq!(cfg.upstream.base_url.as_deref(), Some("http://generator:8000"));
    assert_eq!(cfg.upstream.timeout_secs, DEFAULT_TIMEOUT_SECS);
    assert_eq!(cfg.messages.generate_success, "Done!");
    assert_eq!(cfg.messages.unknown_error, "Неизвестная ошибка");
    assert_eq!(cfg.form.difficulty, Difficulty::Hard);
    assert_eq!(cfg.form.format, OutputFormat::Pdf);
    assert_eq!(cfg.form.question_count, DEFAULT_QUESTIONS);
    assert_eq!(cfg.theme.storage_key, "theme");
    assert_eq!(cfg.static_dir.as_deref(), Some("./web"));
  }

  #[test]
  fn shipped_sample_config_parses() {
    let cfg = parse_app_config(include_str!("../config/quizgen.toml")).expect("sample config");
    assert_eq!(cfg.upstream.base_url.as_deref(), Some(DEFAULT_BASE_URL));
    assert_eq!(cfg.form.question_count, DEFAULT_QUESTIONS);
    assert!(cfg.static_dir.is_none());
  }

  #[test]
  fn empty_document_is_all_defaults() {
    let cfg = parse_app_config("").expect("parse");
    assert!(cfg.upstream.base_url.is_none());
    assert_eq!(cfg.upstream.timeout_secs, 0, "outbound calls wait indefinitely unless configured");
    assert_eq!(AppConfig::default().upstream.timeout_secs, 0);
    assert_eq!(cfg.theme.default, Theme::System);
  }
}
