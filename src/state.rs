//! Application state shared by all handlers.
//!
//! This module owns:
//!   - the loaded configuration (messages, form defaults, static dir)
//!   - the upstream client, built from the single resolved base URL
//!   - the theme provider
//!
//! Handlers are otherwise stateless; nothing here is mutated per request except the theme.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, AppConfig, Messages};
use crate::form::FormController;
use crate::theme::{ThemeProvider, ThemeStore};
use crate::upstream::Upstream;

pub struct AppState {
    pub config: AppConfig,
    pub messages: Arc<Messages>,
    pub upstream: Upstream,
    pub theme: ThemeProvider,
    /// Owns the theme directory of test states; removed on drop.
    #[cfg(test)]
    scratch: Option<tempfile::TempDir>,
}

impl AppState {
    /// Build state from env: load config, resolve the upstream base URL, restore the theme.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let config = load_app_config_from_env();
        let base_url = config.base_url_from_env();
        Self::from_config(config, base_url)
    }

    pub fn from_config(config: AppConfig, base_url: String) -> Result<Self, reqwest::Error> {
        let upstream = Upstream::new(base_url, config.upstream.timeout_secs)?;
        info!(
            target: "quizgen_backend",
            base_url = %upstream.base_url,
            timeout_secs = config.upstream.timeout_secs,
            "Upstream generation service configured"
        );

        let store = ThemeStore::new(config.theme.path.clone(), config.theme.storage_key.clone());
        let theme = ThemeProvider::new(store, config.theme.default);
        let messages = Arc::new(config.messages.clone());

        Ok(Self {
            config,
            messages,
            upstream,
            theme,
            #[cfg(test)]
            scratch: None,
        })
    }

    /// A fresh form bound to the configured service and defaults.
    pub fn new_form(&self) -> FormController {
        FormController::new(self.upstream.clone(), self.messages.clone(), self.config.form.clone())
    }

    /// The theme file lives in a temporary directory deleted with the state.
    #[cfg(test)]
    pub(crate) fn for_tests(base_url: &str) -> Self {
        let scratch = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.theme.path = scratch.path().join("theme.toml");
        config.upstream.timeout_secs = 5;
        let mut state = Self::from_config(config, base_url.to_string()).expect("test state");
        state.scratch = Some(scratch);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_removes_its_theme_dir_on_drop() {
        let state = AppState::for_tests("http://127.0.0.1:9");
        state.theme.set(crate::theme::Theme::Dark).await.expect("set");
        let dir = state.config.theme.path.parent().expect("parent").to_path_buf();
        assert!(dir.join("theme.toml").exists());

        drop(state);
        assert!(!dir.exists());
    }
}
