//! Quizgen · test generator backend
//!
//! - `routes`: axum HTTP surface (generation proxy, form layout, theme, health)
//! - `form`: form controller driving the upload and generation services
//! - `widgets`: slider and radio group as plain data
//! - `upstream`: reqwest client for the external generation/upload service
//! - `theme`: persisted light/dark preference

pub mod config;
pub mod domain;
pub mod error;
pub mod form;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod theme;
pub mod upstream;
pub mod util;
pub mod widgets;
