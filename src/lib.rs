// Shared by the binary, the integration tests and the criterion benchmarks.
rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
