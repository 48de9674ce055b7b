//! Terminal hardware monitor that highlights every metric that changed since
//! the previous sample.
//!
//! A [`system::collector::Sampler`] produces a [`system::snapshot::Snapshot`]
//! per tick, [`diff::diff`] compares it with the previous one and a
//! [`render::Renderer`] draws the result in one of three styles.

pub mod action;
pub mod app;
pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod format;
pub mod logging;
pub mod render;
pub mod system;
pub mod ui;
