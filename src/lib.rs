//! Browser UI for the webcam emotion-recognition backend.
//!
//! This crate is intentionally a stub by default so the workspace builds on native/windows
//! targets without requiring wasm toolchains.
//!
//! Enable the real app with: `--features web` (and a wasm32 target).
//!
//! The modules below the feature gate are pure and host-testable: the feed lifecycle
//! state machine, the emotion display reconciler and the small UI vocabulary all run
//! (and are unit-tested) without a browser.

pub mod emotion;
pub mod stream;
pub mod ui_model;

/// Placeholder function for non-web (or non-wasm) builds.
#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
pub fn placeholder() {
    // No-op.
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::start;
