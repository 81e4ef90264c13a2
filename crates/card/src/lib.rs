//! Transient card overlay anchored to the tray icon.
//!
//! [`CardOverlayHost`] is a single-slot state machine: at most one card is
//! visible, a new card replaces the old one, and an optional one-shot timer
//! hides it automatically. Rendering is delegated to a [`CardPresenter`].

mod headless;
mod host;
mod presenter;

pub use headless::HeadlessPresenter;
pub use host::{ActionCallback, CardInteractions, CardOverlayHost};
pub use presenter::CardPresenter;
