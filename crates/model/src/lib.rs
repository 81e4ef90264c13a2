//! Data model shared by the tray, card and bridge crates.
//!
//! Everything here is plain owned data: menu trees and card descriptions
//! parsed from host payloads, and the [`TrayEvent`] values produced by user
//! interaction. Parsing never aliases the input payload.

mod card;
mod error;
mod event;
mod menu;

pub use card::{CardAction, CardConfig};
pub use error::ModelError;
pub use event::{TrayEvent, TrayEventKind};
pub use menu::{MenuItem, MenuKind, parse_menu};
