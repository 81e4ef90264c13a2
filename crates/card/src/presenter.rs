//! Rendering seam for card overlays.

use traybridge_model::CardConfig;

use crate::host::CardInteractions;

/// Draws cards on screen.
///
/// Implementations render the title, body and action buttons near the tray
/// icon, plus a full-screen layer that dismisses the card when clicked.
/// Button clicks go to [`CardInteractions::action`], outside clicks to
/// [`CardInteractions::dismiss`].
///
/// Both methods run with the host's slot locked; they must not call back
/// into the interactions handle synchronously.
pub trait CardPresenter: Send + 'static {
    /// Whether a card could be shown right now. Checked before the visible
    /// card is touched, so a `false` leaves it in place.
    fn can_attach(&self) -> bool {
        true
    }

    /// Shows `card`. Returns `false` when there is no valid attachment point
    /// (e.g. the UI context is not ready yet).
    fn present(&mut self, card: &CardConfig, interactions: CardInteractions) -> bool;

    /// Removes the visible card, if any.
    fn remove(&mut self);
}
