//! Typed message channels between the bridge and the application core.
//!
//! The core is an external collaborator; nothing here depends on how it is
//! hosted. Messages are published by kind over unbounded channels, one
//! direction per endpoint.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Instruction to start audio playback, applied exactly once as a side
/// effect and not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackCommand {
    pub path: String,
    /// Seek position in seconds.
    pub time: f64,
    /// Playback rate multiplier.
    pub rate: f64,
}

/// Messages the application core sends to the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreMessage {
    /// Target scroll ratio; the bridge multiplies by the container width.
    ActiveHeight(f64),
    Playback(PlaybackCommand),
    CopyText(String),
}

/// Messages the bridge sends to the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum PageMessage {
    /// Scroll offset over container width, at most one per debounce window.
    ScrollRatio(f64),
}

/// Bridge-side half of the port pair.
pub struct BridgeEndpoint {
    pub to_core: mpsc::UnboundedSender<PageMessage>,
    pub from_core: mpsc::UnboundedReceiver<CoreMessage>,
}

/// Core-side half of the port pair.
pub struct CoreEndpoint {
    pub to_bridge: mpsc::UnboundedSender<CoreMessage>,
    pub from_bridge: mpsc::UnboundedReceiver<PageMessage>,
}

/// Create the bidirectional port pair connecting bridge and core.
pub fn channel() -> (BridgeEndpoint, CoreEndpoint) {
    let (to_core, from_bridge) = mpsc::unbounded_channel();
    let (to_bridge, from_core) = mpsc::unbounded_channel();
    (
        BridgeEndpoint { to_core, from_core },
        CoreEndpoint {
            to_bridge,
            from_bridge,
        },
    )
}
