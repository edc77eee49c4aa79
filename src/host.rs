//! Trait seams for the browser primitives the bridge drives.
//!
//! The page, its audio element, the scrollable container, and the clipboard
//! are given platform collaborators; the bridge only needs the narrow
//! surfaces below. [`crate::headless::SimPage`] provides an in-memory
//! implementation for tests and the demo binary.

use keyboard_types::{Code, Modifiers};
use tokio::sync::mpsc;
use url::Url;

/// Imperative audio control.
pub trait AudioHandle {
    fn set_source(&mut self, path: &str);
    fn seek(&mut self, time: f64);
    fn set_rate(&mut self, rate: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
}

/// A vertically scrollable element.
pub trait ScrollRegion {
    fn scroll_top(&self) -> f64;
    fn set_scroll_top(&mut self, offset: f64);
    fn client_width(&self) -> f64;
}

/// Fire-and-forget clipboard writes; no confirmation is relayed back.
pub trait Clipboard {
    fn write_text(&mut self, text: &str);
}

/// Child-list change somewhere in the tree. Carries no payload; watchers
/// re-run their predicate against the tree instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationEvent;

/// Scroll event snapshot taken from the container at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_width: f64,
}

/// A key press observed at the page level, independent of focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub code: Code,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(code: Code, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

/// The page the bridge is attached to.
pub trait PageHost {
    /// Current location, including any query string.
    fn location(&self) -> Url;

    fn element_exists(&self, id: &str) -> bool;

    /// Scroll the element with `id` into view. Returns false when absent.
    fn reveal(&mut self, id: &str) -> bool;

    fn add_root_class(&mut self, class: &str);

    fn audio(&mut self, id: &str) -> Option<&mut dyn AudioHandle>;

    fn scroll_region(&mut self, id: &str) -> Option<&mut dyn ScrollRegion>;

    fn clipboard(&mut self) -> &mut dyn Clipboard;

    /// Child-list mutation notifications for the whole tree.
    fn subscribe_mutations(&mut self) -> mpsc::UnboundedReceiver<MutationEvent>;

    /// Scroll events for the element with `id`, if it exists.
    fn subscribe_scroll(&mut self, id: &str) -> Option<mpsc::UnboundedReceiver<ScrollMetrics>>;

    /// Page-level key presses, delivered for the lifetime of the page.
    fn subscribe_keys(&mut self) -> mpsc::UnboundedReceiver<KeyInput>;
}
