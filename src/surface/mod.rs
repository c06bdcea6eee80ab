//! View surfaces the widget renders into.
//!
//! A [`ChatSurface`] is the widget's view of its three elements: the message
//! list container, the text input and the send control.
//!
//! # Implementations
//!
//! - [`MemorySurface`]: headless, observable from tests
//! - [`ConsoleSurface`]: terminal output
//! - `DomSurface`: browser DOM (wasm32 with the `web` feature)

mod console;
mod memory;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod dom;

pub use console::{ConsoleSurface, markup_to_terminal};
pub use memory::{MemorySurface, NodeId, RenderedContent, RenderedNode};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use dom::DomSurface;

use crate::error::SurfaceError;
use crate::message::Role;

/// Base class carried by every node in the message list.
pub const MESSAGE_CLASS: &str = "message";

/// Identifier of the loading indicator node.
pub const LOADING_MARKER: &str = "loading-message";

/// What a node in the message list represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A chat message.
    Message(Role),
    /// The "thinking" placeholder shown while a request is in flight.
    Loading,
}

impl NodeKind {
    /// Full class attribute, e.g. `message bot-message`.
    #[must_use]
    pub fn class_name(self) -> String {
        match self {
            Self::Message(role) => format!("{MESSAGE_CLASS} {}", role.css_class()),
            Self::Loading => format!("{MESSAGE_CLASS} loading"),
        }
    }

    /// Fixed identifier, if this kind of node carries one.
    #[must_use]
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::Message(_) => None,
            Self::Loading => Some(LOADING_MARKER),
        }
    }
}

/// Node content and how the surface must insert it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body<'a> {
    /// Literal text. Never interpreted as markup.
    Text(&'a str),
    /// Trusted markup produced by the formatter.
    Markup(&'a str),
}

/// A node to append to the message list.
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec<'a> {
    pub kind: NodeKind,
    pub body: Body<'a>,
}

/// The widget's view: message list, text input and send control.
pub trait ChatSurface {
    /// Handle to an appended node.
    type Node: std::fmt::Debug;

    /// Append a node at the end of the message list.
    fn append(&mut self, node: NodeSpec<'_>) -> Result<Self::Node, SurfaceError>;

    /// Remove a node. Removing a node that is already gone is a no-op.
    fn remove(&mut self, node: &Self::Node) -> Result<(), SurfaceError>;

    /// Scroll the message list so the newest node is visible.
    fn scroll_to_bottom(&mut self) -> Result<(), SurfaceError>;

    /// Current value of the text input.
    fn input_value(&self) -> String;

    fn clear_input(&mut self) -> Result<(), SurfaceError>;

    /// Enable or disable both the text input and the send control.
    fn set_controls_enabled(&mut self, enabled: bool) -> Result<(), SurfaceError>;

    fn focus_input(&mut self) -> Result<(), SurfaceError>;
}
