//! In-memory surface.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Body, ChatSurface, NodeKind, NodeSpec};
use crate::error::SurfaceError;
use crate::message::Role;

/// Identifier of a node appended to a [`MemorySurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

/// Content of a rendered node, as inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedContent {
    /// Inserted as text content.
    Text(String),
    /// Inserted as markup.
    Markup(String),
}

impl RenderedContent {
    /// The inserted string, regardless of how it was inserted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Markup(s) => s,
        }
    }
}

/// A node currently present in the message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub class_name: String,
    pub marker: Option<&'static str>,
    pub content: RenderedContent,
}

/// Headless surface.
///
/// Clones share the same state, so a test can keep one handle while the
/// widget owns another and inspect the view mid-request.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug)]
struct MemoryState {
    nodes: Vec<RenderedNode>,
    next_id: u64,
    input: String,
    controls_enabled: bool,
    input_focused: bool,
    /// Number of nodes visible when the list was last scrolled to the end.
    scrolled_through: usize,
    /// Appends left before one is rejected.
    fail_append_in: Option<usize>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 0,
            input: String::new(),
            controls_enabled: true,
            input_focused: false,
            scrolled_through: 0,
            fail_append_in: None,
        }
    }
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Type into the text input.
    pub fn set_input(&self, value: impl Into<String>) {
        self.write().input = value.into();
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.read().input.clone()
    }

    /// Snapshot of the message list, oldest first.
    #[must_use]
    pub fn nodes(&self) -> Vec<RenderedNode> {
        self.read().nodes.clone()
    }

    /// Messages by the given author, oldest first.
    #[must_use]
    pub fn messages(&self, role: Role) -> Vec<RenderedNode> {
        self.read()
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Message(role))
            .cloned()
            .collect()
    }

    /// Number of loading indicator nodes currently present.
    #[must_use]
    pub fn loading_count(&self) -> usize {
        self.read()
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Loading)
            .count()
    }

    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        self.read().controls_enabled
    }

    #[must_use]
    pub fn input_focused(&self) -> bool {
        self.read().input_focused
    }

    /// Whether the newest node is in view.
    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        let state = self.read();
        state.scrolled_through == state.nodes.len()
    }

    /// Reject the `nth` upcoming `append` (0 is the next one), as a host
    /// would on a detached document.
    pub fn fail_append(&self, nth: usize) {
        self.write().fail_append_in = Some(nth);
    }
}

impl ChatSurface for MemorySurface {
    type Node = NodeId;

    fn append(&mut self, node: NodeSpec<'_>) -> Result<NodeId, SurfaceError> {
        let mut state = self.write();
        let pending = state.fail_append_in;
        if let Some(n) = pending {
            state.fail_append_in = n.checked_sub(1);
            if n == 0 {
                return Err(SurfaceError::Host("append rejected".to_string()));
            }
        }

        let id = NodeId(state.next_id);
        state.next_id += 1;
        let content = match node.body {
            Body::Text(text) => RenderedContent::Text(text.to_string()),
            Body::Markup(markup) => RenderedContent::Markup(markup.to_string()),
        };
        state.nodes.push(RenderedNode {
            id,
            kind: node.kind,
            class_name: node.kind.class_name(),
            marker: node.kind.marker(),
            content,
        });
        Ok(id)
    }

    fn remove(&mut self, node: &NodeId) -> Result<(), SurfaceError> {
        let mut state = self.write();
        state.nodes.retain(|n| n.id != *node);
        state.scrolled_through = state.scrolled_through.min(state.nodes.len());
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SurfaceError> {
        let mut state = self.write();
        state.scrolled_through = state.nodes.len();
        Ok(())
    }

    fn input_value(&self) -> String {
        self.input()
    }

    fn clear_input(&mut self) -> Result<(), SurfaceError> {
        self.write().input.clear();
        Ok(())
    }

    fn set_controls_enabled(&mut self, enabled: bool) -> Result<(), SurfaceError> {
        let mut state = self.write();
        state.controls_enabled = enabled;
        if !enabled {
            state.input_focused = false;
        }
        Ok(())
    }

    fn focus_input(&mut self) -> Result<(), SurfaceError> {
        let mut state = self.write();
        // A disabled input cannot take focus.
        state.input_focused = state.controls_enabled;
        Ok(())
    }
}
