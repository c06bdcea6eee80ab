//! Loading indicator.

use crate::error::SurfaceError;
use crate::surface::{Body, ChatSurface, NodeKind, NodeSpec};

/// Tracks the single "thinking" node shown while a request is in flight.
#[derive(Debug)]
pub struct LoadingIndicator<N> {
    label: String,
    node: Option<N>,
}

impl<N> LoadingIndicator<N> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            node: None,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.node.is_some()
    }

    /// Append the indicator and scroll it into view.
    ///
    /// An indicator that is already visible is replaced, so the list never
    /// holds more than one.
    pub fn show<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: ChatSurface<Node = N>,
    {
        self.hide(surface)?;
        let node = surface.append(NodeSpec {
            kind: NodeKind::Loading,
            body: Body::Text(&self.label),
        })?;
        self.node = Some(node);
        surface.scroll_to_bottom()
    }

    /// Remove the indicator if it is visible.
    pub fn hide<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: ChatSurface<Node = N>,
    {
        match self.node.take() {
            Some(node) => surface.remove(&node),
            None => Ok(()),
        }
    }
}
