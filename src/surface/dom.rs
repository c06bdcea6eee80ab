//! Browser DOM surface.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement};

use super::{Body, ChatSurface, NodeSpec};
use crate::config::ElementIds;
use crate::error::SurfaceError;

fn host_error(e: &JsValue) -> SurfaceError {
    SurfaceError::Host(format!("{e:?}"))
}

fn element(document: &Document, id: &str) -> Result<Element, SurfaceError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| SurfaceError::MissingElement(id.to_string()))
}

fn typed<E: JsCast>(
    document: &Document,
    id: &str,
    expected: &'static str,
) -> Result<E, SurfaceError> {
    element(document, id)?
        .dyn_into::<E>()
        .map_err(|_| SurfaceError::WrongElement {
            id: id.to_string(),
            expected,
        })
}

/// The message container, text input and send button of a page.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
    messages: Element,
    input: HtmlInputElement,
    send_button: HtmlButtonElement,
}

impl DomSurface {
    /// Look the three elements up by id.
    pub fn bind(document: &Document, ids: &ElementIds) -> Result<Self, SurfaceError> {
        Ok(Self {
            document: document.clone(),
            messages: element(document, &ids.messages)?,
            input: typed(document, &ids.input, "input")?,
            send_button: typed(document, &ids.send_button, "button")?,
        })
    }

    pub fn input_element(&self) -> &HtmlInputElement {
        &self.input
    }

    pub fn send_button(&self) -> &HtmlButtonElement {
        &self.send_button
    }
}

impl ChatSurface for DomSurface {
    type Node = Element;

    fn append(&mut self, node: NodeSpec<'_>) -> Result<Element, SurfaceError> {
        let div = self
            .document
            .create_element("div")
            .map_err(|e| host_error(&e))?;
        div.set_class_name(&node.kind.class_name());
        if let Some(marker) = node.kind.marker() {
            div.set_id(marker);
        }
        match node.body {
            Body::Text(text) => div.set_text_content(Some(text)),
            Body::Markup(markup) => div.set_inner_html(markup),
        }
        self.messages
            .append_child(&div)
            .map_err(|e| host_error(&e))?;
        Ok(div)
    }

    fn remove(&mut self, node: &Element) -> Result<(), SurfaceError> {
        // No-op when the node is already detached.
        node.remove();
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SurfaceError> {
        self.messages.set_scroll_top(self.messages.scroll_height());
        Ok(())
    }

    fn input_value(&self) -> String {
        self.input.value()
    }

    fn clear_input(&mut self) -> Result<(), SurfaceError> {
        self.input.set_value("");
        Ok(())
    }

    fn set_controls_enabled(&mut self, enabled: bool) -> Result<(), SurfaceError> {
        self.send_button.set_disabled(!enabled);
        self.input.set_disabled(!enabled);
        Ok(())
    }

    fn focus_input(&mut self) -> Result<(), SurfaceError> {
        self.input.focus().map_err(|e| host_error(&e))
    }
}
