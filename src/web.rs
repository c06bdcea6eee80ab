//! Browser entry point.
//!
//! Loaded as a wasm module by the chat page; `start` runs on instantiation,
//! binds to `#messages`, `#messageInput` and `#sendButton`, and wires the
//! send button `click` and the input `keypress` (Enter) listeners.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::KeyboardEvent;

use crate::config::WidgetConfig;
use crate::surface::DomSurface;
use crate::transport::HttpTransport;
use crate::widget::{ChatWidget, is_send_key, submit_shared};

type DomWidget = ChatWidget<DomSurface, HttpTransport>;

/// Writes formatted log lines to the browser console.
struct ConsoleWriter;

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf);
        web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn init_logging() {
    // Browsers have no wall clock for the fmt layer, and no environment.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_ansi(false)
                .with_writer(|| ConsoleWriter),
        )
        .with(EnvFilter::new("info"))
        .try_init();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Attach the widget to the current page.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    init_logging();

    let config = WidgetConfig::default();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let origin = window.location().href()?;

    let surface = DomSurface::bind(&document, &config.elements).map_err(js_error)?;
    let transport =
        HttpTransport::new(&origin, &config.backend.endpoint, config.backend.timeout())
            .map_err(js_error)?;

    let input = surface.input_element().clone();
    let button = surface.send_button().clone();
    let widget = Rc::new(RefCell::new(
        ChatWidget::attach(surface, transport, config.labels).map_err(js_error)?,
    ));

    let on_click = {
        let widget = Rc::clone(&widget);
        Closure::<dyn FnMut(_)>::new(move |_: web_sys::MouseEvent| trigger(&widget))
    };
    button.add_event_listener_with_callback("click", on_click.into_js_value().unchecked_ref())?;

    let on_keypress = {
        let widget = Rc::clone(&widget);
        Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if is_send_key(&event.key()) {
                trigger(&widget);
            }
        })
    };
    input.add_event_listener_with_callback(
        "keypress",
        on_keypress.into_js_value().unchecked_ref(),
    )?;

    tracing::info!(name: "widget.started", endpoint = %config.backend.endpoint, "Chat widget started");
    Ok(())
}

/// Start a send cycle unless one is already running.
fn trigger(widget: &Rc<RefCell<DomWidget>>) {
    let handle = Rc::clone(widget);
    spawn_local(async move {
        if let Err(error) = submit_shared(&*handle).await {
            tracing::error!(name: "widget.submit.failed", error = %error, "Chat widget failed to update the page");
        }
    });
}
