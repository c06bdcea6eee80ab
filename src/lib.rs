//! Chat widget
//!
//! A chat widget controller: reads user input, posts it to a backend `/chat`
//! endpoint and renders the reply into a scrolling message list with light
//! formatting (`**bold**`, `•` bullets, line breaks).
//!
//! # Architecture
//!
//! - **Controller**: [`widget::ChatWidget`], an explicit `Idle`/`Sending`
//!   state machine that owns its view and transport
//! - **View**: [`surface::ChatSurface`], implemented for the browser DOM
//!   (wasm32), a terminal and an in-memory surface
//! - **Transport**: [`transport::ChatTransport`], implemented over `reqwest`
//!
//! # Modules
//!
//! - [`format`]: bot message formatting
//! - [`message`]: wire types and message authorship
//! - [`config`]: element ids, labels and backend settings
//!
//! # Example
//!
//! ```rust,no_run
//! use chat_widget::config::WidgetConfig;
//! use chat_widget::surface::MemorySurface;
//! use chat_widget::transport::HttpTransport;
//! use chat_widget::widget::ChatWidget;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WidgetConfig::default();
//! let surface = MemorySurface::new();
//! let transport = HttpTransport::from_config(&config.backend)?;
//! let mut widget = ChatWidget::attach(surface.clone(), transport, config.labels)?;
//!
//! surface.set_input("carro barato");
//! widget.submit().await?;
//! # Ok(())
//! # }
//! ```

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]

pub mod config;
pub mod error;
pub mod format;
pub mod message;
pub mod surface;
pub mod transport;
pub mod widget;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use error::{SurfaceError, TransportError, WidgetError};
pub use widget::{ChatWidget, SendState, Settlement, Submission};
