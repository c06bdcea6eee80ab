//! Error types for the widget, its transport and its view surfaces.

use thiserror::Error;

/// Failure to obtain a decoded response from the chat endpoint.
///
/// The `Display` text is what the widget shows after the connection-error
/// prefix.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The endpoint could not be resolved to an absolute URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request failed (connect, send, timeout or body read).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The body was not a JSON chat response.
    #[error("invalid response body (HTTP {status}): {source}")]
    Decode {
        /// HTTP status code of the response.
        status: u16,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failure raised by a non-HTTP transport.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure was caused by the configured request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// Failure while manipulating the view.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// A required element is missing from the document.
    #[error("element not found: #{0}")]
    MissingElement(String),

    /// An element exists but has the wrong type.
    #[error("element #{id} is not a {expected}")]
    WrongElement {
        /// Element identifier.
        id: String,
        /// Expected element type.
        expected: &'static str,
    },

    /// The host environment rejected an operation.
    #[error("view operation failed: {0}")]
    Host(String),

    /// Writing to a terminal failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a widget operation.
///
/// Transport failures are not widget errors: they are rendered into the
/// message list and the widget recovers.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// The view could not be updated.
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;
