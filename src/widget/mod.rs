//! The chat widget controller.
//!
//! [`ChatWidget`] owns its view ([`ChatSurface`]) and its transport
//! ([`ChatTransport`]) and runs one input → request → render cycle per
//! [`ChatWidget::submit`]:
//!
//! ```text
//! Idle ──submit (non-blank input)──▶ Sending ──request settles──▶ Idle
//! ```
//!
//! While `Sending`, the input and send control are disabled and a loading
//! indicator is shown. Whatever the outcome, the cycle ends with the controls
//! re-enabled and the input focused.

mod loading;

pub use loading::LoadingIndicator;

use std::cell::RefCell;
use std::io::Write;

use crate::config::Labels;
use crate::error::{Result, SurfaceError, TransportError};
use crate::format::format_bot_message;
use crate::message::{ChatReply, ChatRequest, Role};
use crate::surface::{Body, ChatSurface, ConsoleSurface, NodeKind, NodeSpec};
use crate::transport::ChatTransport;

/// Send controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendState {
    /// Controls enabled, no request outstanding.
    #[default]
    Idle,
    /// One request outstanding, controls disabled.
    Sending,
}

/// Why a submission did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty or whitespace only.
    Blank,
    /// A request is already outstanding.
    Busy,
}

/// How a request settled.
#[derive(Debug)]
pub enum Settlement {
    /// The backend answered; the reply has been rendered.
    Replied(ChatReply),
    /// No response was obtained; the failure has been rendered.
    Failed(TransportError),
}

/// Result of one [`ChatWidget::submit`].
#[derive(Debug)]
pub enum Submission {
    /// Nothing was rendered or sent.
    Ignored(IgnoreReason),
    /// A request went out and its outcome is on screen.
    Settled {
        /// Request that was sent.
        request: ChatRequest,
        /// What came back.
        settlement: Settlement,
    },
}

/// Key that sends the input when pressed in the text field.
pub const SEND_KEY: &str = "Enter";

/// Whether a key press in the text field triggers a send.
#[must_use]
pub fn is_send_key(key: &str) -> bool {
    key == SEND_KEY
}

/// Strip the characters a browser's `String.prototype.trim` strips.
fn trim_input(input: &str) -> &str {
    input.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Chat widget bound to a surface and a transport.
#[derive(Debug)]
pub struct ChatWidget<S: ChatSurface, T> {
    surface: S,
    transport: T,
    labels: Labels,
    loading: LoadingIndicator<S::Node>,
    state: SendState,
}

impl<S, T> ChatWidget<S, T>
where
    S: ChatSurface,
    T: ChatTransport,
{
    /// Bind the widget to its view and focus the input.
    pub fn attach(mut surface: S, transport: T, labels: Labels) -> Result<Self> {
        surface.focus_input()?;
        tracing::debug!(name: "widget.attached", "Chat widget attached");
        Ok(Self {
            loading: LoadingIndicator::new(labels.loading.clone()),
            surface,
            transport,
            labels,
            state: SendState::Idle,
        })
    }

    #[must_use]
    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Append a message and scroll it into view.
    ///
    /// `User` content is inserted as literal text. `Bot` content goes through
    /// [`format_bot_message`] and is inserted as markup.
    pub fn render(&mut self, content: &str, author: Role) -> Result<()> {
        let kind = NodeKind::Message(author);
        match author {
            Role::User => self.surface.append(NodeSpec {
                kind,
                body: Body::Text(content),
            })?,
            Role::Bot => {
                let markup = format_bot_message(content);
                self.surface.append(NodeSpec {
                    kind,
                    body: Body::Markup(&markup),
                })?
            }
        };
        self.surface.scroll_to_bottom()?;
        Ok(())
    }

    /// Run one send cycle with the current input.
    ///
    /// Returns [`Submission::Ignored`] without touching the view when the
    /// trimmed input is blank or a request is already outstanding.
    /// Transport failures are rendered and reported in the returned
    /// [`Settlement`]; only view failures surface as `Err`, after the controls
    /// have been restored.
    pub async fn submit(&mut self) -> Result<Submission> {
        if self.state == SendState::Sending {
            tracing::debug!(name: "widget.submit.ignored", reason = "busy", "Submission ignored");
            return Ok(Submission::Ignored(IgnoreReason::Busy));
        }

        let text = trim_input(&self.surface.input_value()).to_string();
        if text.is_empty() {
            tracing::debug!(name: "widget.submit.ignored", reason = "blank", "Submission ignored");
            return Ok(Submission::Ignored(IgnoreReason::Blank));
        }

        self.render(&text, Role::User)?;
        self.surface.clear_input()?;

        let request = ChatRequest::new(text);
        let mut cycle = SendCycle::begin(self);
        let exchanged = cycle.widget.exchange(&request).await;
        let restored = cycle.finish();

        let settlement = exchanged?;
        restored?;
        Ok(Submission::Settled {
            request,
            settlement,
        })
    }

    /// Steps run while `Sending`: disable, show loading, send, hide loading,
    /// render the outcome.
    async fn exchange(&mut self, request: &ChatRequest) -> Result<Settlement> {
        self.surface.set_controls_enabled(false)?;
        self.loading.show(&mut self.surface)?;

        let result = self.transport.send(request).await;
        self.loading.hide(&mut self.surface)?;

        let settlement = match result {
            Ok(response) => {
                let reply = response.into_reply();
                let text = match &reply {
                    ChatReply::Answer(answer) => answer.clone(),
                    ChatReply::Error(error) => format!("{}{error}", self.labels.error_prefix),
                    ChatReply::Empty => {
                        format!("{}{}", self.labels.error_prefix, self.labels.empty_reply)
                    }
                };
                self.render(&text, Role::Bot)?;
                Settlement::Replied(reply)
            }
            Err(error) => {
                tracing::warn!(
                    name: "chat.request.failed",
                    error = %error,
                    timeout = error.is_timeout(),
                    "Chat request failed"
                );
                let text = format!("{}{error}", self.labels.connection_error_prefix);
                self.render(&text, Role::Bot)?;
                Settlement::Failed(error)
            }
        };
        Ok(settlement)
    }
}

impl<S: ChatSurface, T> ChatWidget<S, T> {
    /// Unconditional end of a cycle. Attempts every step even if one fails.
    fn restore_controls(&mut self) -> std::result::Result<(), SurfaceError> {
        let hidden = self.loading.hide(&mut self.surface);
        let enabled = self.surface.set_controls_enabled(true);
        let focused = self.surface.focus_input();
        hidden.and(enabled).and(focused)
    }
}

/// The `Sending` phase of one cycle.
///
/// Dropping the cycle before [`SendCycle::finish`] (the `submit` future was
/// cancelled mid-request) still hides the indicator, re-enables the controls
/// and returns the widget to `Idle`.
struct SendCycle<'a, S: ChatSurface, T> {
    widget: &'a mut ChatWidget<S, T>,
    finished: bool,
}

impl<'a, S: ChatSurface, T> SendCycle<'a, S, T> {
    fn begin(widget: &'a mut ChatWidget<S, T>) -> Self {
        widget.state = SendState::Sending;
        Self {
            widget,
            finished: false,
        }
    }

    fn finish(mut self) -> std::result::Result<(), SurfaceError> {
        self.finished = true;
        let restored = self.widget.restore_controls();
        self.widget.state = SendState::Idle;
        restored
    }
}

impl<S: ChatSurface, T> Drop for SendCycle<'_, S, T> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::debug!(name: "widget.submit.cancelled", "Send cycle dropped before settling");
        if let Err(error) = self.widget.restore_controls() {
            tracing::warn!(name: "widget.restore.failed", error = %error, "Failed to restore controls");
        }
        self.widget.state = SendState::Idle;
    }
}

/// Run a send cycle on a widget shared between event handlers.
///
/// The borrow is held until the cycle settles; a trigger that arrives while
/// it is held is the busy case and returns [`IgnoreReason::Busy`].
#[allow(clippy::await_holding_refcell_ref)]
pub async fn submit_shared<S, T>(widget: &RefCell<ChatWidget<S, T>>) -> Result<Submission>
where
    S: ChatSurface,
    T: ChatTransport,
{
    let Ok(mut widget) = widget.try_borrow_mut() else {
        tracing::debug!(name: "widget.submit.ignored", reason = "busy", "Submission ignored");
        return Ok(Submission::Ignored(IgnoreReason::Busy));
    };
    widget.submit().await
}

impl<W, T> ChatWidget<ConsoleSurface<W>, T>
where
    W: Write,
    T: ChatTransport,
{
    /// Submit one line read from the terminal.
    ///
    /// An ignored line redraws the prompt.
    pub async fn submit_line(&mut self, line: impl Into<String>) -> Result<Submission> {
        self.surface.set_input(line);
        let submission = self.submit().await?;
        if let Submission::Ignored(_) = submission {
            self.surface.focus_input()?;
        }
        Ok(submission)
    }
}
