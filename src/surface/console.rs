//! Terminal surface.

use std::io::Write;
use std::sync::LazyLock;

use regex::Regex;

use super::{Body, ChatSurface, NodeKind, NodeSpec};
use crate::error::SurfaceError;
use crate::format::{LINE_BREAK, PARAGRAPH_SPACER};
use crate::message::Role;

const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[0m";
const ERASE_LINE: &str = "\r\x1b[2K";
const ERASE_PREVIOUS_LINE: &str = "\x1b[1A\r\x1b[2K";
const PROMPT: &str = "> ";
const USER_PREFIX: &str = "» ";

static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<strong>(.*?)</strong>").expect("strong pattern is valid"));

/// Convert formatter markup back into terminal text.
#[must_use]
pub fn markup_to_terminal(markup: &str) -> String {
    let text = STRONG.replace_all(markup, format!("{BOLD_ON}${{1}}{BOLD_OFF}"));
    text.replace(PARAGRAPH_SPACER, "\n")
        .replace(LINE_BREAK, "\n")
        .replace("&bull;", "•")
}

/// Renders the message list as lines on a terminal.
///
/// The loading indicator is written without a trailing newline so it can be
/// erased in place once the request settles.
#[derive(Debug)]
pub struct ConsoleSurface<W: Write> {
    out: W,
    input: String,
    next_line: usize,
    /// Trailing line that can still be erased.
    erasable: Option<usize>,
    /// The terminal echoed the typed line after the prompt.
    overwrite_echo: bool,
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            input: String::new(),
            next_line: 0,
            erasable: None,
            overwrite_echo: false,
        }
    }

    /// Replace the echoed `> line` with the user message instead of
    /// printing it a second time. Only meaningful on an interactive terminal.
    #[must_use]
    pub fn overwrite_echo(mut self, enabled: bool) -> Self {
        self.overwrite_echo = enabled;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Place a line read from the terminal into the input.
    pub fn set_input(&mut self, line: impl Into<String>) {
        self.input = line.into();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn settle_trailing_line(&mut self) -> std::io::Result<()> {
        if self.erasable.take().is_some() {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> ChatSurface for ConsoleSurface<W> {
    type Node = usize;

    fn append(&mut self, node: NodeSpec<'_>) -> Result<usize, SurfaceError> {
        self.settle_trailing_line()?;
        let line = self.next_line;
        self.next_line += 1;

        match (node.kind, node.body) {
            (NodeKind::Loading, body) => {
                let text = match body {
                    Body::Text(t) => t.to_string(),
                    Body::Markup(m) => markup_to_terminal(m),
                };
                write!(self.out, "{text}")?;
                self.erasable = Some(line);
            }
            (NodeKind::Message(Role::User), Body::Text(text)) => {
                if self.overwrite_echo {
                    write!(self.out, "{ERASE_PREVIOUS_LINE}")?;
                }
                writeln!(self.out, "{USER_PREFIX}{text}")?;
            }
            (NodeKind::Message(_), Body::Text(text)) => writeln!(self.out, "{text}")?,
            (NodeKind::Message(_), Body::Markup(markup)) => {
                writeln!(self.out, "{}", markup_to_terminal(markup))?;
            }
        }
        Ok(line)
    }

    fn remove(&mut self, node: &usize) -> Result<(), SurfaceError> {
        // Only the trailing line can be taken back.
        if self.erasable == Some(*node) {
            self.erasable = None;
            write!(self.out, "{ERASE_LINE}")?;
        }
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SurfaceError> {
        self.out.flush()?;
        Ok(())
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) -> Result<(), SurfaceError> {
        self.input.clear();
        Ok(())
    }

    fn set_controls_enabled(&mut self, _enabled: bool) -> Result<(), SurfaceError> {
        // Lines are read one at a time; nothing to disable.
        Ok(())
    }

    fn focus_input(&mut self) -> Result<(), SurfaceError> {
        self.settle_trailing_line()?;
        write!(self.out, "{PROMPT}")?;
        self.out.flush()?;
        Ok(())
    }
}
