//! Chat transcript: user and bot bubbles plus loading placeholders.

use std::fmt;

use super::linkify::linkify;
use crate::dom::{MessageElement, WidgetDom};

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the element for one bubble.
///
/// The id is attached only to loading placeholders; it is the handle the
/// dispatcher later removes them by.
pub fn message_element(
    sender: Sender,
    text: &str,
    is_loading: bool,
    id: Option<&str>,
    escape_html: bool,
) -> MessageElement {
    let mut classes = vec!["message".to_string(), format!("{sender}-message")];
    let mut element_id = None;
    if is_loading {
        classes.push("loading-message".to_string());
        element_id = id.map(str::to_string);
    }
    MessageElement {
        classes,
        id: element_id,
        html: linkify(text, escape_html),
    }
}

/// Transcript operations over a page.
#[derive(Debug)]
pub struct Transcript<'a, D: ?Sized> {
    dom: &'a D,
    escape_html: bool,
}

impl<'a, D: WidgetDom + ?Sized> Transcript<'a, D> {
    pub fn new(dom: &'a D, escape_html: bool) -> Self {
        Self { dom, escape_html }
    }

    /// Append a bubble and scroll the transcript to the bottom.
    pub fn add_message(&self, sender: Sender, text: &str, is_loading: bool, id: Option<&str>) {
        let element = message_element(sender, text, is_loading, id, self.escape_html);
        self.dom.append_message(&element);
        self.dom.scroll_transcript_to_bottom();
    }

    /// Remove the bubble with `id`; a missing bubble is not an error.
    pub fn remove_message(&self, id: &str) {
        if !self.dom.remove_message(id) {
            tracing::debug!(id = %id, "No transcript entry to remove");
        }
    }
}
