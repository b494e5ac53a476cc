//! The DOM contract the widget renders into.
//!
//! The widget never touches a concrete DOM. It goes through [`WidgetDom`],
//! which is implemented by the in-memory [`Document`] (server-side first paint
//! and tests) and, with the `browser` feature, by the live page.
//!
//! # Structure
//!
//! - [`WidgetDom`]: operations the widget needs from a page
//! - [`DelegatedTarget`]: ancestor walk used by event delegation
//! - [`document`]: arena-backed HTML document
//! - [`shell`]: page skeleton served at `/`

pub mod document;
pub mod shell;

pub use document::{Document, NodeId, NodeRef};
pub use shell::PageShell;

/// Attribute naming the translation key that supplies an element's text.
pub const ATTR_I18N_TEXT: &str = "data-i18n-key";
/// Attribute naming the translation key that supplies an element's placeholder.
pub const ATTR_I18N_PLACEHOLDER: &str = "data-i18n-key-placeholder";
/// Root attribute telling the browser bundle whether to escape transcript text.
pub const ATTR_ESCAPE_HTML: &str = "data-escape-html";
/// Attribute carrying the language tag on language-switch controls.
pub const ATTR_LANG: &str = "data-lang";

/// Container whose `data-lang` descendants switch language.
pub const LANGUAGE_SWITCHER_ID: &str = "language-switcher";
/// Container of the example-question buttons.
pub const EXAMPLES_CONTAINER_ID: &str = "example-questions-container";
/// Scrollable transcript container.
pub const MESSAGES_ID: &str = "chatbot-messages";
/// Message input field.
pub const INPUT_ID: &str = "user-input";
/// Send control.
pub const SEND_BUTTON_ID: &str = "send-button";
/// Class of example-question buttons.
pub const EXAMPLE_BUTTON_CLASS: &str = "example-btn";

/// A transcript bubble ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageElement {
    pub classes: Vec<String>,
    pub id: Option<String>,
    /// Markup inserted as the bubble's content.
    pub html: String,
}

/// Operations the widget performs on its page.
pub trait WidgetDom {
    /// Set the document's `lang` attribute.
    fn set_document_language(&self, tag: &str);

    /// Replace the text of every element tagged with [`ATTR_I18N_TEXT`] whose
    /// key `lookup` resolves; other elements keep their text.
    fn localize_text(&self, lookup: &dyn Fn(&str) -> Option<String>);

    /// Same as [`WidgetDom::localize_text`] for the `placeholder` attribute of
    /// elements tagged with [`ATTR_I18N_PLACEHOLDER`].
    fn localize_placeholders(&self, lookup: &dyn Fn(&str) -> Option<String>);

    /// Clear the example-question container and add one button per question.
    fn replace_example_questions(&self, questions: &[String]);

    /// Append a bubble to the transcript.
    fn append_message(&self, message: &MessageElement);

    /// Remove the transcript element with `id`. Returns whether one existed.
    fn remove_message(&self, id: &str) -> bool;

    /// Scroll the transcript container to its bottom.
    fn scroll_transcript_to_bottom(&self);

    /// Current value of the message input.
    fn input_value(&self) -> String;

    fn clear_input(&self);
}

/// An element an event was dispatched on, walkable towards the root.
pub trait DelegatedTarget: Sized {
    fn attribute(&self, name: &str) -> Option<String>;

    fn text(&self) -> String;

    fn parent(&self) -> Option<Self>;

    fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute value.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(
            escape_html(r#"<b class="x">Tom & 'Jerry'</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("日本語"), "日本語");
    }
}
