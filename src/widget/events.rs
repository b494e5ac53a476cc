//! Event delegation.
//!
//! Listeners are bound once on stable ancestors. When an event arrives, the
//! target and its ancestors are inspected to decide what it means, so
//! regenerated children (example buttons after a language switch) need no
//! rebinding.

use crate::dom::{
    ATTR_LANG, DelegatedTarget, EXAMPLE_BUTTON_CLASS, EXAMPLES_CONTAINER_ID, INPUT_ID,
    LANGUAGE_SWITCHER_ID, SEND_BUTTON_ID,
};
use crate::i18n::LanguageTag;

/// A user action the widget reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A language-switch control was clicked.
    SwitchLanguage(LanguageTag),
    /// An example question was clicked; carries its label.
    AskExample(String),
    /// The send control was clicked or Enter was pressed in the input.
    Send,
}

fn ancestors<T: DelegatedTarget>(target: T) -> Vec<T> {
    let mut chain = Vec::new();
    let mut current = Some(target);
    while let Some(node) = current {
        current = node.parent();
        chain.push(node);
    }
    chain
}

fn has_ancestor_id<T: DelegatedTarget>(chain: &[T], id: &str) -> bool {
    chain.iter().any(|n| n.id().as_deref() == Some(id))
}

/// Interpret a click on `target`.
///
/// The closest matching element wins: a `data-lang` control inside the
/// language switcher, an example button inside the example container, or the
/// send button. Clicks anywhere else yield `None`.
pub fn resolve_click<T: DelegatedTarget>(target: T) -> Option<UiEvent> {
    let chain = ancestors(target);
    for (i, node) in chain.iter().enumerate() {
        let above = &chain[i + 1..];

        if node.id().as_deref() == Some(SEND_BUTTON_ID) {
            return Some(UiEvent::Send);
        }

        if let Some(lang) = node.attribute(ATTR_LANG)
            && has_ancestor_id(above, LANGUAGE_SWITCHER_ID)
        {
            return match LanguageTag::parse(&lang) {
                Ok(tag) => Some(UiEvent::SwitchLanguage(tag)),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring language switch");
                    None
                }
            };
        }

        if node.has_class(EXAMPLE_BUTTON_CLASS) && has_ancestor_id(above, EXAMPLES_CONTAINER_ID) {
            return Some(UiEvent::AskExample(node.text()));
        }
    }
    None
}

/// Interpret a keydown on `target`: Enter in the message input sends.
///
/// Enter while an IME composition is active only commits the composition.
pub fn resolve_keydown<T: DelegatedTarget>(
    target: &T,
    key: &str,
    is_composing: bool,
) -> Option<UiEvent> {
    let in_input = target.id().as_deref() == Some(INPUT_ID);
    (in_input && key == "Enter" && !is_composing).then_some(UiEvent::Send)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, NodeId};

    struct Page {
        doc: Document,
        ja: NodeId,
        stray_lang: NodeId,
        example: NodeId,
        example_label: NodeId,
        send: NodeId,
        input: NodeId,
    }

    fn page() -> Page {
        let doc = Document::new();
        let body = doc.body();

        let switcher = doc.append_element(body, "div");
        doc.set_attribute(switcher, "id", LANGUAGE_SWITCHER_ID);
        let ja = doc.append_element(switcher, "button");
        doc.set_attribute(ja, ATTR_LANG, "ja");

        let stray_lang = doc.append_element(body, "span");
        doc.set_attribute(stray_lang, ATTR_LANG, "en");

        let examples = doc.append_element(body, "div");
        doc.set_attribute(examples, "id", EXAMPLES_CONTAINER_ID);
        let example = doc.append_element(examples, "button");
        doc.set_attribute(example, "class", EXAMPLE_BUTTON_CLASS);
        let example_label = doc.append_element(example, "span");
        doc.set_text(example_label, "会費はいくらですか？");

        let send = doc.append_element(body, "button");
        doc.set_attribute(send, "id", SEND_BUTTON_ID);
        let input = doc.append_element(body, "input");
        doc.set_attribute(input, "id", INPUT_ID);

        Page {
            doc,
            ja,
            stray_lang,
            example,
            example_label,
            send,
            input,
        }
    }

    #[test]
    fn test_language_click() {
        let p = page();
        assert_eq!(
            resolve_click(p.doc.node(p.ja)),
            Some(UiEvent::SwitchLanguage(LanguageTag::parse("ja").unwrap()))
        );
    }

    #[test]
    fn test_language_click_outside_switcher_is_ignored() {
        let p = page();
        assert_eq!(resolve_click(p.doc.node(p.stray_lang)), None);
    }

    #[test]
    fn test_example_click_uses_label() {
        let p = page();
        let expected = Some(UiEvent::AskExample("会費はいくらですか？".to_string()));
        assert_eq!(resolve_click(p.doc.node(p.example)), expected);
        // Clicks on inner markup bubble up to the button.
        assert_eq!(resolve_click(p.doc.node(p.example_label)), expected);
    }

    #[test]
    fn test_send_click() {
        let p = page();
        assert_eq!(resolve_click(p.doc.node(p.send)), Some(UiEvent::Send));
        assert_eq!(resolve_click(p.doc.node(p.doc.body())), None);
    }

    #[test]
    fn test_invalid_language_tag_is_ignored() {
        let p = page();
        p.doc.set_attribute(p.ja, ATTR_LANG, "../etc");
        assert_eq!(resolve_click(p.doc.node(p.ja)), None);
    }

    #[test]
    fn test_enter_key() {
        let p = page();
        let input = p.doc.node(p.input);
        assert_eq!(resolve_keydown(&input, "Enter", false), Some(UiEvent::Send));
        assert_eq!(resolve_keydown(&input, "Enter", true), None);
        assert_eq!(resolve_keydown(&input, "a", false), None);

        let send = p.doc.node(p.send);
        assert_eq!(resolve_keydown(&send, "Enter", false), None);
    }
}
