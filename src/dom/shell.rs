//! Page skeleton.
//!
//! Builds the markup the widget binds to: the language switcher, transcript,
//! example-question container, input and send control, each carrying the
//! ids and localization attributes from [`crate::dom`].

use super::{
    ATTR_I18N_PLACEHOLDER, ATTR_I18N_TEXT, ATTR_LANG, Document, EXAMPLES_CONTAINER_ID, INPUT_ID,
    LANGUAGE_SWITCHER_ID, MESSAGES_ID, SEND_BUTTON_ID,
};
use crate::i18n::LanguageTag;

/// Browser bundle module, relative to the static directory.
///
/// Produced by `tools/build-wasm.sh` (`wasm-bindgen --target web`).
pub const BUNDLE_MODULE: &str = "pkg/larubot_widget.js";

fn bundle_loader() -> String {
    format!("import init from '/static/{BUNDLE_MODULE}';\ninit().catch((e) => console.error(e));")
}

/// Inputs of the page skeleton.
#[derive(Debug, Clone)]
pub struct PageShell {
    /// Fallback title, replaced by the `page_title` translation.
    pub title: String,
    pub default_language: LanguageTag,
    /// Languages offered in the switcher, in display order.
    pub languages: Vec<LanguageTag>,
    /// Whether to include the browser bundle loader.
    pub with_bundle: bool,
}

/// Display label of a language in its own script.
pub fn language_label(tag: &LanguageTag) -> String {
    let primary = tag.primary().to_ascii_lowercase();
    match primary.as_str() {
        "ja" => "日本語".to_string(),
        "en" => "English".to_string(),
        "zh" => "中文".to_string(),
        "ko" => "한국어".to_string(),
        _ => tag.as_str().to_uppercase(),
    }
}

impl PageShell {
    /// Build the unlocalized skeleton.
    pub fn build(&self) -> Document {
        let doc = Document::new();
        let root = doc.root();
        doc.set_attribute(root, "lang", self.default_language.as_str());
        doc.set_attribute(root, "data-default-lang", self.default_language.as_str());

        let head = doc.head();
        let charset = doc.append_element(head, "meta");
        doc.set_attribute(charset, "charset", "utf-8");
        let viewport = doc.append_element(head, "meta");
        doc.set_attribute(viewport, "name", "viewport");
        doc.set_attribute(viewport, "content", "width=device-width, initial-scale=1");
        let title = doc.append_element(head, "title");
        doc.set_attribute(title, ATTR_I18N_TEXT, "page_title");
        doc.set_text(title, &self.title);
        let css = doc.append_element(head, "link");
        doc.set_attribute(css, "rel", "stylesheet");
        doc.set_attribute(css, "href", "/static/style.css");
        if self.with_bundle {
            let script = doc.append_element(head, "script");
            doc.set_attribute(script, "type", "module");
            doc.set_inner_html(script, &bundle_loader());
        }

        let container = doc.append_element(doc.body(), "div");
        doc.set_attribute(container, "class", "chatbot-container");

        let header = doc.append_element(container, "div");
        doc.set_attribute(header, "class", "chatbot-header");
        let heading = doc.append_element(header, "h1");
        doc.set_attribute(heading, ATTR_I18N_TEXT, "header_title");
        doc.set_text(heading, &self.title);

        let switcher = doc.append_element(header, "div");
        doc.set_attribute(switcher, "id", LANGUAGE_SWITCHER_ID);
        doc.set_attribute(switcher, "class", "language-switcher");
        for tag in &self.languages {
            let button = doc.append_element(switcher, "button");
            doc.set_attribute(button, "type", "button");
            doc.set_attribute(button, "class", "lang-btn");
            doc.set_attribute(button, ATTR_LANG, tag.as_str());
            doc.set_text(button, &language_label(tag));
        }

        let messages = doc.append_element(container, "div");
        doc.set_attribute(messages, "id", MESSAGES_ID);
        doc.set_attribute(messages, "class", "chatbot-messages");
        let welcome = doc.append_element(messages, "div");
        doc.set_attribute(welcome, "class", "message bot-message");
        doc.set_attribute(welcome, ATTR_I18N_TEXT, "welcome_message");

        let examples = doc.append_element(container, "div");
        doc.set_attribute(examples, "class", "example-questions");
        let examples_title = doc.append_element(examples, "p");
        doc.set_attribute(examples_title, ATTR_I18N_TEXT, "example_title");
        let list = doc.append_element(examples, "div");
        doc.set_attribute(list, "id", EXAMPLES_CONTAINER_ID);

        let input_row = doc.append_element(container, "div");
        doc.set_attribute(input_row, "class", "chatbot-input");
        let input = doc.append_element(input_row, "input");
        doc.set_attribute(input, "type", "text");
        doc.set_attribute(input, "id", INPUT_ID);
        doc.set_attribute(input, "autocomplete", "off");
        doc.set_attribute(input, ATTR_I18N_PLACEHOLDER, "input_placeholder");
        let send = doc.append_element(input_row, "button");
        doc.set_attribute(send, "type", "button");
        doc.set_attribute(send, "id", SEND_BUTTON_ID);
        doc.set_attribute(send, ATTR_I18N_TEXT, "send_button");
        doc.set_text(send, "送信");

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::WidgetDom;

    fn shell(with_bundle: bool) -> PageShell {
        PageShell {
            title: "LARUbot".to_string(),
            default_language: LanguageTag::parse("ja").unwrap(),
            languages: vec![
                LanguageTag::parse("ja").unwrap(),
                LanguageTag::parse("en").unwrap(),
            ],
            with_bundle,
        }
    }

    #[test]
    fn test_shell_exposes_dom_contract() {
        let doc = shell(false).build();

        for id in [
            LANGUAGE_SWITCHER_ID,
            EXAMPLES_CONTAINER_ID,
            MESSAGES_ID,
            INPUT_ID,
            SEND_BUTTON_ID,
        ] {
            assert!(doc.element_by_id(id).is_some(), "missing #{id}");
        }

        let switches = doc.elements_with_attribute(ATTR_LANG);
        assert_eq!(switches.len(), 2);
        assert_eq!(doc.text_content(switches[0]), "日本語");
        assert_eq!(doc.text_content(switches[1]), "English");

        assert_eq!(doc.attribute(doc.root(), "lang").as_deref(), Some("ja"));
        assert_eq!(doc.input_value(), "");
    }

    #[test]
    fn test_bundle_loader_is_optional() {
        assert!(!shell(false).build().render().contains("larubot_widget.js"));
        assert!(shell(true).build().render().contains("larubot_widget.js"));
    }

    #[test]
    fn test_language_labels() {
        assert_eq!(language_label(&LanguageTag::parse("en-US").unwrap()), "English");
        assert_eq!(language_label(&LanguageTag::parse("fr").unwrap()), "FR");
    }
}
