//! Applies a loaded language to the page.

use crate::dom::WidgetDom;
use crate::i18n::{LanguageTag, ResourceBundle};

/// Paint `bundle` onto `dom`: document language, localized text and
/// placeholders, and a fresh set of example-question buttons.
///
/// Keys missing from the translation table leave their elements untouched.
pub fn update_ui<D: WidgetDom + ?Sized>(dom: &D, tag: &LanguageTag, bundle: &ResourceBundle) {
    dom.set_document_language(tag.as_str());

    let lookup = |key: &str| bundle.translations.get(key).map(str::to_string);
    dom.localize_text(&lookup);
    dom.localize_placeholders(&lookup);

    dom.replace_example_questions(&bundle.knowledge.example_questions);

    tracing::debug!(
        name: "widget.ui.updated",
        lang = %tag,
        example_count = bundle.knowledge.example_questions.len(),
        "UI updated"
    );
}
