//! Message round trips: placeholder ids and the localized failure text.

use std::cell::Cell;

use crate::i18n::{LanguageTag, TranslationTable};

/// Text of the loading placeholder bubble.
pub const LOADING_TEXT: &str = "...";

/// Translation key that overrides the built-in failure text.
pub const NETWORK_ERROR_KEY: &str = "network_error";

const NETWORK_ERROR_JA: &str =
    "申し訳ありませんが、ネットワーク接続に問題が発生しました。しばらくしてから再度お試しください。";
const NETWORK_ERROR_EN: &str =
    "Sorry, a network connection issue occurred. Please try again later.";

/// How a `send_message` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send; the transcript was not touched.
    Skipped,
    /// The backend answered.
    Answered,
    /// The round trip failed and the error bubble was shown.
    Failed,
}

/// Generator of loading-placeholder ids, unique for the widget's lifetime.
#[derive(Debug, Default)]
pub struct PlaceholderIds {
    seq: Cell<u64>,
}

impl PlaceholderIds {
    pub fn next_id(&self) -> String {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        format!(
            "loading-{}-{seq}",
            chrono::Utc::now().timestamp_millis()
        )
    }
}

/// Failure text for the current language.
///
/// The current translation table wins when it defines
/// [`NETWORK_ERROR_KEY`]; otherwise English gets the English text and every
/// other language the Japanese source text.
pub fn network_error_message(tag: &LanguageTag, table: Option<&TranslationTable>) -> String {
    if let Some(text) = table.and_then(|t| t.get(NETWORK_ERROR_KEY)) {
        return text.to_string();
    }
    if tag.is_english() {
        NETWORK_ERROR_EN.to_string()
    } else {
        NETWORK_ERROR_JA.to_string()
    }
}
