//! The chat widget.
//!
//! [`ChatWidget`] owns the session state (current language and the resource
//! cache) and drives a [`WidgetDom`] through the resource loader, renderer,
//! transcript and dispatcher.
//!
//! Execution is single-threaded and cooperative: state lives in a `RefCell`
//! that is never borrowed across an await, so several round trips may be in
//! flight at once, each resolving its own loading placeholder.
//!
//! # Structure
//!
//! - [`renderer`]: applies a language to the page
//! - [`transcript`]: chat bubbles and placeholders
//! - [`linkify`]: URL wrapping
//! - [`dispatcher`]: placeholder ids and failure text
//! - [`events`]: event delegation

pub mod dispatcher;
pub mod events;
pub mod linkify;
pub mod renderer;
pub mod transcript;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::AskBackend;
use crate::dom::WidgetDom;
use crate::error::Result;
use crate::i18n::{LanguageTag, ResourceBundle, ResourceSource, load_bundle};

pub use dispatcher::SendOutcome;
pub use events::UiEvent;
pub use transcript::{Sender, Transcript};

use dispatcher::{LOADING_TEXT, PlaceholderIds, network_error_message};

/// Widget behavior switches.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Escape HTML-significant characters in transcript text.
    pub escape_html: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self { escape_html: true }
    }
}

/// Session state owned by the widget.
#[derive(Debug, Default)]
pub struct WidgetState {
    current: LanguageTag,
    cache: HashMap<LanguageTag, Rc<ResourceBundle>>,
}

impl WidgetState {
    /// State whose current language is `tag`, with nothing loaded yet.
    pub fn new(tag: LanguageTag) -> Self {
        Self {
            current: tag,
            cache: HashMap::new(),
        }
    }

    pub fn current_language(&self) -> &LanguageTag {
        &self.current
    }

    pub fn is_loaded(&self, tag: &LanguageTag) -> bool {
        self.cache.contains_key(tag)
    }

    pub fn bundle(&self, tag: &LanguageTag) -> Option<Rc<ResourceBundle>> {
        self.cache.get(tag).map(Rc::clone)
    }
}

/// Chat widget bound to a page, a resource source and an answering backend.
#[derive(Debug)]
pub struct ChatWidget<D, S, B> {
    dom: D,
    source: S,
    backend: B,
    options: WidgetOptions,
    state: RefCell<WidgetState>,
    ids: PlaceholderIds,
}

impl<D, S, B> ChatWidget<D, S, B>
where
    D: WidgetDom,
    S: ResourceSource,
    B: AskBackend,
{
    /// Create a widget whose initial language is `default_language`.
    ///
    /// Nothing is fetched until [`ChatWidget::set_language`] is called.
    pub fn new(
        dom: D,
        source: S,
        backend: B,
        default_language: LanguageTag,
        options: WidgetOptions,
    ) -> Self {
        Self {
            dom,
            source,
            backend,
            options,
            state: RefCell::new(WidgetState::new(default_language)),
            ids: PlaceholderIds::default(),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn current_language(&self) -> LanguageTag {
        self.state.borrow().current.clone()
    }

    pub fn is_loaded(&self, tag: &LanguageTag) -> bool {
        self.state.borrow().is_loaded(tag)
    }

    fn transcript(&self) -> Transcript<'_, D> {
        Transcript::new(&self.dom, self.options.escape_html)
    }

    /// Make `tag` the current language.
    ///
    /// Already current and loaded: nothing happens. Loaded earlier: the page
    /// is repainted from the cache. Otherwise both documents are fetched
    /// together; if either fails the error is logged and returned and neither
    /// the page nor the current language changes.
    pub async fn set_language(&self, tag: &LanguageTag) -> Result<()> {
        let cached = {
            let state = self.state.borrow();
            if state.current == *tag && state.is_loaded(tag) {
                tracing::debug!(lang = %tag, "Language already active");
                return Ok(());
            }
            state.bundle(tag)
        };

        let bundle = if let Some(bundle) = cached {
            tracing::debug!(lang = %tag, "Language served from cache");
            bundle
        } else {
            let loaded = match load_bundle(&self.source, tag).await {
                Ok(bundle) => Rc::new(bundle),
                Err(e) => {
                    tracing::error!(
                        name: "widget.language.failed",
                        lang = %tag,
                        error = %e,
                        "Failed to load language files"
                    );
                    return Err(e);
                }
            };
            let mut state = self.state.borrow_mut();
            let entry = state
                .cache
                .entry(tag.clone())
                .or_insert_with(|| Rc::clone(&loaded));
            tracing::info!(
                name: "widget.language.loaded",
                lang = %tag,
                translations = entry.translations.len(),
                example_questions = entry.knowledge.example_questions.len(),
                "Language resources loaded"
            );
            Rc::clone(entry)
        };

        self.state.borrow_mut().current = tag.clone();
        renderer::update_ui(&self.dom, tag, &bundle);
        Ok(())
    }

    /// Send `message`, or the trimmed input value when `None`, to the backend
    /// and render the answer.
    ///
    /// Blank text is ignored. Otherwise the transcript receives the user
    /// bubble and a loading placeholder; once the round trip ends the
    /// placeholder is removed and exactly one answer or error bubble follows.
    pub async fn send_message(&self, message: Option<&str>) -> SendOutcome {
        let text = message.map_or_else(|| self.dom.input_value(), str::to_string);
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Skipped;
        }

        let transcript = self.transcript();
        transcript.add_message(Sender::User, text, false, None);
        self.dom.clear_input();

        let placeholder = self.ids.next_id();
        transcript.add_message(Sender::Bot, LOADING_TEXT, true, Some(&placeholder));
        tracing::debug!(placeholder = %placeholder, "Message sent");

        let result = self.backend.ask(text).await;
        transcript.remove_message(&placeholder);

        match result {
            Ok(resp) => {
                transcript.add_message(Sender::Bot, &resp.answer, false, None);
                SendOutcome::Answered
            }
            Err(e) => {
                tracing::error!(
                    name: "widget.ask.failed",
                    placeholder = %placeholder,
                    error = %e,
                    "Fetch error"
                );
                let error_text = {
                    let state = self.state.borrow();
                    let table = state.cache.get(&state.current).map(|b| &b.translations);
                    network_error_message(&state.current, table)
                };
                transcript.add_message(Sender::Bot, &error_text, false, None);
                SendOutcome::Failed
            }
        }
    }

    /// React to a delegated event.
    pub async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::SwitchLanguage(tag) => {
                // Failures are already logged and leave the page as it was.
                let _ = self.set_language(&tag).await;
            }
            UiEvent::AskExample(question) => {
                self.send_message(Some(&question)).await;
            }
            UiEvent::Send => {
                self.send_message(None).await;
            }
        }
    }
}
