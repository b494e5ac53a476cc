//! Browser binding of the widget.
//!
//! [`BrowserDom`] implements [`WidgetDom`] on the live page through web-sys.
//! [`start`] runs when the module is instantiated: it wires the delegated
//! listeners on the document and loads the default language.

use std::rc::Rc;

use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement};

use crate::backend::{HttpAskBackend, build_client};
use crate::dom::{
    ATTR_ESCAPE_HTML, ATTR_I18N_PLACEHOLDER, ATTR_I18N_TEXT, DelegatedTarget,
    EXAMPLE_BUTTON_CLASS, EXAMPLES_CONTAINER_ID, INPUT_ID, MESSAGES_ID, MessageElement, WidgetDom,
};
use crate::error::WidgetError;
use crate::i18n::{HttpResourceSource, LanguageTag};
use crate::widget::events::{resolve_click, resolve_keydown};
use crate::widget::{ChatWidget, WidgetOptions};

type PageWidget = ChatWidget<BrowserDom, HttpResourceSource, HttpAskBackend>;

fn to_js(e: &WidgetError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The live page.
#[derive(Debug, Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn each_with_attribute(&self, attr: &str, mut f: impl FnMut(&Element, String)) {
        let Ok(nodes) = self.document.query_selector_all(&format!("[{attr}]")) else {
            return;
        };
        for i in 0..nodes.length() {
            let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if let Some(key) = el.get_attribute(attr) {
                f(&el, key);
            }
        }
    }

    fn input(&self) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(INPUT_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }
}

impl WidgetDom for BrowserDom {
    fn set_document_language(&self, tag: &str) {
        if let Some(root) = self.document.document_element() {
            let _ = root.set_attribute("lang", tag);
        }
    }

    fn localize_text(&self, lookup: &dyn Fn(&str) -> Option<String>) {
        self.each_with_attribute(ATTR_I18N_TEXT, |el, key| {
            if let Some(text) = lookup(&key) {
                el.set_text_content(Some(&text));
            }
        });
    }

    fn localize_placeholders(&self, lookup: &dyn Fn(&str) -> Option<String>) {
        self.each_with_attribute(ATTR_I18N_PLACEHOLDER, |el, key| {
            if let Some(text) = lookup(&key) {
                let _ = el.set_attribute("placeholder", &text);
            }
        });
    }

    fn replace_example_questions(&self, questions: &[String]) {
        let Some(container) = self.document.get_element_by_id(EXAMPLES_CONTAINER_ID) else {
            return;
        };
        container.set_inner_html("");
        for question in questions {
            let Ok(button) = self.document.create_element("button") else {
                continue;
            };
            let _ = button.set_attribute("type", "button");
            button.set_class_name(EXAMPLE_BUTTON_CLASS);
            button.set_text_content(Some(question));
            let _ = container.append_child(&button);
        }
    }

    fn append_message(&self, message: &MessageElement) {
        let Some(transcript) = self.document.get_element_by_id(MESSAGES_ID) else {
            return;
        };
        let Ok(div) = self.document.create_element("div") else {
            return;
        };
        div.set_class_name(&message.classes.join(" "));
        if let Some(id) = &message.id {
            div.set_id(id);
        }
        div.set_inner_html(&message.html);
        let _ = transcript.append_child(&div);
    }

    fn remove_message(&self, id: &str) -> bool {
        match self.document.get_element_by_id(id) {
            Some(el) => {
                el.remove();
                true
            }
            None => false,
        }
    }

    fn scroll_transcript_to_bottom(&self) {
        if let Some(transcript) = self.document.get_element_by_id(MESSAGES_ID) {
            transcript.set_scroll_top(transcript.scroll_height());
        }
    }

    fn input_value(&self) -> String {
        self.input().map(|i| i.value()).unwrap_or_default()
    }

    fn clear_input(&self) {
        if let Some(input) = self.input() {
            input.set_value("");
        }
    }
}

impl DelegatedTarget for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn text(&self) -> String {
        self.text_content().unwrap_or_default()
    }

    fn parent(&self) -> Option<Self> {
        self.parent_element()
    }
}

fn event_element(event: &web_sys::Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn install_listeners(document: &Document, widget: &Rc<PageWidget>) -> Result<(), JsValue> {
    let clicked = Rc::clone(widget);
    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(ui) = event_element(&event).and_then(resolve_click) else {
            return;
        };
        let widget = Rc::clone(&clicked);
        spawn_local(async move { widget.handle(ui).await });
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let typed = Rc::clone(widget);
    let on_keydown =
        Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |event: web_sys::KeyboardEvent| {
            let Some(target) = event_element(&event) else {
                return;
            };
            let Some(ui) = resolve_keydown(&target, &event.key(), event.is_composing()) else {
                return;
            };
            let widget = Rc::clone(&typed);
            spawn_local(async move { widget.handle(ui).await });
        });
    document.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();

    Ok(())
}

/// Entry point run on module instantiation.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let origin = window.location().origin()?;

    let base = Url::parse(&origin).map_err(|e| to_js(&e.into()))?;
    let http = build_client(None).map_err(|e| to_js(&e))?;
    let source = HttpResourceSource::new(http.clone(), &base).map_err(|e| to_js(&e))?;
    let backend = HttpAskBackend::new(http, &base).map_err(|e| to_js(&e))?;

    let root = document.document_element();
    let default_language = root
        .as_ref()
        .and_then(|r| r.get_attribute("data-default-lang"))
        .and_then(|raw| LanguageTag::parse(&raw).ok())
        .unwrap_or_default();
    let options = WidgetOptions {
        escape_html: root
            .as_ref()
            .and_then(|r| r.get_attribute(ATTR_ESCAPE_HTML))
            .is_none_or(|v| v != "false"),
    };

    let widget = Rc::new(ChatWidget::new(
        BrowserDom::new(document.clone()),
        source,
        backend,
        default_language.clone(),
        options,
    ));
    install_listeners(&document, &widget)?;

    spawn_local(async move {
        if let Err(e) = widget.set_language(&default_language).await {
            web_sys::console::error_1(&to_js(&e));
        }
    });
    Ok(())
}
