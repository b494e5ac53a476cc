//! LARUbot chat widget
//!
//! A chat widget front end: it paints a conversational UI, loads per-language
//! translations and knowledge bases, forwards user messages to a
//! question-answering endpoint and renders the answers.
//!
//! # Architecture
//!
//! - **Widget**: DOM-agnostic core driving a [`dom::WidgetDom`]
//! - **Server**: Axum server painting the first page and serving static resources
//! - **Browser**: web-sys binding of the same core (feature `browser`, wasm32)
//!
//! # Modules
//!
//! - [`i18n`]: language tags, translation tables, knowledge bases
//! - [`dom`]: DOM contract, in-memory document, page shell
//! - [`widget`]: resource loader, renderer, transcript, dispatcher, events
//! - [`backend`]: `/ask` client

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod dom;
pub mod error;
pub mod i18n;
pub mod widget;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(not(target_arch = "wasm32"))]
pub mod telemetry;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub mod browser;

pub use error::{Result, WidgetError};
pub use widget::{ChatWidget, WidgetOptions};
