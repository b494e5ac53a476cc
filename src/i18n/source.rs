//! Resource sources.
//!
//! The widget fetches resources over HTTP from `/static/...`; the server reads
//! the same documents straight from its static directory for the first paint.

use url::Url;

use super::{KnowledgeBase, LanguageTag, ResourceBundle, TranslationTable};
use super::{knowledge_path, translations_path};
use crate::error::{Result, WidgetError};

/// Provider of per-language resource documents.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ResourceSource {
    /// Fetch and parse the translation table for `tag`.
    async fn translations(&self, tag: &LanguageTag) -> Result<TranslationTable>;

    /// Fetch and parse the knowledge base for `tag`.
    async fn knowledge(&self, tag: &LanguageTag) -> Result<KnowledgeBase>;
}

/// Fetch both documents for `tag` concurrently.
///
/// Fails as soon as either fetch fails, so callers never observe a language
/// with only one of its two documents.
pub async fn load_bundle<S>(source: &S, tag: &LanguageTag) -> Result<ResourceBundle>
where
    S: ResourceSource + ?Sized,
{
    let (translations, knowledge) =
        futures::try_join!(source.translations(tag), source.knowledge(tag))?;
    Ok(ResourceBundle {
        translations,
        knowledge,
    })
}

/// Resource source backed by `GET {base}/static/...`.
#[derive(Debug, Clone)]
pub struct HttpResourceSource {
    http: reqwest::Client,
    static_root: Url,
}

impl HttpResourceSource {
    /// Create a source for the site rooted at `base` (for example the page origin).
    pub fn new(http: reqwest::Client, base: &Url) -> Result<Self> {
        Ok(Self {
            http,
            static_root: base.join("/static/")?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.static_root.join(path)?;
        tracing::debug!(url = %url, "Fetching widget resource");

        let resp = self.http.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(WidgetError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ResourceSource for HttpResourceSource {
    async fn translations(&self, tag: &LanguageTag) -> Result<TranslationTable> {
        self.get_json(&translations_path(tag)).await
    }

    async fn knowledge(&self, tag: &LanguageTag) -> Result<KnowledgeBase> {
        self.get_json(&knowledge_path(tag)).await
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use fs::FsResourceSource;

#[cfg(not(target_arch = "wasm32"))]
mod fs {
    use std::path::{Path, PathBuf};

    use super::{KnowledgeBase, LanguageTag, ResourceSource, TranslationTable};
    use super::{knowledge_path, translations_path};
    use crate::error::{Result, WidgetError};

    /// Resource source reading from a static directory on disk.
    #[derive(Debug, Clone)]
    pub struct FsResourceSource {
        root: PathBuf,
    }

    impl FsResourceSource {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        pub fn root(&self) -> &Path {
            &self.root
        }

        async fn read_json<T: serde::de::DeserializeOwned>(&self, relative: &str) -> Result<T> {
            let path = self.root.join(relative);
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| WidgetError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            Ok(serde_json::from_slice(&bytes)?)
        }
    }

    #[async_trait::async_trait]
    impl ResourceSource for FsResourceSource {
        async fn translations(&self, tag: &LanguageTag) -> Result<TranslationTable> {
            self.read_json(&translations_path(tag)).await
        }

        async fn knowledge(&self, tag: &LanguageTag) -> Result<KnowledgeBase> {
            self.read_json(&knowledge_path(tag)).await
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::fs;

    fn write_language(root: &std::path::Path, tag: &str, translations: &str, knowledge: &str) {
        fs::create_dir_all(root.join("translations")).unwrap();
        fs::create_dir_all(root.join("knowledge")).unwrap();
        fs::write(root.join(format!("translations/{tag}.json")), translations).unwrap();
        fs::write(root.join(format!("knowledge/{tag}.json")), knowledge).unwrap();
    }

    #[tokio::test]
    async fn test_fs_source_loads_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write_language(
            dir.path(),
            "en",
            r#"{"title": "Support"}"#,
            r#"{"example_questions": ["How do I join?"]}"#,
        );

        let source = FsResourceSource::new(dir.path());
        let tag = LanguageTag::parse("en").unwrap();
        let bundle = load_bundle(&source, &tag).await.unwrap();

        assert_eq!(bundle.translations.get("title"), Some("Support"));
        assert_eq!(bundle.knowledge.example_questions, vec!["How do I join?"]);
    }

    #[tokio::test]
    async fn test_fs_source_fails_when_one_document_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("translations")).unwrap();
        fs::write(dir.path().join("translations/en.json"), "{}").unwrap();

        let source = FsResourceSource::new(dir.path());
        let tag = LanguageTag::parse("en").unwrap();
        let err = load_bundle(&source, &tag).await.unwrap_err();
        assert!(matches!(err, WidgetError::Io { .. }));
    }

    #[tokio::test]
    async fn test_fs_source_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        write_language(dir.path(), "en", "{}", "{ nope");

        let source = FsResourceSource::new(dir.path());
        let tag = LanguageTag::parse("en").unwrap();
        let err = load_bundle(&source, &tag).await.unwrap_err();
        assert!(matches!(err, WidgetError::Json(_)));
    }

    #[tokio::test]
    async fn test_knowledge_without_examples_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        write_language(dir.path(), "en", "{}", r#"{"data": {"fees": "Free"}}"#);

        let source = FsResourceSource::new(dir.path());
        let tag = LanguageTag::parse("en").unwrap();
        let err = load_bundle(&source, &tag).await.unwrap_err();
        assert!(matches!(err, WidgetError::Json(_)));
    }

    #[test]
    fn test_http_source_static_root() {
        let base = Url::parse("http://localhost:5003/chat/").unwrap();
        let source = HttpResourceSource::new(reqwest::Client::new(), &base).unwrap();
        assert_eq!(source.static_root.as_str(), "http://localhost:5003/static/");
        assert_eq!(
            source.static_root.join("knowledge/ja.json").unwrap().as_str(),
            "http://localhost:5003/static/knowledge/ja.json"
        );
    }
}
