//! Response enrichment: enrichment key → illustrative image.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use reqwest::Url;

use crate::Result;

/// Where a resolved image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Passed through to the messenger as-is.
    Remote(Url),
    /// Existing local file, uploaded by the messenger.
    Local(PathBuf),
}

/// Read-only map of enrichment keys to image references, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct ImageMap {
    entries: HashMap<String, String>,
    base_dir: PathBuf,
}

impl ImageMap {
    pub fn new(entries: HashMap<String, String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            entries,
            base_dir: base_dir.into(),
        }
    }

    /// Load the map from `path`; relative references resolve against `base_dir`.
    ///
    /// A missing file is created as `{}`. Empty or malformed content yields an empty map.
    pub async fn load(path: &Path, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();

        let txt = match tokio::fs::read_to_string(path).await {
            Ok(txt) => txt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(path, "{}").await?;
                tracing::info!(path = %path.display(), "created empty image map");
                return Ok(Self::new(HashMap::new(), base_dir));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable image map, images disabled");
                return Ok(Self::new(HashMap::new(), base_dir));
            }
        };

        if txt.trim().is_empty() {
            return Ok(Self::new(HashMap::new(), base_dir));
        }

        let entries = match serde_json::from_str::<HashMap<String, String>>(&txt) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed image map, images disabled");
                HashMap::new()
            }
        };
        tracing::debug!(count = entries.len(), "image map loaded");

        Ok(Self::new(entries, base_dir))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key first, then the part before the first `:` (`cmd:give` → `cmd`).
    pub fn lookup(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.entries.get(key) {
            return Some(v.as_str());
        }
        let (prefix, _) = key.split_once(':')?;
        self.entries.get(prefix).map(String::as_str)
    }

    /// Resolve `key` to a usable image, or `None` (logged) when there is nothing to attach.
    pub fn resolve(&self, key: &str) -> Option<ImageSource> {
        let reference = self.lookup(key)?;

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return match Url::parse(reference) {
                Ok(url) => Some(ImageSource::Remote(url)),
                Err(e) => {
                    tracing::warn!(key, reference, error = %e, "image url is invalid");
                    None
                }
            };
        }

        let path = self.base_dir.join(reference);
        if !path.is_file() {
            tracing::warn!(key, path = %path.display(), "image file not found");
            return None;
        }
        Some(ImageSource::Local(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/{prefix}-{}-{ts}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn map(pairs: &[(&str, &str)], base: &Path) -> ImageMap {
        let entries = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ImageMap::new(entries, base)
    }

    #[test]
    fn lookup_falls_back_to_prefix() {
        let m = map(&[("cmd", "img/cmd.png"), ("cmd:say", "img/say.png")], Path::new("."));
        assert_eq!(m.lookup("cmd:say"), Some("img/say.png"));
        assert_eq!(m.lookup("cmd:give"), Some("img/cmd.png"));
        assert_eq!(m.lookup("cmd"), Some("img/cmd.png"));
        assert_eq!(m.lookup("online"), None);
        assert_eq!(m.lookup("tps:x"), None);
    }

    #[test]
    fn remote_references_are_urls() {
        let m = map(&[("tps", "https://example.com/tps.png")], Path::new("."));
        assert_eq!(
            m.resolve("tps"),
            Some(ImageSource::Remote(
                Url::parse("https://example.com/tps.png").unwrap()
            ))
        );
    }

    #[test]
    fn local_reference_requires_existing_file() {
        let dir = tmp_dir("rcb-images-local");
        std::fs::write(dir.join("online.png"), b"png").unwrap();
        let m = map(&[("online", "online.png"), ("error", "missing.png")], &dir);

        assert_eq!(
            m.resolve("online"),
            Some(ImageSource::Local(dir.join("online.png")))
        );
        assert_eq!(m.resolve("error"), None);
        assert_eq!(m.resolve("start"), None);
    }

    #[tokio::test]
    async fn load_creates_missing_file() {
        let dir = tmp_dir("rcb-images-missing");
        let path = dir.join("images.json");
        let m = ImageMap::load(&path, &dir).await.unwrap();
        assert!(m.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn load_degrades_on_empty_or_malformed_content() {
        let dir = tmp_dir("rcb-images-bad");
        let path = dir.join("images.json");

        std::fs::write(&path, "").unwrap();
        assert!(ImageMap::load(&path, &dir).await.unwrap().is_empty());

        std::fs::write(&path, "{\"cmd\": 1}").unwrap();
        assert!(ImageMap::load(&path, &dir).await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"cmd\": 1}");
    }

    #[tokio::test]
    async fn load_reads_entries() {
        let dir = tmp_dir("rcb-images-ok");
        let path = dir.join("images.json");
        std::fs::write(&path, r#"{"cmd": "cmd.png", "no_access": "https://x.test/no.png"}"#)
            .unwrap();
        let m = ImageMap::load(&path, &dir).await.unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.lookup("cmd:list"), Some("cmd.png"));
    }
}
