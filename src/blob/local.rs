use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use super::{BlobError, BlobInfo, BlobStore, UploadOptions, UploadedBlob};

/// Blobs as files under one directory, published under `base_url`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Each segment is percent-encoded; `/` stays the folder separator
    fn url_for(&self, pathname: &str) -> String {
        let encoded: Vec<_> = pathname.split('/').map(urlencoding::encode).collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }

    /// Map a public URL back to the pathname it was published under
    fn pathname_of(&self, url: &str) -> Result<String, BlobError> {
        let base = url::Url::parse(&format!("{}/", self.base_url))
            .map_err(|_| BlobError::ForeignUrl(url.to_string()))?;
        let target = url::Url::parse(url).map_err(|_| BlobError::ForeignUrl(url.to_string()))?;

        if target.origin() != base.origin() {
            return Err(BlobError::ForeignUrl(url.to_string()));
        }
        let encoded = target
            .path()
            .strip_prefix(base.path())
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;
        let pathname = encoded
            .split('/')
            .map(|segment| urlencoding::decode(segment).map(|s| s.into_owned()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BlobError::InvalidName(encoded.to_string()))?
            .join("/");
        sanitize_pathname(&pathname)
    }
}

/// Reject empty or parent-relative names; keep `/` separated folders.
/// Spaces become `-` so published URLs need no escaping.
pub fn sanitize_pathname(name: &str) -> Result<String, BlobError> {
    let segments: Vec<&str> = name.trim().trim_matches('/').split('/').collect();
    let valid = !segments.is_empty()
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && *segment != "."
                && *segment != ".."
                && !segment.contains('\\')
                && !segment.chars().any(char::is_control)
        });
    if !valid {
        return Err(BlobError::InvalidName(name.to_string()));
    }
    Ok(segments
        .iter()
        .map(|segment| segment.replace(' ', "-"))
        .collect::<Vec<_>>()
        .join("/"))
}

/// `photos/me.png` → `photos/me-<token>.png`
fn with_random_suffix(pathname: &str) -> String {
    let token = &Uuid::new_v4().simple().to_string()[..10];
    let (dir, file) = match pathname.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, pathname),
    };
    let file = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, token, ext),
        _ => format!("{}-{}", file, token),
    };
    match dir {
        Some(dir) => format!("{}/{}", dir, file),
        None => file,
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: Vec<u8>, name: &str, options: UploadOptions) -> Result<UploadedBlob, BlobError> {
        let mut pathname = sanitize_pathname(name)?;
        if options.add_random_suffix {
            pathname = with_random_suffix(&pathname);
        }

        let path = self.root.join(&pathname);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &bytes).await?;

        info!("Stored blob {} ({} bytes)", pathname, bytes.len());
        Ok(UploadedBlob {
            url: self.url_for(&pathname),
            pathname,
        })
    }

    async fn list(&self) -> Result<Vec<BlobInfo>, BlobError> {
        let mut blobs = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                let path = entry.path();
                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let pathname = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                let uploaded_at = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());

                blobs.push(BlobInfo {
                    url: self.url_for(&pathname),
                    pathname,
                    size: metadata.len(),
                    uploaded_at,
                });
            }
        }

        blobs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(blobs)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let pathname = self.pathname_of(url)?;
        match fs::remove_file(self.root.join(&pathname)).await {
            Ok(()) => {
                info!("Deleted blob {}", pathname);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(pathname)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> LocalBlobStore {
        let root = std::env::temp_dir().join(format!("folio-blobs-{}", Uuid::new_v4().simple()));
        LocalBlobStore::new(root, "http://localhost:3000/files/")
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert_eq!(sanitize_pathname("/docs/cv.pdf").unwrap(), "docs/cv.pdf");
        assert!(sanitize_pathname("../etc/passwd").is_err());
        assert!(sanitize_pathname("a//b").is_err());
        assert!(sanitize_pathname("   ").is_err());
        assert_eq!(sanitize_pathname("my cv.pdf").unwrap(), "my-cv.pdf");
    }

    #[test]
    fn random_suffix_goes_before_extension() {
        let named = with_random_suffix("img/me.png");
        assert!(named.starts_with("img/me-"));
        assert!(named.ends_with(".png"));
        assert_ne!(named, "img/me.png");
    }

    #[tokio::test]
    async fn upload_list_delete() {
        let store = scratch();
        let uploaded = store
            .upload(b"hello".to_vec(), "notes/hello.txt", UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(uploaded.pathname, "notes/hello.txt");
        assert_eq!(uploaded.url, "http://localhost:3000/files/notes/hello.txt");

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 5);
        assert_eq!(listed[0].pathname, "notes/hello.txt");

        store.delete(&uploaded.url).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(store.delete(&uploaded.url).await, Err(BlobError::NotFound(_))));

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn names_needing_escapes_round_trip_through_their_url() {
        let store = scratch();
        for name in ["résumé.pdf", "a#b.pdf", "docs/50%?.txt"] {
            let uploaded = store.upload(b"x".to_vec(), name, UploadOptions::default()).await.unwrap();
            assert_eq!(uploaded.pathname, name);
            assert!(url::Url::parse(&uploaded.url).unwrap().fragment().is_none());

            let listed = store.list().await.unwrap();
            assert!(listed.iter().any(|b| b.url == uploaded.url));

            store.delete(&uploaded.url).await.unwrap();
        }
        assert_eq!(store.url_for("résumé.pdf"), "http://localhost:3000/files/r%C3%A9sum%C3%A9.pdf");
        assert!(store.list().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn delete_refuses_foreign_urls() {
        let store = scratch();
        let err = store.delete("https://elsewhere.example/files/x.txt").await.unwrap_err();
        assert!(matches!(err, BlobError::ForeignUrl(_)));
    }

    #[tokio::test]
    async fn list_of_missing_root_is_empty() {
        assert!(scratch().list().await.unwrap().is_empty());
    }
}
