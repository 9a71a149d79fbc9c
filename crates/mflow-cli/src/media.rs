//! Loads user-selected media files.

use std::path::Path;

use anyhow::Context;

use mflow_models::{MediaInput, DEFAULT_IMAGE_MIME, DEFAULT_VIDEO_MIME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// MIME type inferred from the file extension, with a per-kind fallback.
pub fn mime_for_path(path: &Path, kind: MediaKind) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match (kind, extension.as_deref()) {
        (MediaKind::Image, Some("png")) => "image/png",
        (MediaKind::Image, Some("jpg" | "jpeg")) => "image/jpeg",
        (MediaKind::Image, Some("webp")) => "image/webp",
        (MediaKind::Image, _) => DEFAULT_IMAGE_MIME,
        (MediaKind::Video, Some("mp4")) => "video/mp4",
        (MediaKind::Video, Some("mov")) => "video/quicktime",
        (MediaKind::Video, Some("webm")) => "video/webm",
        (MediaKind::Video, _) => DEFAULT_VIDEO_MIME,
    }
}

/// Read a media file into memory. The path doubles as the preview handle.
pub async fn load_media(path: &Path, kind: MediaKind) -> anyhow::Result<MediaInput> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if data.is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }

    Ok(MediaInput::new(data, mime_for_path(path, kind)).with_preview(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("me.JPG"), MediaKind::Image), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("me.webp"), MediaKind::Image), "image/webp");
        assert_eq!(mime_for_path(Path::new("me"), MediaKind::Image), "image/png");
        assert_eq!(mime_for_path(Path::new("dance.mov"), MediaKind::Video), "video/quicktime");
        assert_eq!(mime_for_path(Path::new("dance.bin"), MediaKind::Video), "video/mp4");
    }

    #[tokio::test]
    async fn test_load_media() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let media = load_media(&path, MediaKind::Image).await.unwrap();
        assert_eq!(media.data(), &[0x89, b'P', b'N', b'G']);
        assert_eq!(media.mime_type(), "image/png");
        assert_eq!(media.preview.as_deref(), Some(path.display().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_load_media_rejects_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp4");
        std::fs::write(&empty, b"").unwrap();

        assert!(load_media(&empty, MediaKind::Video).await.is_err());
        assert!(load_media(&dir.path().join("missing.mp4"), MediaKind::Video).await.is_err());
    }
}
