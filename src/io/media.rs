// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image asset loading.
//!
//! Elements and backgrounds refer to images by reference string. Local
//! references (plain paths or `file://` URLs) are decoded with the `image`
//! crate; remote and inline references are left to whoever can fetch them.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Decoded RGBA8 image.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Local file behind an image reference, if it is one.
pub fn resolve_reference(reference: &str) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("file:") {
        return Url::parse(reference).ok()?.to_file_path().ok();
    }
    if reference.contains("://") || reference.starts_with("data:") {
        return None;
    }
    Some(PathBuf::from(reference))
}

/// Turn a picked file into the reference stored on an element. Paths that
/// cannot be made absolute are stored as they are.
pub fn reference_for(path: &Path) -> String {
    let absolute = path
        .canonicalize()
        .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(path)))
        .unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|()| path.display().to_string())
}

/// Load an image file.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    Ok(LoadedImage {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
    })
}

/// Load the image behind a reference.
pub fn load_reference(reference: &str) -> Result<image::RgbaImage> {
    let path = resolve_reference(reference)
        .ok_or_else(|| anyhow!("Not a local image reference: {}", abbreviate(reference)))?;
    let loaded = load_image(&path)?;
    image::RgbaImage::from_raw(loaded.width, loaded.height, loaded.pixels)
        .ok_or_else(|| anyhow!("Image buffer size mismatch for {}", path.display()))
}

/// Shorten long references (data URLs) for log output.
pub fn abbreviate(reference: &str) -> String {
    const MAX: usize = 64;
    if reference.chars().count() <= MAX {
        reference.to_string()
    } else {
        let head: String = reference.chars().take(MAX).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reference() {
        assert_eq!(
            resolve_reference("file:///tmp/a.png"),
            Some(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(resolve_reference("/tmp/b.jpg"), Some(PathBuf::from("/tmp/b.jpg")));
        assert_eq!(resolve_reference("https://example.com/qr.png"), None);
        assert_eq!(resolve_reference("data:image/png;base64,AAAA"), None);
        assert_eq!(resolve_reference("  "), None);
        assert_eq!(
            resolve_reference("file:///tmp/my%20photos/a%23b.png"),
            Some(PathBuf::from("/tmp/my photos/a#b.png"))
        );
        assert_eq!(resolve_reference("file://remote-host/a.png"), None);
    }

    #[test]
    fn test_reference_for_escapes_path() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("my photos");
        std::fs::create_dir(&folder).unwrap();
        let path = folder.join("50% off #1.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 255, 255]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let reference = reference_for(&path);
        assert!(reference.starts_with("file:///"), "{reference}");
        assert!(!reference.contains(' '), "{reference}");
        assert!(Url::parse(&reference).is_ok());
        assert_eq!(resolve_reference(&reference), Some(path.canonicalize().unwrap()));
        assert_eq!(load_reference(&reference).unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn test_load_reference_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let loaded = load_reference(&reference_for(&path)).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert!(load_reference("https://example.com/x.png").is_err());
    }

    #[test]
    fn test_abbreviate() {
        let long = "x".repeat(200);
        assert_eq!(abbreviate(&long).len(), 67);
        assert_eq!(abbreviate("short"), "short");
    }
}
