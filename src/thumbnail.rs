use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::DynamicImage;

use crate::state::data::ItemId;

/// Size of generated thumbnails (longest edge)
pub const THUMBNAIL_SIZE: u32 = 256;

/// Get the thumbnail cache directory, creating it if needed.
/// Returns ~/.cache/face-gallery/thumbnails on Linux, or `None` when no
/// cache location can be determined or created.
pub fn cache_dir() -> Option<PathBuf> {
    let mut path = dirs_next::cache_dir().or_else(|| dirs_next::home_dir())?;

    path.push("face-gallery");
    path.push("thumbnails");

    fs::create_dir_all(&path).ok()?;
    Some(path)
}

/// Render a thumbnail for an already-decoded image into `dir`.
/// Returns the path to the saved thumbnail, or None if generation failed.
pub fn generate_into(dir: &Path, image: &DynamicImage, id: &ItemId) -> Option<PathBuf> {
    let thumbnail = image.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    let path = dir.join(format!("{}.jpg", id));

    // JPEG output cannot carry an alpha channel
    thumbnail.to_rgb8().save(&path).ok()?;

    println!("📸 Generated thumbnail: {}", path.display());
    Some(path)
}

/// The thumbnail path for an item (doesn't generate, just returns the
/// expected path)
pub fn path_for(id: &ItemId) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{}.jpg", id)))
}

/// Check if a thumbnail exists for an item
pub fn exists(id: &ItemId) -> bool {
    path_for(id).map(|path| path.exists()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_generate_writes_a_bounded_jpeg() {
        let dir = TempDir::new().unwrap();
        let source = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            128,
            64,
            image::Rgba([10, 200, 30, 255]),
        ));
        let id = ItemId("thumb-test".into());

        let path = generate_into(dir.path(), &source, &id).unwrap();
        assert_eq!(path, dir.path().join("thumb-test.jpg"));

        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (256, 128));
    }

    #[test]
    fn test_generation_failure_reports_none() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-there");
        let source = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            8,
            8,
            image::Rgba([0, 0, 0, 255]),
        ));

        assert!(generate_into(&missing, &source, &ItemId("x".into())).is_none());
    }
}
