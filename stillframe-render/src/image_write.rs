//! Image file persistence
//!
//! The output format is chosen from the path extension; PNG is the lossless
//! default the rest of the library assumes.

use image::{DynamicImage, RgbaImage};
use std::path::Path;
use stillframe_core::{Error, Result};

/// Persist a pixel buffer at `path`, format decided by the extension
///
/// Fails with [`Error::Write`] when the extension is missing or unsupported,
/// or the path is not writable. No partial output is reported as success.
pub fn write_image<P: AsRef<Path>>(path: P, image: &RgbaImage) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .ok_or_else(|| {
            Error::Write(format!("output path has no extension: {}", path.display()))
        })?;

    let result = match ext.as_str() {
        "png" => image.save(path),
        // Alpha-less formats need a channel drop before encoding
        "jpg" | "jpeg" | "bmp" => DynamicImage::ImageRgba8(image.clone()).to_rgb8().save(path),
        _ => DynamicImage::ImageRgba8(image.clone()).save(path),
    };

    result.map_err(|e| Error::Write(format!("{}: {}", path.display(), e)))?;
    log::debug!("wrote {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stillframe_img_{}_{}", std::process::id(), name))
    }

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_png_roundtrip_is_lossless() {
        let path = temp_path("check.png");
        let img = checker(8, 8);

        write_image(&path, &img).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(loaded.as_raw(), img.as_raw());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_extension() {
        let result = write_image(temp_path("no_extension"), &checker(2, 2));
        assert!(matches!(result, Err(Error::Write(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = write_image(temp_path("image.xyz"), &checker(2, 2));
        assert!(matches!(result, Err(Error::Write(_))));
    }

    #[test]
    fn test_unwritable_path() {
        let path = Path::new("/nonexistent-dir-stillframe/out.png");
        let result = write_image(path, &checker(2, 2));
        assert!(matches!(result, Err(Error::Write(_))));
    }
}
