use std::num::NonZeroU32;

use image::{DynamicImage, ImageFormat};
pub use error::Error;
pub use resize::fit_height;
pub use write_format::EncodeError;

mod error;
pub mod resize;
pub mod write_format;

pub fn image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, Error> {
    image::load_from_memory(bytes)
        .map_err(|e| Error::read_error(image::guess_format(bytes).ok(), e))
}

/// Downscale `image` to `height` and encode it in `format`.
pub fn thumbnail(
    image: &DynamicImage,
    height: NonZeroU32,
    format: ImageFormat,
) -> Result<Vec<u8>, EncodeError> {
    let resized = fit_height(image, height);
    let mut output = Vec::new();

    write_format::write_image(&resized, format, &mut output)?;
    Ok(output)
}

/// Split a path into the part before the extension and the extension itself, including its dot.
/// Only the final path component is considered, and a leading dot does not start an extension.
pub fn split_extension(location: &str) -> (&str, &str) {
    let name_start = location.rfind('/').map(|i| i + 1).unwrap_or(0);
    match location[name_start..].rfind('.') {
        Some(0) | None => (location, ""),
        Some(dot) => location.split_at(name_start + dot),
    }
}

/// The location of the thumbnail of the given height, stored next to its source:
/// `<stem>_<height>px_thumbnail<ext>`.
pub fn thumbnail_location(source_location: &str, height: u32) -> String {
    let (stem, ext) = split_extension(source_location);
    format!("{stem}_{height}px_thumbnail{ext}")
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use image::GenericImageView;

    use super::*;

    #[test]
    fn thumbnail_location_inserts_suffix() {
        assert_eq!(
            thumbnail_location("usr123/images/cat.jpg", 200),
            "usr123/images/cat_200px_thumbnail.jpg"
        );
        assert_eq!(
            thumbnail_location("usr123/images/cat.tar.png", 400),
            "usr123/images/cat.tar_400px_thumbnail.png"
        );
        assert_eq!(
            thumbnail_location("dir.v2/cat", 200),
            "dir.v2/cat_200px_thumbnail"
        );
        assert_eq!(thumbnail_location(".hidden", 50), ".hidden_50px_thumbnail");
    }

    #[test]
    fn thumbnail_keeps_format_and_ratio() {
        let source = image_from_bytes(&thumbtier_test::fixtures::jpeg(900, 600)).unwrap();
        let output = thumbnail(&source, NonZeroU32::new(200).unwrap(), ImageFormat::Jpeg).unwrap();

        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (300, 200));
    }

    #[test]
    fn garbage_does_not_decode() {
        let err = image_from_bytes(b"definitely not an image").expect_err("should fail");
        assert!(matches!(err, Error::Read { format: None, .. }));
    }
}
