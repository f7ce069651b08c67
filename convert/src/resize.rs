use std::num::NonZeroU32;

use image::{imageops, DynamicImage};

/// Scale an image so that its height matches `height`, keeping the aspect ratio.
///
/// Images that are already no taller than `height` come back unchanged; thumbnails are never enlarged.
pub fn fit_height(input: &DynamicImage, height: NonZeroU32) -> DynamicImage {
    let th = height.get();
    if input.height() <= th {
        return input.clone();
    }

    // Bounding the width by the source width leaves the height as the limiting dimension.
    input.resize(input.width(), th, imageops::FilterType::CatmullRom)
}
