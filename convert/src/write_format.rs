use std::{borrow::Cow, io::Write};

use image::{DynamicImage, GenericImageView, ImageEncoder, ImageFormat};
use thiserror::Error;

fn to_8bit(image: &'_ DynamicImage) -> Cow<'_, DynamicImage> {
    let input_color = image.color();
    match (input_color.has_alpha(), input_color.bytes_per_pixel() > 1) {
        (_, false) => Cow::Borrowed(image),
        (false, true) => Cow::Owned(DynamicImage::from(image.to_rgb8())),
        (true, true) => Cow::Owned(DynamicImage::from(image.to_rgba8())),
    }
}

/// JPEG has no alpha channel, so anything carrying one is flattened to RGB first.
fn to_jpeg_color(image: &'_ DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) => {
            Cow::Owned(DynamicImage::from(image.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::from(image.to_rgb8())),
    }
}

fn write_png(image: &DynamicImage, writer: impl Write) -> Result<(), image::ImageError> {
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        writer,
        image::codecs::png::CompressionType::Best,
        image::codecs::png::FilterType::Adaptive,
    );

    let image = to_8bit(image);
    let (width, height) = image.dimensions();
    encoder.write_image(image.as_bytes(), width, height, image.color())
}

fn write_jpeg(image: &DynamicImage, mut writer: impl Write) -> Result<(), image::ImageError> {
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, 75);
    let image = to_jpeg_color(image);
    let (width, height) = image.dimensions();

    encoder.write_image(image.as_bytes(), width, height, image.color())
}

pub fn write_image(
    image: &DynamicImage,
    output_format: ImageFormat,
    writer: impl Write,
) -> Result<(), EncodeError> {
    match output_format {
        ImageFormat::Png => write_png(image, writer)?,
        ImageFormat::Jpeg => write_jpeg(image, writer)?,
        _ => Err(EncodeError::UnsupportedFormat(output_format))?,
    };

    Ok(())
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    ImageError(image::ImageError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported output format {0:?}")]
    UnsupportedFormat(image::ImageFormat),
}

impl From<image::ImageError> for EncodeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => EncodeError::IoError(e),
            _ => EncodeError::ImageError(err),
        }
    }
}
