use once_cell::sync::Lazy;
use tracing::subscriber::set_global_default;
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

fn configure_tracing() {
    LogTracer::builder()
        .ignore_crate("rustls")
        .with_max_level(log::LevelFilter::Debug)
        .init()
        .expect("Failed to create logger");

    let env_filter = EnvFilter::try_from_env("LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let tree = HierarchicalLayer::new(2)
        .with_targets(true)
        .with_bracketed_fields(true);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(tree)
        .with(ErrorLayer::default());
    set_global_default(subscriber).expect("Setting subscriber");
}

/// Force this in a test to see its logs. Nothing is installed unless `TEST_LOG` is set.
pub static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        configure_tracing();
    }
});

/// Generated images for tests, so the suite doesn't need binary fixture files.
pub mod fixtures {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    /// A gradient, so encoders have something to work with besides a flat color.
    pub fn image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut output = Cursor::new(Vec::new());
        image(width, height)
            .write_to(&mut output, format)
            .expect("encoding fixture image");
        output.into_inner()
    }

    pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Jpeg)
    }

    pub fn png(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Png)
    }

    pub fn bmp(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Bmp)
    }
}
