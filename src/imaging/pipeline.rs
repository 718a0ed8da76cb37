//! Upload → downsize → filter → store

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use super::filters::FilterKind;
use crate::logger;
use crate::store::{ImageRef, ImageStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("uploaded file is not a supported image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode filtered image: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("image task failed: {0}")]
    Task(String),
}

impl FilterError {
    /// Whether the failure is the uploader's fault rather than ours
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result of a successful filter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredImage {
    pub reference: ImageRef,
    pub filter: FilterKind,
    pub width: u32,
    pub height: u32,
}

/// Shrink `img` so neither side exceeds `max_dimension`, keeping aspect ratio.
/// Images already within bounds are returned unchanged.
pub fn downsize(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w > max_dimension || h > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    }
}

/// Formats whose encoders accept the 8-bit RGB(A) buffers the filters produce
const OUTPUT_FORMATS: [ImageFormat; 8] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Tga,
    ImageFormat::Qoi,
];

fn is_output_format(format: &ImageFormat) -> bool {
    OUTPUT_FORMATS.contains(format) && format.writing_enabled()
}

/// Pick the output format: the filename's extension if we can encode it,
/// else whatever the upload was, else PNG
fn output_format(file_name: &str, bytes: &[u8]) -> ImageFormat {
    ImageFormat::from_path(Path::new(file_name))
        .ok()
        .filter(is_output_format)
        .or_else(|| image::guess_format(bytes).ok().filter(is_output_format))
        .unwrap_or(ImageFormat::Png)
}

/// Name the artifact after the upload, with the extension of the format
/// actually written
fn stored_name(file_name: &str, format: ImageFormat) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    let extension = format.extensions_str().first().copied().unwrap_or("png");
    format!("{stem}.{extension}")
}

/// Encode `img` into `format`, dropping alpha for formats that cannot hold it
fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
    let img = if img.color().has_alpha() && format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img.clone()
    };
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)?;
    Ok(buf.into_inner())
}

/// Encode into the preferred format, retrying as PNG if that encoder refuses
fn encode_with_fallback(
    img: &DynamicImage,
    format: ImageFormat,
) -> Result<(ImageFormat, Vec<u8>), image::ImageError> {
    match encode(img, format) {
        Ok(bytes) => Ok((format, bytes)),
        Err(e) if format != ImageFormat::Png => {
            logger::log_warning(&format!(
                "Encoding as {format:?} failed, saving as PNG instead: {e}"
            ));
            encode(img, ImageFormat::Png).map(|bytes| (ImageFormat::Png, bytes))
        }
        Err(e) => Err(e),
    }
}

/// Run the full pipeline for one upload. Blocking; call from a blocking task.
pub fn filter_upload(
    store: &dyn ImageStore,
    filter: FilterKind,
    file_name: &str,
    bytes: &[u8],
    max_dimension: u32,
) -> Result<FilteredImage, FilterError> {
    let decoded = image::load_from_memory(bytes).map_err(FilterError::Decode)?;
    let resized = downsize(decoded, max_dimension);
    let filtered = filter.apply(&resized);

    let (format, encoded) = encode_with_fallback(&filtered, output_format(file_name, bytes))
        .map_err(FilterError::Encode)?;
    let reference = store.put(filter.name(), &stored_name(file_name, format), &encoded)?;

    Ok(FilteredImage {
        reference,
        filter,
        width: filtered.width(),
        height: filtered.height(),
    })
}
