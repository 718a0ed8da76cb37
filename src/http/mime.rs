//! MIME type detection module
//!
//! Content-Type for stored artifacts, keyed by file extension. Only image
//! types are recognized.

/// Get MIME Content-Type based on file extension
///
/// Extensions are expected lowercased; anything unknown is served as
/// `application/octet-stream`.
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("tga") => "image/x-tga",
        Some("qoi") => "image/qoi",
        _ => "application/octet-stream",
    }
}
