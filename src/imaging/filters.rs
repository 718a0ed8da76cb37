//! Filter catalog and convolution
//!
//! Each catalog entry is a fixed convolution kernel. Output channels are
//! computed as `sum / scale + offset`, rounded and clamped to `0..=255`,
//! with borders replicated. Alpha is passed through untouched.

use image::{DynamicImage, ImageBuffer, Pixel};
use std::fmt;
use std::str::FromStr;

use crate::forms::ValidationError;

/// Filters offered by the image filter page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Blur,
    Contour,
    Detail,
    EdgeEnhance,
    Emboss,
    Sharpen,
    Smooth,
}

/// Convolution kernel definition
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// Side length (3 or 5)
    pub size: usize,
    /// Row-major weights, `size * size` long
    pub weights: &'static [i32],
    pub scale: i32,
    pub offset: i32,
}

#[rustfmt::skip]
const BLUR: [i32; 25] = [
    1, 1, 1, 1, 1,
    1, 0, 0, 0, 1,
    1, 0, 0, 0, 1,
    1, 0, 0, 0, 1,
    1, 1, 1, 1, 1,
];
#[rustfmt::skip]
const CONTOUR: [i32; 9] = [
    -1, -1, -1,
    -1,  8, -1,
    -1, -1, -1,
];
#[rustfmt::skip]
const DETAIL: [i32; 9] = [
     0, -1,  0,
    -1, 10, -1,
     0, -1,  0,
];
#[rustfmt::skip]
const EDGE_ENHANCE: [i32; 9] = [
    -1, -1, -1,
    -1, 10, -1,
    -1, -1, -1,
];
#[rustfmt::skip]
const EMBOSS: [i32; 9] = [
    -1, 0, 0,
     0, 1, 0,
     0, 0, 0,
];
#[rustfmt::skip]
const SHARPEN: [i32; 9] = [
    -2, -2, -2,
    -2, 32, -2,
    -2, -2, -2,
];
#[rustfmt::skip]
const SMOOTH: [i32; 9] = [
    1, 1, 1,
    1, 5, 1,
    1, 1, 1,
];

impl FilterKind {
    /// Catalog order, as shown on the form
    pub const ALL: [Self; 7] = [
        Self::Blur,
        Self::Contour,
        Self::Detail,
        Self::EdgeEnhance,
        Self::Emboss,
        Self::Sharpen,
        Self::Smooth,
    ];

    /// Form value / display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Contour => "contour",
            Self::Detail => "detail",
            Self::EdgeEnhance => "edge enhance",
            Self::Emboss => "emboss",
            Self::Sharpen => "sharpen",
            Self::Smooth => "smooth",
        }
    }

    pub const fn kernel(self) -> Kernel {
        match self {
            Self::Blur => Kernel { size: 5, weights: &BLUR, scale: 16, offset: 0 },
            Self::Contour => Kernel { size: 3, weights: &CONTOUR, scale: 1, offset: 255 },
            Self::Detail => Kernel { size: 3, weights: &DETAIL, scale: 6, offset: 0 },
            Self::EdgeEnhance => Kernel { size: 3, weights: &EDGE_ENHANCE, scale: 2, offset: 0 },
            Self::Emboss => Kernel { size: 3, weights: &EMBOSS, scale: 1, offset: 128 },
            Self::Sharpen => Kernel { size: 3, weights: &SHARPEN, scale: 16, offset: 0 },
            Self::Smooth => Kernel { size: 3, weights: &SMOOTH, scale: 13, offset: 0 },
        }
    }

    /// Apply this filter, keeping the image's alpha channel if it has one
    pub fn apply(self, img: &DynamicImage) -> DynamicImage {
        let kernel = self.kernel();
        if img.color().has_alpha() {
            DynamicImage::ImageRgba8(convolve(&img.to_rgba8(), &kernel))
        } else {
            DynamicImage::ImageRgb8(convolve(&img.to_rgb8(), &kernel))
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ValidationError::UnknownFilter(s.to_string()))
    }
}

/// Convolve every color channel of an 8-bit image with `kernel`
pub fn convolve<P>(src: &ImageBuffer<P, Vec<u8>>, kernel: &Kernel) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = src.dimensions();
    let mut out = src.clone();
    if width == 0 || height == 0 {
        return out;
    }

    let channels = usize::from(P::CHANNEL_COUNT);
    // Alpha is always the last channel for the formats we convolve
    let color_channels = if channels == 2 || channels == 4 {
        channels - 1
    } else {
        channels
    };

    #[allow(clippy::cast_possible_wrap)]
    let (w, h) = (width as i64, height as i64);
    #[allow(clippy::cast_possible_wrap)]
    let radius = (kernel.size / 2) as i64;
    let raw = src.as_raw();
    let dst: &mut [u8] = &mut out;
    let scale = f64::from(kernel.scale);
    let offset = f64::from(kernel.offset);

    for y in 0..h {
        for x in 0..w {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let base = ((y * w + x) as usize) * channels;
            for c in 0..color_channels {
                let mut acc: i64 = 0;
                for (i, weight) in kernel.weights.iter().enumerate() {
                    if *weight == 0 {
                        continue;
                    }
                    #[allow(clippy::cast_possible_wrap)]
                    let (kx, ky) = ((i % kernel.size) as i64, (i / kernel.size) as i64);
                    let sx = (x + kx - radius).clamp(0, w - 1);
                    let sy = (y + ky - radius).clamp(0, h - 1);
                    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                    let idx = ((sy * w + sx) as usize) * channels + c;
                    acc += i64::from(*weight) * i64::from(raw[idx]);
                }
                #[allow(clippy::cast_precision_loss)]
                let value = (acc as f64 / scale + offset).round().clamp(0.0, 255.0);
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                {
                    dst[base + c] = value as u8;
                }
            }
        }
    }

    out
}
