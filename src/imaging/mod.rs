//! Image filter feature
//!
//! `filters` holds the fixed catalog of convolution filters, `pipeline`
//! turns one upload into a stored, filtered artifact.

pub mod filters;
pub mod pipeline;

pub use filters::FilterKind;
pub use pipeline::{filter_upload, FilterError};
