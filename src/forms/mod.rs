//! Form parsing and validation
//!
//! Every handler turns its raw query/body fields into one of the typed
//! requests in [`requests`] before doing any work. Failures are reported
//! as a [`ValidationError`], which the pages render next to the form.

mod fields;
mod multipart;
pub mod requests;

pub use fields::FormFields;
pub use multipart::{parse_form_body, FormBody, FormError};
pub use requests::{AnimalFactsRequest, ComplimentsRequest, GifSearchRequest, ImageFilterRequest};

#[cfg(test)]
pub(crate) use multipart::tests as multipart_fixtures;

use crate::catalog::compliments::MAX_COMPLIMENTS;

/// User input rejected before any handler logic runs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Search query cannot be empty.")]
    EmptyQuery,

    #[error("Invalid number of GIFs.")]
    InvalidQuantity,

    #[error("Number of compliments must be between 1 and {max}.", max = MAX_COMPLIMENTS)]
    InvalidCount,

    #[error("Unknown filter type {0:?}.")]
    UnknownFilter(String),

    #[error("Please choose an image to upload.")]
    MissingImage,
}
