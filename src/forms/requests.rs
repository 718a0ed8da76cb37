//! Typed, validated requests for each feature page

use hyper::body::Bytes;

use super::{FormBody, FormFields, ValidationError};
use crate::catalog::compliments::MAX_COMPLIMENTS;
use crate::gif_search::{DEFAULT_GIFS, MAX_GIFS};
use crate::imaging::FilterKind;

/// `/compliments_results` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplimentsRequest {
    pub users_name: Option<String>,
    pub wants_compliments: bool,
    pub count: usize,
}

impl ComplimentsRequest {
    /// `num_compliments` defaults to 1 when missing or blank and must be
    /// within `1..=MAX_COMPLIMENTS`
    pub fn from_fields(fields: &FormFields) -> Result<Self, ValidationError> {
        let count = match fields.get("num_compliments").map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ValidationError::InvalidCount)?,
        };
        if !(1..=MAX_COMPLIMENTS).contains(&count) {
            return Err(ValidationError::InvalidCount);
        }

        Ok(Self {
            users_name: fields.get("users_name").map(ToString::to_string),
            wants_compliments: fields.get("wants_compliments").is_some_and(|v| !v.is_empty()),
            count,
        })
    }
}

/// `/animal_facts` query; an unknown animal is not an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalFactsRequest {
    pub animal: Option<String>,
}

impl AnimalFactsRequest {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            animal: fields.get("animal").map(ToString::to_string),
        }
    }
}

/// `/image_filter` upload
#[derive(Debug, Clone)]
pub struct ImageFilterRequest {
    pub filter: FilterKind,
    pub file_name: String,
    pub bytes: Bytes,
}

impl ImageFilterRequest {
    pub fn from_form(form: &FormBody) -> Result<Self, ValidationError> {
        let filter = form.fields.get("filter_type").unwrap_or_default().parse()?;
        let file = form
            .file("users_image")
            .filter(|f| !f.bytes.is_empty())
            .ok_or(ValidationError::MissingImage)?;

        Ok(Self {
            filter,
            file_name: file.file_name.clone(),
            bytes: file.bytes.clone(),
        })
    }
}

/// `/gif_search` submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifSearchRequest {
    pub query: String,
    pub quantity: usize,
}

impl GifSearchRequest {
    /// Query is trimmed and must be non-empty; `quantity` defaults to
    /// `DEFAULT_GIFS` and must be within `1..=MAX_GIFS`
    pub fn from_fields(fields: &FormFields) -> Result<Self, ValidationError> {
        let query = fields.get("search_query").unwrap_or_default().trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let quantity = match fields.get("quantity") {
            None => DEFAULT_GIFS,
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ValidationError::InvalidQuantity)?,
        };
        if !(1..=MAX_GIFS).contains(&quantity) {
            return Err(ValidationError::InvalidQuantity);
        }

        Ok(Self {
            query: query.to_string(),
            quantity,
        })
    }
}
