//! Feature page handlers
//!
//! Each handler parses its typed request first; validation failures are
//! rendered back on the originating form with 400.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};

use crate::catalog::{animal_facts, compliments};
use crate::config::AppState;
use crate::forms::{
    parse_form_body, AnimalFactsRequest, ComplimentsRequest, FormBody, FormError, FormFields,
    GifSearchRequest, ImageFilterRequest,
};
use crate::gif_search::SearchOutcome;
use crate::http::build_html_response;
use crate::imaging::{filter_upload, FilterError};
use crate::logger;
use crate::views::{self, GifSearchView};

const NO_GIFS: &str = "No GIFs found for your search query.";
const BAD_FORM: &str = "The submitted form could not be read.";
const FILTER_FAILED: &str = "Something went wrong while filtering your image.";

pub fn compliments_results(req: &Request<Bytes>, is_head: bool) -> Response<Full<Bytes>> {
    let fields = FormFields::from_query(req.uri().query());
    match ComplimentsRequest::from_fields(&fields) {
        Ok(request) => {
            let drawn = if request.wants_compliments {
                compliments::draw(&mut rand::thread_rng(), request.count)
            } else {
                Vec::new()
            };
            let page = views::compliments_results(
                request.users_name.as_deref(),
                request.wants_compliments,
                &drawn,
            );
            build_html_response(StatusCode::OK, page, is_head)
        }
        Err(e) => {
            logger::log_info(&format!("Rejected compliments request: {e}"));
            build_html_response(
                StatusCode::BAD_REQUEST,
                views::compliments_form(Some(&e.to_string())),
                is_head,
            )
        }
    }
}

pub fn animal_facts(req: &Request<Bytes>, is_head: bool) -> Response<Full<Bytes>> {
    let request = AnimalFactsRequest::from_fields(&FormFields::from_query(req.uri().query()));
    let fact = request.animal.as_deref().and_then(animal_facts::fact_for);
    let page = views::animal_facts(request.animal.as_deref(), fact);
    build_html_response(StatusCode::OK, page, is_head)
}

pub async fn image_filter_submit(req: &Request<Bytes>, state: &AppState) -> Response<Full<Bytes>> {
    let reject = |status: StatusCode, message: &str| {
        build_html_response(status, views::image_filter(None, Some(message)), false)
    };

    let form = match read_form(req).await {
        Ok(form) => form,
        Err(e) => {
            logger::log_warning(&format!("Unreadable image upload form: {e}"));
            return reject(StatusCode::BAD_REQUEST, BAD_FORM);
        }
    };
    let request = match ImageFilterRequest::from_form(&form) {
        Ok(request) => request,
        Err(e) => {
            logger::log_info(&format!("Rejected image filter request: {e}"));
            return reject(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let store = Arc::clone(&state.store);
    let max_dimension = state.config.storage.max_dimension;
    let result = tokio::task::spawn_blocking(move || {
        filter_upload(
            store.as_ref(),
            request.filter,
            &request.file_name,
            &request.bytes,
            max_dimension,
        )
    })
    .await
    .unwrap_or_else(|e| Err(FilterError::Task(e.to_string())));

    match result {
        Ok(filtered) => {
            logger::log_info(&format!(
                "Applied {} filter: {} ({}x{})",
                filtered.filter, filtered.reference, filtered.width, filtered.height
            ));
            let url = format!(
                "{}/{}",
                state.config.storage.url_prefix.trim_end_matches('/'),
                filtered.reference
            );
            build_html_response(StatusCode::OK, views::image_filter(Some(&url), None), false)
        }
        Err(e) if e.is_client_error() => {
            logger::log_info(&format!("Rejected image upload: {e}"));
            reject(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            logger::log_error(&format!("Image filter failed: {e}"));
            reject(StatusCode::INTERNAL_SERVER_ERROR, FILTER_FAILED)
        }
    }
}

pub async fn gif_search_submit(req: &Request<Bytes>, state: &AppState) -> Response<Full<Bytes>> {
    let render = |status: StatusCode, view: &GifSearchView<'_>| {
        build_html_response(status, views::gif_search(view), false)
    };

    let form = match read_form(req).await {
        Ok(form) => form,
        Err(e) => {
            logger::log_warning(&format!("Unreadable GIF search form: {e}"));
            return render(
                StatusCode::BAD_REQUEST,
                &GifSearchView {
                    message: Some(BAD_FORM),
                    ..GifSearchView::default()
                },
            );
        }
    };
    let raw_query = form.fields.get("search_query").unwrap_or_default();

    let request = match GifSearchRequest::from_fields(&form.fields) {
        Ok(request) => request,
        Err(e) => {
            logger::log_info(&format!("Rejected GIF search: {e}"));
            let message = e.to_string();
            return render(
                StatusCode::BAD_REQUEST,
                &GifSearchView {
                    query: raw_query,
                    gifs: &[],
                    message: Some(&message),
                },
            );
        }
    };

    match state.gif_client.search(&request).await {
        Ok(SearchOutcome::Found(gifs)) => render(
            StatusCode::OK,
            &GifSearchView {
                query: &request.query,
                gifs: &gifs,
                message: None,
            },
        ),
        Ok(SearchOutcome::NoResults) => render(
            StatusCode::OK,
            &GifSearchView {
                query: &request.query,
                gifs: &[],
                message: Some(NO_GIFS),
            },
        ),
        Err(e) => {
            logger::log_error(&e.to_string());
            let message = e.to_string();
            render(
                StatusCode::BAD_GATEWAY,
                &GifSearchView {
                    query: &request.query,
                    gifs: &[],
                    message: Some(&message),
                },
            )
        }
    }
}

async fn read_form(req: &Request<Bytes>) -> Result<FormBody, FormError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    parse_form_body(content_type, req.body().clone()).await
}
