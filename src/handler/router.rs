//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body collection with the size
//! limit, route matching, method validation and access logging.

use crate::config::{AppState, Config};
use crate::handler::{pages, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::views;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const ALLOW_READ: &str = "GET, HEAD, OPTIONS";
const ALLOW_FORM: &str = "GET, HEAD, POST, OPTIONS";

/// Every path the server answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Health,
    Home,
    Compliments,
    ComplimentsResults,
    AnimalFacts,
    ImageFilter,
    GifSearch,
    Image(&'a str),
}

impl<'a> Route<'a> {
    fn resolve(path: &'a str, config: &Config) -> Option<Self> {
        if config.health.enabled && path == config.health.liveness_path {
            return Some(Self::Health);
        }

        let route = match path {
            "/" => Self::Home,
            "/compliments" => Self::Compliments,
            "/compliments_results" => Self::ComplimentsResults,
            "/animal_facts" => Self::AnimalFacts,
            "/image_filter" => Self::ImageFilter,
            "/gif_search" => Self::GifSearch,
            _ => {
                let prefix = config.storage.url_prefix.trim_end_matches('/');
                let raw = path.strip_prefix(prefix)?.strip_prefix('/')?;
                Self::Image(raw)
            }
        };
        Some(route)
    }

    const fn allow(self) -> &'static str {
        match self {
            Self::ImageFilter | Self::GifSearch => ALLOW_FORM,
            _ => ALLOW_READ,
        }
    }

    fn accepts(self, method: &Method) -> bool {
        match *method {
            Method::GET | Method::HEAD => true,
            Method::POST => matches!(self, Self::ImageFilter | Self::GifSearch),
            _ => false,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| access_entry(&req, peer_addr));

    let (parts, body) = req.into_parts();
    let mut response = match collect_body(&parts, body, state.config.http.max_body_size).await {
        Ok(bytes) => {
            if let Some(entry) = entry.as_mut() {
                entry.request_bytes = bytes.len();
            }
            dispatch(Request::from_parts(parts, bytes), &state).await
        }
        Err(resp) => resp,
    };

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request whose body has already been collected
pub async fn dispatch(req: Request<Bytes>, state: &AppState) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();
    let Some(route) = Route::resolve(&path, &state.config) else {
        return http::build_404_response();
    };

    let method = req.method().clone();
    if method == Method::OPTIONS {
        return http::build_options_response(route.allow(), state.config.http.enable_cors);
    }
    if !route.accepts(&method) {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return http::build_405_response(route.allow());
    }

    let is_head = method == Method::HEAD;
    let is_post = method == Method::POST;
    let page = |html: String| http::build_html_response(StatusCode::OK, html, is_head);

    match route {
        Route::Health => http::build_health_response("ok"),
        Route::Home => page(views::home()),
        Route::Compliments => page(views::compliments_form(None)),
        Route::ComplimentsResults => pages::compliments_results(&req, is_head),
        Route::AnimalFacts => pages::animal_facts(&req, is_head),
        Route::ImageFilter if is_post => pages::image_filter_submit(&req, state).await,
        Route::ImageFilter => page(views::image_filter(None, None)),
        Route::GifSearch if is_post => pages::gif_search_submit(&req, state).await,
        Route::GifSearch => page(views::gif_search(&views::GifSearchView::default())),
        Route::Image(raw) => static_files::serve_image(&req, raw, state, is_head).await,
    }
}

/// Collect the request body, enforcing `max_body_size`
///
/// A declared `Content-Length` over the limit is rejected before reading.
async fn collect_body<B>(
    parts: &hyper::http::request::Parts,
    body: B,
    max_body_size: u64,
) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(size) = declared_length(parts) {
        if size > max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            return Err(http::build_413_response());
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response())
        }
    }
}

fn declared_length(parts: &hyper::http::request::Parts) -> Option<u64> {
    let value = parts.headers.get(CONTENT_LENGTH)?;
    let parsed = value.to_str().ok().and_then(|s| s.trim().parse::<u64>().ok());
    if parsed.is_none() {
        logger::log_warning(&format!(
            "Invalid Content-Length value: {value:?}, skipping size check"
        ));
    }
    parsed
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::multipart_fixtures::{multipart_body, multipart_content_type};
    use crate::imaging::pipeline::tests::sample_png;
    use crate::store::FsImageStore;
    use hyper::header::{ALLOW, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let mut config = Config::defaults().unwrap();
        config.storage.images_dir = dir.path().display().to_string();
        let store = FsImageStore::open(dir.path()).unwrap();
        AppState::with_store(config, Arc::new(store))
    }

    fn get(uri: &str) -> Request<Bytes> {
        Request::builder().uri(uri).body(Bytes::new()).unwrap()
    }

    fn post(uri: &str, content_type: &str, body: Vec<u8>) -> Request<Bytes> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(Bytes::from(body))
            .unwrap()
    }

    async fn text(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn upload(filter: &str, file_name: &str, bytes: &[u8]) -> Request<Bytes> {
        post(
            "/image_filter",
            &multipart_content_type(),
            multipart_body(&[("filter_type", filter)], &[("users_image", file_name, bytes)]),
        )
    }

    fn image_url(page: &str) -> String {
        let start = page.find("<img src=\"").unwrap() + "<img src=\"".len();
        let end = start + page[start..].find('"').unwrap();
        page[start..end].to_string()
    }

    #[tokio::test]
    async fn test_pages_render() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        for uri in ["/", "/compliments", "/animal_facts", "/image_filter", "/gif_search"] {
            let resp = dispatch(get(uri), &state).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let resp = dispatch(get("/nope"), &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = dispatch(post("/compliments", "text/plain", Vec::new()), &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], ALLOW_READ);

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri("/gif_search")
            .body(Bytes::new())
            .unwrap();
        let resp = dispatch(delete, &state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], ALLOW_FORM);
    }

    #[tokio::test]
    async fn test_options_and_health() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/image_filter")
            .body(Bytes::new())
            .unwrap();
        let resp = dispatch(options, &state).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[ALLOW], ALLOW_FORM);

        let resp = dispatch(get("/healthz"), &state).await;
        assert_eq!(text(resp).await, "ok");
    }

    #[tokio::test]
    async fn test_compliments_results() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let resp = dispatch(
            get("/compliments_results?users_name=Ada&wants_compliments=on&num_compliments=4"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = text(resp).await;
        assert!(page.contains("Hello, Ada!"));
        assert_eq!(page.matches("<li>").count(), 4);

        let resp = dispatch(
            get("/compliments_results?wants_compliments=on&num_compliments=24"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(text(resp).await.contains("Number of compliments must be between 1 and 23."));
    }

    #[tokio::test]
    async fn test_user_input_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let resp = dispatch(
            get("/compliments_results?users_name=%3Cscript%3Ealert(1)%3C%2Fscript%3E"),
            &state,
        )
        .await;
        let page = text(resp).await;
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));

        let resp = dispatch(get("/animal_facts?animal=%3Cb%3E"), &state).await;
        assert!(text(resp).await.contains("No fact known about &lt;b&gt;."));
    }

    #[tokio::test]
    async fn test_animal_fact_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let resp = dispatch(get("/animal_facts?animal=mantis+shrimp"), &state).await;
        assert!(text(resp)
            .await
            .contains("The mantis shrimp has the world&#39;s fastest punch."));
    }

    #[tokio::test]
    async fn test_image_filter_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let png = sample_png(800, 400);

        let resp = dispatch(upload("emboss", "cat photo.png", &png), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let url = image_url(&text(resp).await);
        assert!(url.starts_with("/static/images/emboss-"));
        assert!(url.ends_with("-cat_photo.png"));

        let resp = dispatch(get(&url), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
        let etag = resp.headers()[ETAG].clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (500, 250));

        let revalidate = Request::builder()
            .uri(&url)
            .header(IF_NONE_MATCH, etag)
            .body(Bytes::new())
            .unwrap();
        let resp = dispatch(revalidate, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_uploaded_name_cannot_pick_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let resp = dispatch(upload("blur", "x.html", &sample_png(40, 40)), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let url = image_url(&text(resp).await);
        assert!(url.ends_with("-x.png"), "{url}");

        let resp = dispatch(get(&url), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_long_upload_name_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let name = format!("{}.png", "a".repeat(250));

        let resp = dispatch(upload("contour", &name, &sample_png(20, 20)), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let url = image_url(&text(resp).await);
        let resp = dispatch(get(&url), &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_image_filter_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let png = sample_png(10, 10);

        let resp = dispatch(upload("sepia", "cat.png", &png), &state).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(text(resp).await.contains("Unknown filter type &quot;sepia&quot;."));

        let resp = dispatch(upload("blur", "notes.png", b"not an image"), &state).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = dispatch(
            post(
                "/image_filter",
                &multipart_content_type(),
                multipart_body(&[("filter_type", "blur")], &[]),
            ),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(text(resp).await.contains("Please choose an image to upload."));

        let resp = dispatch(post("/image_filter", "multipart/form-data", Vec::new()), &state).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_artifact_route_rejects_bad_refs() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        for uri in [
            "/static/images/",
            "/static/images/missing.png",
            "/static/images/../Cargo.toml",
            "/static/images/.hidden",
            "/static/images/a/b.png",
        ] {
            let resp = dispatch(get(uri), &state).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_gif_search_validation_skips_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut state = test_state(&dir);
        state.config.gif_search.endpoint = server.uri();
        let state = AppState::with_store(state.config, state.store);

        let form = "application/x-www-form-urlencoded";
        let resp = dispatch(post("/gif_search", form, b"search_query=++".to_vec()), &state).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(text(resp).await.contains("Search query cannot be empty."));

        let resp = dispatch(
            post("/gif_search", form, b"search_query=cats&quantity=11".to_vec()),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(text(resp).await.contains("Invalid number of GIFs."));
    }

    #[tokio::test]
    async fn test_gif_search_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "cats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "id": "7",
                    "content_description": "cat",
                    "itemurl": "https://tenor.example/view/7",
                    "media_formats": { "gif": { "url": "https://media.example/7.gif" } }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "nothing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::defaults().unwrap();
        config.gif_search.endpoint = server.uri();
        let store = FsImageStore::open(dir.path()).unwrap();
        let state = AppState::with_store(config, Arc::new(store));
        let form = "application/x-www-form-urlencoded";

        let resp = dispatch(
            post("/gif_search", form, b"search_query=cats&quantity=2".to_vec()),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.contains("https://media.example/7.gif"));

        let resp = dispatch(
            post("/gif_search", form, b"search_query=nothing".to_vec()),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(text(resp).await.contains("No GIFs found for your search query."));

        let resp = dispatch(
            post("/gif_search", form, b"search_query=broken".to_vec()),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(text(resp).await.contains("Failed to fetch GIFs:"));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let parts = |len: Option<&str>| {
            let mut builder = Request::builder().method(Method::POST).uri("/gif_search");
            if let Some(len) = len {
                builder = builder.header(CONTENT_LENGTH, len);
            }
            builder.body(()).unwrap().into_parts().0
        };

        let declared = collect_body(&parts(Some("100")), Full::new(Bytes::new()), 10).await;
        assert_eq!(declared.unwrap_err().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let streamed = collect_body(&parts(None), Full::new(Bytes::from(vec![0u8; 64])), 10).await;
        assert_eq!(streamed.unwrap_err().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let ok = collect_body(&parts(Some("3")), Full::new(Bytes::from_static(b"a=1")), 10).await;
        assert_eq!(&ok.unwrap()[..], b"a=1");
    }

    #[test]
    fn test_route_resolution() {
        let config = Config::defaults().unwrap();
        assert_eq!(Route::resolve("/", &config), Some(Route::Home));
        assert_eq!(Route::resolve("/healthz", &config), Some(Route::Health));
        assert_eq!(
            Route::resolve("/static/images/x.png", &config),
            Some(Route::Image("x.png"))
        );
        assert_eq!(Route::resolve("/static/imagesx.png", &config), None);
        assert_eq!(Route::resolve("/static", &config), None);

        let mut no_health = config;
        no_health.health.enabled = false;
        assert_eq!(Route::resolve("/healthz", &no_health), None);
    }
}
