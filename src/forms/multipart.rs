//! Request body decoding for POSTed forms
//!
//! Accepts `application/x-www-form-urlencoded` and `multipart/form-data`.
//! The body has already been collected (and size-limited) by the router.

use std::convert::Infallible;

use hyper::body::Bytes;

use super::fields::FormFields;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("multipart body has no boundary")]
    MissingBoundary,

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("unsupported form content type: {0:?}")]
    UnsupportedContentType(String),
}

/// One uploaded file part
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Bytes,
}

/// Decoded form body: text fields plus any uploaded files
#[derive(Debug, Clone, Default)]
pub struct FormBody {
    pub fields: FormFields,
    pub files: Vec<UploadedFile>,
}

impl FormBody {
    /// First file uploaded under `field`
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }
}

/// Decode a form body according to its `Content-Type`
pub async fn parse_form_body(
    content_type: Option<&str>,
    body: Bytes,
) -> Result<FormBody, FormError> {
    let content_type = content_type.unwrap_or("application/x-www-form-urlencoded");
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/x-www-form-urlencoded" => Ok(FormBody {
            fields: FormFields::from_urlencoded(&body),
            files: Vec::new(),
        }),
        "multipart/form-data" => parse_multipart(content_type, body).await,
        _ => Err(FormError::UnsupportedContentType(content_type.to_string())),
    }
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Result<FormBody, FormError> {
    let boundary = multer::parse_boundary(content_type).map_err(|_| FormError::MissingBoundary)?;
    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = FormBody::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name().map(ToString::to_string) {
            let bytes = field.bytes().await?;
            form.files.push(UploadedFile {
                field: name,
                file_name,
                bytes,
            });
        } else {
            let value = field.text().await?;
            form.fields.push(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const BOUNDARY: &str = "XyZzYboundary";

    /// Build a multipart body from text fields and `(field, filename, bytes)` files
    pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    #[tokio::test]
    async fn test_multipart_fields_and_file() {
        let body = multipart_body(
            &[("filter_type", "edge enhance")],
            &[("users_image", "cat.png", b"\x89PNG\r\n\x00binary")],
        );
        let ct = multipart_content_type();
        let form = parse_form_body(Some(ct.as_str()), Bytes::from(body))
            .await
            .unwrap();

        assert_eq!(form.fields.get("filter_type"), Some("edge enhance"));
        let file = form.file("users_image").unwrap();
        assert_eq!(file.file_name, "cat.png");
        assert_eq!(&file.bytes[..], b"\x89PNG\r\n\x00binary");
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let form = parse_form_body(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            Bytes::from_static(b"search_query=funny+cats&quantity=3"),
        )
        .await
        .unwrap();
        assert_eq!(form.fields.get("search_query"), Some("funny cats"));
        assert_eq!(form.fields.get("quantity"), Some("3"));
        assert!(form.files.is_empty());
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults_to_urlencoded() {
        let form = parse_form_body(None, Bytes::from_static(b"a=1")).await.unwrap();
        assert_eq!(form.fields.get("a"), Some("1"));
    }

    #[tokio::test]
    async fn test_rejects_bad_bodies() {
        let err = parse_form_body(Some("multipart/form-data"), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::MissingBoundary));

        let err = parse_form_body(Some("application/json"), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::UnsupportedContentType(_)));

        let ct = multipart_content_type();
        let err = parse_form_body(
            Some(ct.as_str()),
            Bytes::from_static(b"--XyZzYboundary\r\ngarbage"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FormError::Multipart(_)));
    }
}
