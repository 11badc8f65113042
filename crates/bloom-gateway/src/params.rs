//! Request parameters.
//!
//! Values are collected from an urlencoded body (POST, PUT and PATCH only)
//! and then from the query string. A lookup returns the first value for its
//! key, so body values win over query values and repeated keys never fail a
//! request. Values are decoded to raw bytes: `+` is a space and `%XX` may
//! produce any byte, valid UTF-8 or not. Malformed escapes are kept verbatim.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, Method},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded request parameters, in precedence order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormValues {
    pairs: Vec<(Vec<u8>, Vec<u8>)>,
}

impl FormValues {
    /// Parse an urlencoded `a=1&b=2` string
    pub fn parse(input: &[u8]) -> Self {
        let mut values = Self::default();
        values.extend(input);
        values
    }

    /// First value for `key`; the empty slice when absent
    pub fn get(&self, key: &str) -> &[u8] {
        self.pairs
            .iter()
            .find(|(k, _)| k.as_slice() == key.as_bytes())
            .map(|(_, v)| v.as_slice())
            .unwrap_or_default()
    }

    fn extend(&mut self, input: &[u8]) {
        for field in input.split(|&b| b == b'&').filter(|f| !f.is_empty()) {
            let (key, value) = match field.iter().position(|&b| b == b'=') {
                Some(eq) => (&field[..eq], &field[eq + 1..]),
                None => (field, &field[field.len()..]),
            };
            self.pairs.push((decode(key), decode(value)));
        }
    }
}

fn decode(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

fn carries_form_body(req: &Request) -> bool {
    if !matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }

    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

#[async_trait]
impl<S> FromRequest<S> for FormValues
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(|q| q.as_bytes().to_vec());
        let mut values = Self::default();

        if carries_form_body(&req) {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            values.extend(&body);
        }
        if let Some(query) = query {
            values.extend(&query);
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    async fn extract(req: Request<Body>) -> FormValues {
        FormValues::from_request(req, &()).await.unwrap()
    }

    #[test]
    fn test_parse_decodes_to_raw_bytes() {
        let values = FormValues::parse(b"keyword=red+fox%2F%C3%BC&raw=%FF%FE");

        assert_eq!(values.get("keyword"), "red fox/ü".as_bytes());
        assert_eq!(values.get("raw"), b"\xff\xfe");
    }

    #[test]
    fn test_first_value_wins() {
        let values = FormValues::parse(b"id=zoo&id=animals.txt");
        assert_eq!(values.get("id"), b"zoo");
    }

    #[test]
    fn test_missing_and_bare_keys_are_empty() {
        let values = FormValues::parse(b"&id&keyword=&=x");

        assert_eq!(values.get("id"), b"");
        assert_eq!(values.get("keyword"), b"");
        assert_eq!(values.get("token"), b"");
    }

    #[test]
    fn test_malformed_escape_kept_verbatim() {
        let values = FormValues::parse(b"keyword=100%zz");
        assert_eq!(values.get("keyword"), b"100%zz");
    }

    #[tokio::test]
    async fn test_post_reads_query_without_body() {
        let req = Request::post("/bloom?id=zoo&keyword=cat")
            .body(Body::empty())
            .unwrap();

        let values = extract(req).await;
        assert_eq!(values.get("id"), b"zoo");
        assert_eq!(values.get("keyword"), b"cat");
    }

    #[tokio::test]
    async fn test_body_wins_over_query() {
        let req = Request::post("/bloom?keyword=fox&token=abc")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body(Body::from("id=animals.txt&keyword=cat"))
            .unwrap();

        let values = extract(req).await;
        assert_eq!(values.get("id"), b"animals.txt");
        assert_eq!(values.get("keyword"), b"cat");
        assert_eq!(values.get("token"), b"abc");
    }

    #[tokio::test]
    async fn test_non_form_body_ignored() {
        let req = Request::post("/bloom?id=zoo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("id=animals.txt"))
            .unwrap();

        assert_eq!(extract(req).await.get("id"), b"zoo");
    }

    #[tokio::test]
    async fn test_get_body_ignored() {
        let req = Request::get("/bloom?id=zoo")
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Body::from("id=animals.txt"))
            .unwrap();

        assert_eq!(extract(req).await.get("id"), b"zoo");
    }
}
