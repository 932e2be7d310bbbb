//! Blocking HTTP handle for a Supabase project.
//!
//! One `SupabaseClient` is built in `main` and cloned into the storage and
//! table adapters. Clones share the underlying connection pool.
//!
//! Endpoints used:
//! - `POST {url}/storage/v1/object/{bucket}/{key}`: object upload.
//! - `POST {url}/rest/v1/{table}`: PostgREST row insert.

use crate::config::Secret;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body quoted back in an error message.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("invalid client setup: {0}")]
    Setup(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    headers: HeaderMap,
    client: Client,
}

impl SupabaseClient {
    /// Builds the client. `request_timeout` bounds every call end to end.
    pub fn new(
        base_url: &str,
        api_key: &Secret,
        request_timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|err| SupabaseError::Setup(err.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: auth_headers(api_key)?,
            client,
        })
    }

    /// Uploads `bytes` to `bucket/key`. An existing object is not overwritten.
    pub fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key);
        let request = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        send(request)
    }

    /// Inserts one row into `table`. Conflicts are reported as errors by PostgREST.
    pub fn insert_row<T: Serialize>(&self, table: &str, row: &T) -> Result<(), SupabaseError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let request = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .header("Prefer", "return=minimal")
            .json(row);
        send(request)
    }
}

fn auth_headers(api_key: &Secret) -> Result<HeaderMap, SupabaseError> {
    let invalid = |_: InvalidHeaderValue| {
        SupabaseError::Setup("SUPABASE_KEY is not a valid header value".to_string())
    };
    let mut key = HeaderValue::from_str(api_key.expose()).map_err(invalid)?;
    key.set_sensitive(true);
    let mut bearer =
        HeaderValue::from_str(&format!("Bearer {}", api_key.expose())).map_err(invalid)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", key);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

fn send(request: RequestBuilder) -> Result<(), SupabaseError> {
    let response = request
        .send()
        .map_err(|err| SupabaseError::Transport(err.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let mut body = response.text().unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(SupabaseError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// One HTTP request as seen by `serve_once`. Header names are lowercased.
    #[derive(Debug)]
    pub(crate) struct CapturedRequest {
        pub request_line: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl CapturedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Accepts a single connection on a loopback port, records the request and
    /// answers with `status` and `body`. Returns the base URL and a handle that
    /// yields the captured request.
    pub(crate) fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_string();
        let join = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
                }
            }
            let length = headers
                .iter()
                .find(|(name, _)| name == "content-length")
                .map(|(_, value)| value.parse::<usize>().unwrap())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();

            write!(
                stream,
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();

            CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: request_body,
            }
        });
        (base_url, join)
    }

    pub(crate) fn secret(value: &str) -> Secret {
        Secret::new(value.to_string()).unwrap()
    }

    pub(crate) fn client(base_url: &str) -> SupabaseClient {
        SupabaseClient::new(base_url, &secret("service-key"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn upload_posts_bytes_to_bucket_path() {
        let (url, server) = serve_once(200, r#"{"Key":"qr-codes2/qr_abc.png"}"#);

        client(&url)
            .upload_object("qr-codes2", "qr_abc.png", vec![0x89, b'P', b'N', b'G'], "image/png")
            .unwrap();

        let request = server.join().unwrap();
        assert_eq!(
            request.request_line,
            "POST /storage/v1/object/qr-codes2/qr_abc.png HTTP/1.1"
        );
        assert_eq!(request.header("content-type"), Some("image/png"));
        assert_eq!(request.header("apikey"), Some("service-key"));
        assert_eq!(request.header("authorization"), Some("Bearer service-key"));
        assert_eq!(request.body, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn insert_posts_json_and_asks_for_minimal_return() {
        let (url, server) = serve_once(201, "");

        client(&url)
            .insert_row("qr_codes", &serde_json::json!({"id": "abc", "campaign_id": 0}))
            .unwrap();

        let request = server.join().unwrap();
        assert_eq!(request.request_line, "POST /rest/v1/qr_codes HTTP/1.1");
        assert_eq!(request.header("prefer"), Some("return=minimal"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("apikey"), Some("service-key"));
        assert_eq!(request.header("authorization"), Some("Bearer service-key"));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({"id": "abc", "campaign_id": 0}));
    }

    #[test]
    fn error_status_keeps_body_cut_on_char_boundary() {
        // 'é' is two bytes and straddles the cut-off.
        let long_body = format!("{}é{}", "a".repeat(MAX_ERROR_BODY - 1), "b".repeat(100));
        let (url, server) = serve_once(409, &long_body);

        let err = client(&url)
            .upload_object("qr-codes2", "qr_abc.png", vec![1], "image/png")
            .unwrap_err();
        server.join().unwrap();

        match err {
            SupabaseError::Status { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "a".repeat(MAX_ERROR_BODY - 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_error_body_is_kept_whole() {
        let (url, server) = serve_once(400, r#"{"message":"bad row"}"#);

        let err = client(&url)
            .insert_row("qr_codes", &serde_json::json!({}))
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err,
            SupabaseError::Status { status: 400, ref body } if body == r#"{"message":"bad row"}"#
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = SupabaseClient::new(
            "https://project.supabase.co/",
            &secret("key"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://project.supabase.co");
    }

    #[test]
    fn auth_headers_carry_key_twice() {
        let headers = auth_headers(&secret("abc")).unwrap();
        assert_eq!(headers["apikey"], "abc");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn key_with_newline_is_rejected() {
        assert!(matches!(
            auth_headers(&secret("bad\nkey")),
            Err(SupabaseError::Setup(_))
        ));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let client = SupabaseClient::new(
            "http://127.0.0.1:9",
            &secret("key"),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client
            .upload_object("bucket", "qr_x.png", vec![1, 2, 3], "image/png")
            .unwrap_err();
        assert!(matches!(err, SupabaseError::Transport(_)));
    }
}
