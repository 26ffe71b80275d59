//! Blocking JSON transport shared by the HTTP backends

use super::traits::{EmbeddingError, EmbeddingResult};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// OpenAI-style error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Build a blocking client with a request timeout and optional bearer token
pub(super) fn build_client(timeout_secs: u64, bearer: Option<&str>) -> EmbeddingResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(key) = bearer {
        let value = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|e| EmbeddingError::Config(format!("Invalid API key format: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| EmbeddingError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// POST a JSON body and return the response text of a successful reply.
///
/// The request runs on a scoped thread: `reqwest::blocking` panics when driven
/// from inside a tokio runtime. Request and response both live only inside
/// that thread.
pub(super) fn post_json(client: &Client, url: &str, body: &[u8]) -> EmbeddingResult<String> {
    std::thread::scope(|s| {
        s.spawn(|| send(client, url, body))
            .join()
            .map_err(|_| EmbeddingError::Internal("HTTP request thread panicked".to_string()))?
    })
}

fn send(client: &Client, url: &str, body: &[u8]) -> EmbeddingResult<String> {
    let response = client.post(url).body(body.to_vec()).send()?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_ms = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        return Err(EmbeddingError::RateLimited { retry_after_ms });
    }

    let text = response.text()?;
    if !status.is_success() {
        let body = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        return Err(EmbeddingError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(text)
}

/// Minimal HTTP/1.1 server replaying canned responses, one per connection
#[cfg(test)]
pub(crate) mod test_server {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    pub(crate) struct Reply {
        pub status: u16,
        pub headers: Vec<(&'static str, String)>,
        pub body: String,
    }

    impl Reply {
        pub fn json(status: u16, body: impl Into<String>) -> Self {
            Self {
                status,
                headers: Vec::new(),
                body: body.into(),
            }
        }

        pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
            self.headers.push((name, value.into()));
            self
        }
    }

    pub(crate) struct TestServer {
        pub base_url: String,
        requests: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl TestServer {
        pub fn start(replies: Vec<Reply>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));
            let recorded = Arc::clone(&requests);

            std::thread::spawn(move || {
                for reply in replies {
                    let Ok((stream, _)) = listener.accept() else {
                        return;
                    };
                    let mut reader = BufReader::new(stream);

                    let mut request_line = String::new();
                    reader.read_line(&mut request_line).unwrap();
                    let path = request_line.split_whitespace().nth(1).unwrap_or("").to_string();

                    let mut content_length = 0;
                    loop {
                        let mut line = String::new();
                        reader.read_line(&mut line).unwrap();
                        if line.trim().is_empty() {
                            break;
                        }
                        if let Some((name, value)) = line.split_once(':') {
                            if name.eq_ignore_ascii_case("content-length") {
                                content_length = value.trim().parse().unwrap_or(0);
                            }
                        }
                    }
                    let mut body = vec![0; content_length];
                    reader.read_exact(&mut body).unwrap();
                    recorded
                        .lock()
                        .unwrap()
                        .push((path, String::from_utf8_lossy(&body).into_owned()));

                    let mut response = format!(
                        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    for (name, value) in &reply.headers {
                        response.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    response.push_str("\r\n");
                    response.push_str(&reply.body);

                    let mut stream = reader.into_inner();
                    stream.write_all(response.as_bytes()).unwrap();
                    stream.flush().unwrap();
                }
            });

            Self { base_url, requests }
        }

        /// `(path, body)` of every request served so far
        pub fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::{Reply, TestServer};
    use super::*;

    #[test]
    fn test_post_json_success() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"ok":true}"#)]);
        let client = build_client(5, None).unwrap();

        let text = post_json(&client, &format!("{}/x", server.base_url), br#"{"a":1}"#).unwrap();
        assert_eq!(text, r#"{"ok":true}"#);
        assert_eq!(server.requests(), vec![("/x".to_string(), r#"{"a":1}"#.to_string())]);
    }

    #[test]
    fn test_post_json_api_error_message() {
        let server = TestServer::start(vec![Reply::json(
            400,
            r#"{"error":{"message":"bad model","type":"invalid_request_error"}}"#,
        )]);
        let client = build_client(5, None).unwrap();

        match post_json(&client, &server.base_url, b"{}").unwrap_err() {
            EmbeddingError::HttpStatus { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad model");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_post_json_rate_limited() {
        let server = TestServer::start(vec![Reply::json(429, "{}").with_header("Retry-After", "3")]);
        let client = build_client(5, None).unwrap();

        let err = post_json(&client, &server.base_url, b"{}").unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_ms: Some(3000)
            }
        ));
    }

    #[test]
    fn test_connection_refused_is_transient() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = build_client(5, None).unwrap();

        let err = post_json(&client, &format!("http://{}", addr), b"{}").unwrap_err();
        assert!(matches!(err, EmbeddingError::Network(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let err = build_client(5, Some("bad\nkey")).unwrap_err();
        assert!(matches!(err, EmbeddingError::Config(_)));
    }
}
