//! HTTP requests and responses as plain data.
//!
//! # Design
//! These types describe HTTP traffic without performing any I/O. The client
//! builds `HttpRequest` values and parses `HttpResponse` values; the
//! `transport` module performs the actual round-trip in between. Keeping
//! the boundary explicit makes every build and parse step testable without
//! a server.
//!
//! All fields use owned types (`String`, `Vec`) so values can move freely
//! across thread boundaries.

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `RestClient::build_*` methods. Headers always include the
/// credential pair; bodied requests also carry a JSON content type.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the executor after the round-trip, then passed to
/// `RestClient::parse_*` methods. The reason phrase and headers are kept
/// because failures carry the phrase and successful creates carry the new
/// resource URL in `Location`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a response header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            reason: String::new(),
            headers: vec![("Location".to_string(), "https://host/base/Example/42".to_string())],
            body: String::new(),
        }
    }

    #[test]
    fn success_covers_the_2xx_range() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(response(299).is_success());
        assert!(!response(199).is_success());
        assert!(!response(300).is_success());
        assert!(!response(404).is_success());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resp = response(201);
        assert_eq!(resp.header("Location"), Some("https://host/base/Example/42"));
        assert_eq!(resp.header("location"), Some("https://host/base/Example/42"));
        assert_eq!(resp.header("LOCATION"), Some("https://host/base/Example/42"));
        assert_eq!(resp.header("X-Missing"), None);
    }
}
