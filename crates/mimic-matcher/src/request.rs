//! The real-traffic side of matching: an already-decoded incoming request.

use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, COOKIE, HOST};
use std::borrow::Cow;

/// Ordered name/value pairs where names may repeat.
///
/// Used for headers, cookies, query-string parameters and form bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multimap {
    entries: Vec<(String, String)>,
}

impl Multimap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// All values stored under `name` (exact, case-sensitive name comparison).
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Multimap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Multimap {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// An incoming HTTP request as seen by the matcher.
///
/// Every field is concrete; the matcher only reads it.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub method: String,
    pub path: String,
    pub url: String,
    pub query: Multimap,
    pub headers: Multimap,
    pub cookies: Multimap,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        IncomingRequest {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name, value);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build from a hyper request whose body has already been collected.
    ///
    /// The query string comes from the URI, cookies from every `Cookie`
    /// header, and the URL from the absolute URI or, for origin-form
    /// requests, from the `Host` header.
    pub fn from_http<B>(request: &hyper::Request<B>, body: Bytes) -> Self {
        let uri = request.uri();

        let mut headers = Multimap::new();
        let mut cookies = Multimap::new();
        for (name, value) in request.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            if *name == COOKIE {
                for (n, v) in parse_cookie_header(&value).iter() {
                    cookies.insert(n, v);
                }
            }
            headers.insert(name.as_str(), value);
        }

        let url = if uri.scheme().is_some() {
            uri.to_string()
        } else {
            let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
            match request.headers().get(HOST).and_then(|h| h.to_str().ok()) {
                Some(host) => format!("http://{host}{path_and_query}"),
                None => path_and_query.to_string(),
            }
        };

        IncomingRequest {
            method: request.method().as_str().to_string(),
            path: uri.path().to_string(),
            url,
            query: parse_query_string(uri.query()),
            headers,
            cookies,
            body,
        }
    }

    /// First `Content-Type` header value, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
            .map(|(_, value)| value)
    }

    /// Body decoded as text using the `charset` declared on `Content-Type`.
    ///
    /// ISO-8859-1 bodies map each byte to the code point of the same value;
    /// everything else is decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> Cow<'_, str> {
        match self.content_type().and_then(charset) {
            Some(cs) if is_latin1(&cs) => Cow::Owned(self.body.iter().map(|&b| b as char).collect()),
            _ => String::from_utf8_lossy(&self.body),
        }
    }
}

fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_ascii_lowercase())
        } else {
            None
        }
    })
}

fn is_latin1(charset: &str) -> bool {
    matches!(charset, "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1")
}

/// Parse a query string (or form body) into a multimap, URL-decoding names and values.
///
/// `+` decodes to a space. Pairs without `=` get an empty value; undecodable
/// percent escapes are kept verbatim.
pub fn parse_query_string(query: Option<&str>) -> Multimap {
    let mut params = Multimap::new();
    if let Some(q) = query {
        for pair in q.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_component(name), decode_component(value));
        }
    }
    params
}

/// Parse an `application/x-www-form-urlencoded` body.
pub fn parse_form_body(body: &str) -> Multimap {
    parse_query_string(Some(body.trim()))
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Parse a `Cookie` header value (`a=1; b="two"`) into a multimap.
pub fn parse_cookie_header(header: &str) -> Multimap {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}
