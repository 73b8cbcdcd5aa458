use http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue};

const ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOW_HEADERS: &str = "content-type,authorization,accept";
const MAX_AGE_SECS: &str = "3600";

/// Response headers shared by every route, including failures.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    secure_origin: HeaderValue,
    website_origin: HeaderValue,
}

impl CorsPolicy {
    pub fn new(secure_origin: &str, website_origin: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            secure_origin: HeaderValue::from_str(secure_origin)?,
            website_origin: HeaderValue::from_str(website_origin)?,
        })
    }

    /// The secure origin is echoed only on an exact match; anything else gets the website origin.
    pub fn allow_origin(&self, requested: Option<&HeaderValue>) -> &HeaderValue {
        match requested {
            Some(origin) if *origin == self.secure_origin => &self.secure_origin,
            _ => &self.website_origin,
        }
    }

    pub fn headers(&self, requested: Option<&HeaderValue>) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin(requested).clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
        headers
    }
}
