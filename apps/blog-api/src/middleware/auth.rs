//! Authorization header extractor.
//!
//! Handlers do not authenticate on their own. They hand the raw header to
//! the access pipeline, which decides whether its absence is an error.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};

/// Raw `Authorization` header value, if the request carried one.
///
/// Non-UTF-8 bytes are replaced rather than rejected here so the pipeline
/// reports them as a malformed header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorization(pub Option<String>);

impl Authorization {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for Authorization {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let value = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        ready(Ok(Authorization(value)))
    }
}
