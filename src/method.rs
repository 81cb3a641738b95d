//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 standard methods. Anything else hyper hands us
//! (WebDAV verbs, extension methods) has no route and falls through to the
//! router's fallback handler.

use std::str::FromStr;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(()),
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = ();

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_http_method() {
        assert_eq!(Method::try_from(&http::Method::PATCH), Ok(Method::Patch));
        assert_eq!(Method::try_from(&http::Method::DELETE), Ok(Method::Delete));
    }

    #[test]
    fn rejects_extension_methods() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(Method::try_from(&purge), Err(()));
        assert!("get".parse::<Method>().is_err());
    }
}
