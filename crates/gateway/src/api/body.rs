//! Lenient JSON request bodies.
//!
//! The browser client sometimes posts nothing at all, so a body that is
//! missing, empty, or not a JSON object reads as `{}` and each handler
//! reports the fields it actually needs.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};
use std::convert::Infallible;

#[derive(Debug, Default, Clone)]
pub struct LenientBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for LenientBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.unwrap_or_default();
        Ok(Self::from_slice(&bytes))
    }
}

impl LenientBody {
    pub fn from_slice(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// A field as text. Strings come back as-is, numbers and booleans are
    /// stringified, `null` and anything else count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// A field as trimmed, non-empty text.
    pub fn required(&self, key: &str) -> Option<String> {
        self.text(key)
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    /// A field read for its truthiness.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_reads_as_empty_object() {
        assert!(LenientBody::from_slice(b"").0.is_empty());
        assert!(LenientBody::from_slice(b"{not json").0.is_empty());
        assert!(LenientBody::from_slice(b"[1,2]").0.is_empty());
    }

    #[test]
    fn text_and_required() {
        let b = LenientBody::from_slice(br#"{"id":"abc","n":5,"blank":"  ","nil":null}"#);
        assert_eq!(b.text("id").as_deref(), Some("abc"));
        assert_eq!(b.text("n").as_deref(), Some("5"));
        assert_eq!(b.text("blank").as_deref(), Some("  "));
        assert!(b.required("blank").is_none());
        assert!(b.text("nil").is_none());
        assert!(b.text("missing").is_none());
    }

    #[test]
    fn flag_truthiness() {
        let b = LenientBody::from_slice(
            br#"{"t":true,"f":false,"one":1,"zero":0,"s":"x","e":"","o":{}}"#,
        );
        assert!(b.flag("t"));
        assert!(!b.flag("f"));
        assert!(b.flag("one"));
        assert!(!b.flag("zero"));
        assert!(b.flag("s"));
        assert!(!b.flag("e"));
        assert!(b.flag("o"));
        assert!(!b.flag("missing"));
    }
}
