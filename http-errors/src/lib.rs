use serde::Serialize;
use std::borrow::Cow;
use tracing::{event, Level};

/// The body of every error response. Kept flat so that clients can read `error` the same way they read
/// the keys of a successful response.
#[derive(Debug, Serialize)]
pub struct ErrorResponseData {
    error: Cow<'static, str>,
    kind: Cow<'static, str>,
}

impl ErrorResponseData {
    pub fn new(
        kind: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        let ret = ErrorResponseData {
            kind: kind.into(),
            error: message.into(),
        };

        event!(Level::ERROR, kind=%ret.kind, message=%ret.error);

        ret
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorResponseData;

    #[test]
    fn serializes_flat() {
        let data = ErrorResponseData::new("validation", "No live_time field");
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "error": "No live_time field", "kind": "validation" })
        );
    }
}
