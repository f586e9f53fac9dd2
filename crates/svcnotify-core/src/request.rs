//! Notification request decoding.
//!
//! A request is a JSON object with exactly one recognized key:
//!
//! ```json
//! { "state": "READY=1" }
//! ```
//!
//! Fields are checked in document order and the first violation wins: an
//! unknown key rejects the request even if a valid `state` follows it, and an
//! empty `state` is rejected before any later key is looked at.

use std::fmt;

use serde::Deserializer as _;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};

use crate::error::NotifyError;

/// The only key a request may carry.
pub const STATE_FIELD: &str = "state";

/// A validated notification request.
///
/// The state string is guaranteed non-empty and is passed to the service
/// manager verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    state: String,
}

impl NotificationRequest {
    /// Decodes and validates a request buffer.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::MalformedRequest`] if the buffer is not a JSON object
    ///   or `state` is not a string.
    /// - [`NotifyError::UnknownField`] if a key other than `state` appears.
    /// - [`NotifyError::MissingParameter`] if `state` is absent or empty.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NotifyError> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let fields = (&mut deserializer)
            .deserialize_map(RequestVisitor)
            .map_err(|e| NotifyError::malformed(e.to_string()))?;
        deserializer
            .end()
            .map_err(|e| NotifyError::malformed(e.to_string()))?;

        match fields {
            DecodedFields::State(state) => Ok(Self { state }),
            DecodedFields::UnknownField(field) => Err(NotifyError::unknown_field(field)),
            DecodedFields::NoState => Err(NotifyError::missing_parameter(STATE_FIELD)),
        }
    }

    /// The lifecycle state string, e.g. `READY=1`.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Consumes the request, returning the state string.
    #[must_use]
    pub fn into_state(self) -> String {
        self.state
    }
}

/// Outcome of walking the request object.
enum DecodedFields {
    State(String),
    UnknownField(String),
    NoState,
}

struct RequestVisitor;

impl<'de> Visitor<'de> for RequestVisitor {
    type Value = DecodedFields;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a request object with a single `{STATE_FIELD}` field")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut state: Option<String> = None;
        let mut seen_state = false;
        let mut violation: Option<DecodedFields> = None;

        // The whole object is drained even after a violation so the
        // deserializer sees a balanced document.
        while let Some(key) = map.next_key::<String>()? {
            if violation.is_some() {
                map.next_value::<IgnoredAny>()?;
                continue;
            }

            if key == STATE_FIELD {
                if seen_state {
                    return Err(de::Error::duplicate_field(STATE_FIELD));
                }
                seen_state = true;
                let value: String = map.next_value()?;
                if value.is_empty() {
                    violation = Some(DecodedFields::NoState);
                } else {
                    state = Some(value);
                }
            } else {
                map.next_value::<IgnoredAny>()?;
                violation = Some(DecodedFields::UnknownField(key));
            }
        }

        Ok(violation.unwrap_or(state.map_or(DecodedFields::NoState, DecodedFields::State)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Result<NotificationRequest, NotifyError> {
        NotificationRequest::from_slice(raw.as_bytes())
    }

    #[test]
    fn accepts_state_verbatim() {
        let request = decode(r#"{"state": "READY=1"}"#).expect("valid request");
        assert_eq!(request.state(), "READY=1");

        let request = decode(r#"{"state": " STATUS=warming up\nREADY=1 "}"#).expect("valid");
        assert_eq!(request.into_state(), " STATUS=warming up\nREADY=1 ");
    }

    #[test]
    fn missing_state_is_missing_parameter() {
        let err = decode("{}").unwrap_err();
        assert!(
            matches!(err, NotifyError::MissingParameter { parameter: "state", .. }),
            "{err}"
        );
    }

    #[test]
    fn empty_state_is_missing_parameter() {
        let err = decode(r#"{"state": ""}"#).unwrap_err();
        assert!(matches!(err, NotifyError::MissingParameter { .. }), "{err}");
    }

    #[test]
    fn unknown_field_is_rejected_even_with_valid_state() {
        for raw in [
            r#"{"foo": 1}"#,
            r#"{"state": "READY=1", "foo": 1}"#,
            r#"{"foo": {"nested": [1, 2]}, "state": "READY=1"}"#,
        ] {
            let err = decode(raw).unwrap_err();
            match err {
                NotifyError::UnknownField { ref field, .. } => assert_eq!(field, "foo"),
                other => panic!("expected UnknownField for {raw}, got {other}"),
            }
        }
    }

    #[test]
    fn first_violation_in_document_order_wins() {
        let err = decode(r#"{"state": "", "foo": 1}"#).unwrap_err();
        assert!(matches!(err, NotifyError::MissingParameter { .. }), "{err}");

        let err = decode(r#"{"bar": true, "state": ""}"#).unwrap_err();
        assert!(
            matches!(err, NotifyError::UnknownField { ref field, .. } if field == "bar"),
            "{err}"
        );
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for raw in [
            "",
            "not json",
            r#"["state", "READY=1"]"#,
            r#""READY=1""#,
            r#"{"state": 1}"#,
            r#"{"state": null}"#,
            r#"{"state": "READY=1"} trailing"#,
            r#"{"state": "READY=1", "state": "STOPPING=1"}"#,
        ] {
            let err = decode(raw).unwrap_err();
            assert!(
                matches!(err, NotifyError::MalformedRequest { .. }),
                "expected MalformedRequest for {raw:?}, got {err}"
            );
        }
    }
}
