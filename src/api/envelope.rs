use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized success value: `{ success, data, message }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiEnvelope<U> {
        ApiEnvelope {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
        }
    }
}

/// Body shape the backend answers with, success or not.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, String>>,
}

impl RawEnvelope {
    pub fn is_success(&self) -> bool {
        match (&self.status, self.success) {
            (Some(status), _) => status.eq_ignore_ascii_case("success"),
            (None, Some(success)) => success,
            (None, None) => true,
        }
    }

    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// The payload lives in `data`; the backend also wraps payloads in
    /// `message`, so a structured `message` is tried next, then an empty
    /// payload. A text `message` is never a payload.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if let Some(data) = &self.data {
            return serde_json::from_value(data.clone());
        }
        if let Some(message @ (Value::Object(_) | Value::Array(_))) = &self.message {
            if let Ok(payload) = serde_json::from_value(message.clone()) {
                return Ok(payload);
            }
        }
        serde_json::from_value(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_payload_prefers_data() {
        let envelope = raw(json!({
            "status": "success",
            "data": { "accessToken": "a" },
            "message": "Logged in"
        }));
        assert!(envelope.is_success());
        let payload: Value = envelope.payload().unwrap();
        assert_eq!(payload["accessToken"], "a");
        assert_eq!(envelope.message_text().as_deref(), Some("Logged in"));
    }

    #[test]
    fn test_payload_falls_back_to_message() {
        let envelope = raw(json!({ "status": "success", "message": { "accessToken": "a" } }));
        let payload: Value = envelope.payload().unwrap();
        assert_eq!(payload["accessToken"], "a");
        assert_eq!(envelope.message_text(), None);
    }

    #[test]
    fn test_unit_payload_with_text_message() {
        let envelope = raw(json!({ "status": "success", "message": "Email sent" }));
        let payload: Result<(), _> = envelope.payload();
        assert!(payload.is_ok());
    }

    #[test]
    fn test_text_message_is_not_a_payload() {
        let envelope = raw(json!({ "status": "success", "message": "Login successful" }));
        let payload: Option<String> = envelope.payload().unwrap();
        assert_eq!(payload, None);
        assert_eq!(envelope.message_text().as_deref(), Some("Login successful"));
    }

    #[test]
    fn test_error_status() {
        let envelope = raw(json!({ "status": "error", "message": "Admin not found" }));
        assert!(!envelope.is_success());

        let envelope = raw(json!({ "success": false }));
        assert!(!envelope.is_success());
    }
}
