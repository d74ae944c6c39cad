//! Error reporting shared by every table-facing operation.
//!
//! Each error knows a stable code and a [`ErrorSeverity`]; [`IntoErrorResponse::report`]
//! logs it at the matching level and hands back the body a front end would
//! serialize. Mapping codes onto transport status values is left to that
//! front end.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Stable code such as `invalid_action`
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorResponse {
            error: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured context, e.g. the offending session id.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Bad action or unknown table. Expected in normal play.
    Client,
    /// Something inside the table went wrong
    Server,
    /// Shared table storage can no longer be trusted
    Critical,
}

pub trait IntoErrorResponse {
    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Client
    }

    fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.error_code(), self.error_message());
        match self.error_details() {
            Some(details) => response.with_details(details),
            None => response,
        }
    }

    /// Logs the error at its severity and returns the response body.
    fn report(&self) -> ErrorResponse {
        let response = self.to_error_response();
        emit(self.severity(), &response);
        response
    }
}

fn emit(severity: ErrorSeverity, response: &ErrorResponse) {
    let code = response.error.as_str();
    let message = response.message.as_str();
    match severity {
        ErrorSeverity::Client => tracing::info!(code, message, "client error"),
        ErrorSeverity::Server => tracing::error!(code, message, "server error"),
        ErrorSeverity::Critical => {
            tracing::error!(code, message, critical = true, "critical error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TestLogSubscriber;
    use serde_json::json;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    struct Poisoned;

    impl IntoErrorResponse for Poisoned {
        fn error_code(&self) -> &'static str {
            "storage_poisoned"
        }
        fn error_message(&self) -> String {
            "lock poisoned".into()
        }
        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Critical
        }
    }

    #[test]
    fn details_are_omitted_when_absent() {
        let body = serde_json::to_value(ErrorResponse::new("invalid_action", "Not your turn"))
            .expect("serialize");

        assert_eq!(body, json!({ "error": "invalid_action", "message": "Not your turn" }));
    }

    #[test]
    fn details_travel_with_the_body() {
        let response = ErrorResponse::new("session_not_found", "Session not found: abc")
            .with_details(json!({ "session_id": "abc" }));

        let line = response.to_json().expect("serialize");
        assert!(line.contains("\"session_id\":\"abc\""));
        assert_eq!(response.to_string(), "session_not_found: Session not found: abc");

        let back: ErrorResponse = serde_json::from_str(&line).expect("deserialize");
        assert_eq!(back, response);
    }

    #[test]
    fn critical_errors_log_at_error_level_with_a_flag() {
        let sink = TestLogSubscriber::new();
        let registry = Registry::default().with(sink.clone().into_layer());

        let response = tracing::subscriber::with_default(registry, || Poisoned.report());

        assert_eq!(response.error, "storage_poisoned");
        let entries = sink.find("critical error");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::ERROR);
        assert_eq!(entries[0].field("code"), Some("storage_poisoned"));
        assert_eq!(entries[0].field("critical"), Some("true"));
    }
}
