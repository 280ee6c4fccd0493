//! Shared HTTP utilities for the Contact Gateway workspace.
//!
//! Provides the common JSON response body builders used by the gateway's
//! HTTP surface. Failure bodies always carry a top-level `error` field;
//! success confirmations carry a `message` field instead, never both.

/// Create an error JSON body: `{"error": "<message>"}`.
///
/// The message is relayed as-is; backend failures put the failure's own
/// message here verbatim.
pub fn json_err(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

/// Create a confirmation JSON body: `{"message": "<message>"}`.
pub fn json_message(message: &str) -> serde_json::Value {
    serde_json::json!({ "message": message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_err() {
        let err = json_err("Invalid data_store value");
        assert_eq!(err, serde_json::json!({"error": "Invalid data_store value"}));
        // Error bodies never carry a message field
        assert!(err.get("message").is_none());
    }

    #[test]
    fn test_json_message() {
        let msg = json_message("Contact deleted successfully from Database");
        assert_eq!(
            msg,
            serde_json::json!({"message": "Contact deleted successfully from Database"})
        );
        // Success bodies never carry an error field
        assert!(msg.get("error").is_none());
    }
}
