//! Google Form webhook payload handling.
//!
//! The form-side Apps Script posts `{formId, formTitle, responseId,
//! timestamp, respondentEmail?, responses}` signed with the workflow's
//! webhook secret. Shape validation happens after signature verification
//! and before any workflow side effect.

use crate::error::PayloadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

/// A validated Google Form submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFormPayload {
    /// The form's identifier.
    pub form_id: String,
    /// The form's title.
    pub form_title: String,
    /// The submission's identifier.
    pub response_id: String,
    /// When the form was submitted.
    pub timestamp: String,
    /// The respondent's email, when the form collects it.
    #[serde(default)]
    pub respondent_email: Option<String>,
    /// Question title to answer value.
    pub responses: Map<String, JsonValue>,
}

/// Parses and validates a Google Form webhook body.
///
/// # Errors
///
/// Returns an error when the body is not JSON, a required field is absent,
/// or a required field is empty.
pub fn parse_google_form_payload(body: &str) -> Result<GoogleFormPayload, PayloadError> {
    let payload: GoogleFormPayload =
        serde_json::from_str(body).map_err(|e| PayloadError::new(e.to_string()))?;

    for (field, value) in [
        ("formId", &payload.form_id),
        ("formTitle", &payload.form_title),
        ("responseId", &payload.response_id),
        ("timestamp", &payload.timestamp),
    ] {
        if value.is_empty() {
            return Err(PayloadError::new(format!("{field} is required")));
        }
    }

    Ok(payload)
}

/// Shapes a validated submission into the run's initial context data.
///
/// Everything lands under `googleForm` so templates read
/// `{{get googleForm.responses "Your Name"}}`; the unvalidated body stays
/// available under `raw`.
#[must_use]
pub fn google_form_initial_data(payload: &GoogleFormPayload, raw: &JsonValue) -> JsonValue {
    json!({
        "googleForm": {
            "formId": payload.form_id,
            "formTitle": payload.form_title,
            "responseId": payload.response_id,
            "timestamp": payload.timestamp,
            "respondentEmail": payload.respondent_email,
            "responses": payload.responses,
            "raw": raw,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> String {
        json!({
            "formId": "form-1",
            "formTitle": "Feedback",
            "responseId": "resp-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "respondentEmail": "amy@example.com",
            "responses": {"Your Name": "Amy", "What can we improve?": "Docs"}
        })
        .to_string()
    }

    #[test]
    fn parses_valid_payload() {
        let payload = parse_google_form_payload(&valid_body()).expect("parse");
        assert_eq!(payload.form_id, "form-1");
        assert_eq!(
            payload.responses.get("Your Name"),
            Some(&json!("Amy"))
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let body = json!({
            "formTitle": "Feedback",
            "responseId": "resp-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "responses": {}
        })
        .to_string();

        let result = parse_google_form_payload(&body);
        assert!(result.is_err());
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let body = json!({
            "formId": "",
            "formTitle": "Feedback",
            "responseId": "resp-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "responses": {}
        })
        .to_string();

        match parse_google_form_payload(&body) {
            Err(e) => assert!(e.to_string().contains("formId is required")),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn respondent_email_is_optional() {
        let body = json!({
            "formId": "form-1",
            "formTitle": "Feedback",
            "responseId": "resp-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "responses": {}
        })
        .to_string();

        let payload = parse_google_form_payload(&body).expect("parse");
        assert!(payload.respondent_email.is_none());
    }

    #[test]
    fn initial_data_nests_under_google_form() {
        let raw: JsonValue = serde_json::from_str(&valid_body()).expect("json");
        let payload = parse_google_form_payload(&valid_body()).expect("parse");

        let initial = google_form_initial_data(&payload, &raw);
        assert_eq!(initial["googleForm"]["formTitle"], "Feedback");
        assert_eq!(
            initial["googleForm"]["responses"]["What can we improve?"],
            "Docs"
        );
        assert_eq!(initial["googleForm"]["raw"]["formId"], "form-1");
    }
}
