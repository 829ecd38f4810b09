use serde::{Deserialize, Serialize};

/// Body of `POST /api/addnote`. `dropdown_value` travels as `dropdownValue`,
/// the name the form's hidden input uses on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNoteRequest {
    pub word: String,
    #[serde(rename = "dropdownValue")]
    pub dropdown_value: String,
}

/// Success body of `POST /api/addnote`: the confirmation text plus the
/// submitted word and dropdown token echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNoteAccepted {
    pub message: String,
    pub word: String,
    pub value: String,
}

/// Client-side view of any addnote response body. The server guarantees
/// `message` only on success and attaches `error` detail only on failure,
/// so both fields stay optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddNoteReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_note_request_uses_the_form_field_names() {
        let request = AddNoteRequest {
            word: "abc".to_string(),
            dropdown_value: "en".to_string(),
        };
        let body = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(body, json!({"word": "abc", "dropdownValue": "en"}));
    }

    #[test]
    fn add_note_reply_tolerates_partial_bodies() {
        let success: AddNoteReply =
            serde_json::from_value(json!({"message": "Added!"})).expect("success body");
        assert_eq!(success.message.as_deref(), Some("Added!"));
        assert_eq!(success.error, None);

        let failure: AddNoteReply =
            serde_json::from_value(json!({"error": "db down"})).expect("failure body");
        assert_eq!(failure.message, None);
        assert_eq!(failure.error.as_deref(), Some("db down"));

        let empty: AddNoteReply = serde_json::from_value(json!({})).expect("empty body");
        assert_eq!(empty.message, None);
        assert_eq!(empty.error, None);
    }

    #[test]
    fn accepted_body_echoes_word_and_value() {
        let accepted = AddNoteAccepted {
            message: "Note added successfully".to_string(),
            word: "cat".to_string(),
            value: "english".to_string(),
        };
        let body = serde_json::to_value(&accepted).expect("serialize accepted");
        assert_eq!(
            body,
            json!({"message": "Note added successfully", "word": "cat", "value": "english"})
        );
    }
}
