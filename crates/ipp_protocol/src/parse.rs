use tracing::debug;

use crate::event::StreamEvent;

/// Parse a frame payload (or a speech socket text message) into a
/// [`StreamEvent`].
///
/// Returns `None` for empty payloads and for anything that does not decode
/// into `{"type": ..., "data": {...}}`. A corrupt unit never aborts the
/// stream it came from, so failures are only logged.
#[must_use]
pub fn parse_event(payload: &str) -> Option<StreamEvent> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(error) => {
            debug!(%error, payload, "Dropping malformed event.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::EventKind;

    #[test]
    fn test_parses_answer_token() {
        let event = parse_event(r#"{"type":"answer","data":{"token":"Go "}}"#).unwrap();

        assert_eq!(event.kind, EventKind::Answer);
        assert_eq!(event.token(), Some("Go "));
    }

    #[test]
    fn test_skips_empty_payload() {
        assert_eq!(parse_event(""), None);
        assert_eq!(parse_event("   "), None);
    }

    #[test_log::test]
    fn test_skips_malformed_payloads() {
        assert_eq!(parse_event("{not json"), None);
        assert_eq!(parse_event("[DONE]"), None);
        assert_eq!(parse_event(r#""answer""#), None);
    }

    #[test]
    fn test_requires_type_and_data() {
        assert_eq!(parse_event(r#"{"data":{"token":"x"}}"#), None);
        assert_eq!(parse_event(r#"{"type":"answer"}"#), None);
        assert_eq!(parse_event(r#"{"type":"answer","data":"x"}"#), None);
    }

    #[test]
    fn test_unknown_kind_passes_through() {
        assert_matches!(
            parse_event(r#"{"type":"progress","data":{"pct":10}}"#),
            Some(StreamEvent { kind: EventKind::Other(kind), .. }) if kind == "progress"
        );
    }
}
