use serde_json::Value;

/// Render events as a chat stream body: one `data:` frame per event, each
/// followed by a blank separator line.
pub fn body(events: impl IntoIterator<Item = Value>) -> String {
    events
        .into_iter()
        .map(|event| format!("data: {event}\n\n"))
        .collect()
}
