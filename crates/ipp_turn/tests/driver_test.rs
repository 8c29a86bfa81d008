use assert_matches::assert_matches;
use httpmock::prelude::*;
use ipp_client::{Client, SpeechOutcome};
use ipp_test::{
    mock::{Reply, SpeechServer},
    sse,
};
use ipp_turn::{
    CommittedMessage, Conversation, Error, SpeechOptions, TurnStatus, chat_turn, speech_turn,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn conversation() -> Conversation {
    let mut conversation = Conversation::new("S1");
    conversation.select_context(42).unwrap();
    conversation
}

fn sentinel() -> Reply {
    Reply::Event(json!({ "type": "info", "data": { "message": "Speech session completed." } }))
}

#[test_log::test(tokio::test)]
async fn test_chat_turn_commits_exchange() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/interview/S1/stream")
                .json_body(json!({ "search_query_id": 42, "query": "What is Go?" }));
            then.status(200).body(sse::body([
                json!({ "type": "reasoning", "data": { "token": "Recall Go." } }),
                json!({ "type": "answer", "data": { "token": "Go is a language." } }),
                json!({
                    "type": "complete",
                    "data": { "response": "Go is a language.", "interview_finished": false }
                }),
            ]));
        })
        .await;

    let client = Client::new(server.url("/api/v1"));
    let mut conversation = conversation();

    let report = chat_turn(&client, &mut conversation, "What is Go?")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(report.status, TurnStatus::Completed);
    assert_eq!(report.speech, None);
    assert_eq!(conversation.messages(), &[
        CommittedMessage::user("What is Go?"),
        CommittedMessage::assistant("Go is a language."),
    ]);
    assert_eq!(conversation.partial_reasoning(), "");
    assert!(!conversation.is_streaming());
}

#[test_log::test(tokio::test)]
async fn test_chat_turn_without_complete_is_incomplete() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat/interview/S1/stream");
            then.status(200).body(sse::body([
                json!({ "type": "answer", "data": { "token": "Go is" } }),
            ]));
        })
        .await;

    let client = Client::new(server.url("/api/v1"));
    let mut conversation = conversation();

    let report = chat_turn(&client, &mut conversation, "What is Go?")
        .await
        .unwrap();

    assert_eq!(report.status, TurnStatus::Incomplete);
    assert_eq!(conversation.messages(), &[CommittedMessage::user("What is Go?")]);
    assert_eq!(conversation.partial_answer(), "");
}

#[test_log::test(tokio::test)]
async fn test_chat_turn_error_event_fails_turn() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat/interview/S1/stream");
            then.status(200).body(sse::body([
                json!({ "type": "answer", "data": { "token": "Go" } }),
                json!({ "type": "error", "data": { "error": "model overloaded" } }),
            ]));
        })
        .await;

    let client = Client::new(server.url("/api/v1"));
    let mut conversation = conversation();

    let result = chat_turn(&client, &mut conversation, "What is Go?").await;

    assert_matches!(result, Err(Error::Failed(reason)) if reason == "model overloaded");
    assert_eq!(
        conversation.status(),
        &TurnStatus::Failed("model overloaded".to_owned())
    );
    assert_eq!(conversation.messages().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_chat_turn_http_failure_keeps_user_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat/interview/S1/stream");
            then.status(422).body("search_query_id is required");
        })
        .await;

    let client = Client::new(server.url("/api/v1"));
    let mut conversation = conversation();

    let result = chat_turn(&client, &mut conversation, "What is Go?").await;

    assert_matches!(
        result,
        Err(Error::Client(ipp_client::Error::Api { code: 422, .. }))
    );
    assert_matches!(conversation.status(), TurnStatus::Failed(_));
    assert_eq!(conversation.messages(), &[CommittedMessage::user("What is Go?")]);
    assert!(!conversation.is_streaming());
}

#[test_log::test(tokio::test)]
async fn test_speech_turn_attaches_recording_and_synthesized_audio() {
    let server = SpeechServer::start(vec![
        Reply::Event(json!({ "type": "transcript", "data": { "text": "Tell me about Go" } })),
        Reply::Event(json!({ "type": "reasoning", "data": { "token": "Think." } })),
        Reply::Event(json!({ "type": "answer", "data": { "token": "Go is fast." } })),
        Reply::Event(json!({ "type": "complete", "data": { "interview_finished": true } })),
        Reply::Event(json!({ "type": "audio_chunk", "data": { "chunk": "AAA=" } })),
        Reply::Event(json!({ "type": "audio_chunk", "data": { "chunk": "AAE=" } })),
        sentinel(),
    ])
    .await;

    let client = Client::new(server.base_url());
    let mut conversation = conversation();
    let options = SpeechOptions {
        tts_enabled: true,
        language_code: Some("en".to_owned()),
    };

    let report = speech_turn(&client, &mut conversation, vec![0x1A, 0x45], &options)
        .await
        .unwrap();
    let recording = server.finish().await;

    assert_eq!(report.status, TurnStatus::Completed);
    assert_eq!(report.speech, Some(SpeechOutcome::Completed));
    assert_eq!(recording.messages[0]["search_query_id"], json!(42));
    assert_eq!(recording.messages[0]["language_code"], json!("en"));
    assert_eq!(recording.messages[1]["chunk"], json!("GkU="));
    assert!(conversation.interview_finished());

    let [user, assistant] = conversation.messages() else {
        panic!("expected two messages, got {:?}", conversation.messages());
    };
    assert_eq!(user.content, "Tell me about Go");
    assert_eq!(assistant.content, "Go is fast.");

    let audio = conversation.audio();
    let clip = audio.get(user.audio_url.as_deref().unwrap()).unwrap();
    assert_eq!(clip.bytes(), &[0x1A, 0x45]);
    assert_eq!(clip.media_type(), "audio/webm");

    let answer = audio.get(assistant.audio_url.as_deref().unwrap()).unwrap();
    assert_eq!(answer.bytes(), &[0, 0, 0, 1]);
    assert_eq!(answer.media_type(), "audio/mpeg");
}

#[test_log::test(tokio::test)]
async fn test_speech_turn_error_event_fails_turn() {
    let server = SpeechServer::start(vec![
        Reply::Event(json!({ "type": "transcript", "data": { "text": "Hello" } })),
        Reply::Event(json!({ "type": "error", "data": { "error": "Bad audio" } })),
    ])
    .await;

    let client = Client::new(server.base_url());
    let mut conversation = conversation();

    let result = speech_turn(&client, &mut conversation, vec![1], &SpeechOptions::default()).await;
    server.finish().await;

    assert_matches!(
        result,
        Err(Error::Client(ipp_client::Error::Speech(message))) if message == "Bad audio"
    );
    assert_eq!(
        conversation.status(),
        &TurnStatus::Failed("Bad audio".to_owned())
    );

    // The transcript was committed before the failure.
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].content, "Hello");
}

#[test_log::test(tokio::test)]
async fn test_speech_turn_close_after_complete_keeps_answer() {
    let server = SpeechServer::start(vec![
        Reply::Event(json!({ "type": "transcript", "data": { "text": "Hello" } })),
        Reply::Event(json!({ "type": "answer", "data": { "token": "Hi." } })),
        Reply::Event(json!({ "type": "complete", "data": {} })),
        Reply::Close,
    ])
    .await;

    let client = Client::new(server.base_url());
    let mut conversation = conversation();

    let report = speech_turn(&client, &mut conversation, vec![1], &SpeechOptions::default())
        .await
        .unwrap();
    server.finish().await;

    assert_eq!(report.speech, Some(SpeechOutcome::ClosedWithoutSentinel));
    assert_eq!(report.status, TurnStatus::Completed);
    assert_eq!(conversation.messages()[1], CommittedMessage::assistant("Hi."));
}

#[test_log::test(tokio::test)]
async fn test_speech_turn_reset_drops_partials() {
    let server = SpeechServer::start(vec![
        Reply::Event(json!({ "type": "answer", "data": { "token": "Hi" } })),
        Reply::Reset,
    ])
    .await;

    let client = Client::new(server.base_url());
    let mut conversation = conversation();

    let result = speech_turn(&client, &mut conversation, vec![1], &SpeechOptions::default()).await;
    server.finish().await;

    assert_matches!(result, Err(Error::Client(ipp_client::Error::Socket(_))));
    assert_matches!(conversation.status(), TurnStatus::Failed(_));
    assert_eq!(conversation.partial_answer(), "");
    assert!(conversation.messages().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_turns_run_one_after_another() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat/interview/S1/stream");
            then.status(200).body(sse::body([json!({
                "type": "complete",
                "data": { "response": "Next question." }
            })]));
        })
        .await;

    let client = Client::new(server.url("/api/v1"));
    let mut conversation = conversation();

    chat_turn(&client, &mut conversation, "one").await.unwrap();
    chat_turn(&client, &mut conversation, "two").await.unwrap();

    assert_eq!(conversation.messages().len(), 4);
    assert!(conversation.can_evaluate());
}
