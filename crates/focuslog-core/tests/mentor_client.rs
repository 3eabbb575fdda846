//! Mentor client against a mocked chat-completion endpoint.

use focuslog_core::mentor::{mentor_messages, report_messages, ChatMessage};
use focuslog_core::{ActivityLog, LlmClient, LlmError, NewEntry};
use mockito::Matcher;

fn client_for(server: &mockito::Server) -> LlmClient {
    LlmClient::new(
        "test-key".into(),
        &format!("{}/openai/v1/", server.url()),
        "llama-3.3-70b-versatile".into(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_mentor_answer_from_recent_history() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(serde_json::json!({"model": "llama-3.3-70b-versatile"})),
            Matcher::Regex("Write report".into()),
            Matcher::Regex("What should I focus on next\\?".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices":[{"message":{"role":"assistant","content":"Protect your mornings."}}]}"#,
        )
        .create_async()
        .await;

    let log = ActivityLog::open_memory().unwrap();
    log.append(NewEntry::new(25).with_task("Write report")).unwrap();
    let messages = mentor_messages(&log.recent(10).unwrap(), "What should I focus on next?", 8000);

    let answer = client_for(&server).chat_completion(&messages).await.unwrap();
    mock.assert_async().await;
    assert_eq!(answer, "Protect your mornings.");
}

#[tokio::test]
async fn test_report_request_carries_whole_log() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .match_body(Matcher::Regex("3 sessions, 85 minutes".into()))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Report"}}]}"#)
        .create_async()
        .await;

    let log = ActivityLog::open_memory().unwrap();
    for minutes in [25, 10, 50] {
        log.append(NewEntry::new(minutes)).unwrap();
    }
    let messages = report_messages(&log.all().unwrap(), 8000).unwrap();

    let report = client_for(&server).chat_completion(&messages).await.unwrap();
    mock.assert_async().await;
    assert_eq!(report, "Report");
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let err = client_for(&server)
        .chat_completion(&[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::HttpStatus { code: 429, ref body } if body == "rate limited"));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .chat_completion(&[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_body_is_a_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client_for(&server)
        .chat_completion(&[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::JsonParse { .. }));
}
