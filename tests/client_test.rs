//! DeepSeek client passthrough and the widget-side relay client.

use persona_relay::client::{RelayClient, Transcript, render_non_json, render_reply};
use persona_relay::llm::{CompletionApi, CompletionRequest, DeepSeekClient, PromptMessage};
use persona_relay::model::{ChatResponse, Role};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn deepseek_client_posts_bearer_request_and_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "messages": [{ "role": "user", "content": "你好" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"choices":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(
        SecretString::from("sk-test"),
        format!("{}/", server.uri()),
        "deepseek-chat",
    );
    let request = CompletionRequest::new(client.model(), vec![PromptMessage::user("你好")], 0.3);
    let raw = client.complete(&request).await.unwrap();

    assert_eq!(raw.status, 200);
    assert_eq!(raw.body, r#"{"choices":[]}"#);
}

#[tokio::test]
async fn deepseek_client_does_not_interpret_error_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream busy"))
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(SecretString::from("k"), server.uri(), "deepseek-chat");
    let request = CompletionRequest::new("deepseek-chat", vec![], 0.3);
    let raw = client.complete(&request).await.unwrap();

    assert_eq!(raw.status, 503);
    assert_eq!(raw.body, "upstream busy");
}

#[test]
fn transcript_sends_recent_turns_before_the_question() {
    let mut transcript = Transcript::new("hello").window(3);
    for i in 0..4 {
        transcript.push_user(format!("q{i}"));
        transcript.push_assistant(format!("a{i}"));
    }

    let request = transcript.request_for("next");

    assert_eq!(request.message, "next");
    let contents: Vec<&str> = request.history.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["a2", "q3", "a3"]);
}

#[test]
fn transcript_clear_keeps_only_the_greeting() {
    let mut transcript = Transcript::new("hello");
    transcript.push_user("q");
    transcript.push_assistant("a");
    transcript.clear();

    assert_eq!(transcript.turns().len(), 1);
    assert_eq!(transcript.turns()[0].role, Role::Assistant);
    assert_eq!(transcript.turns()[0].content, "hello");
}

#[test]
fn failure_envelope_renders_status_and_raw() {
    let reply = ChatResponse::failure("Completion API returned non-JSON")
        .with_debug(json!({ "httpStatus": 500, "raw": "<html>" }));

    assert_eq!(
        render_reply(&reply),
        "【错误】Completion API returned non-JSON\n上游 HTTP 500\n(raw=<html>)"
    );
}

#[test]
fn empty_answer_renders_placeholder() {
    let reply = ChatResponse {
        ok: true,
        answer: None,
        error: None,
        debug: None,
    };
    assert_eq!(render_reply(&reply), "（无返回）");
}

#[test]
fn non_json_relay_body_is_quoted() {
    assert_eq!(
        render_non_json(502, "Bad \"Gateway\""),
        "【错误】API返回不是JSON\nHTTP 502\n(body=\"Bad \\\"Gateway\\\"\")"
    );
}

#[tokio::test]
async fn relay_client_records_both_sides_of_the_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({
            "message": "你好",
            "history": [{ "role": "assistant", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "answer": "你好呀"
        })))
        .mount(&server)
        .await;

    let client = RelayClient::new(format!("{}/chat", server.uri()));
    let mut transcript = Transcript::new("hello");

    assert_eq!(client.ask(&mut transcript, "   ").await, None);
    let reply = client.ask(&mut transcript, " 你好 ").await;

    assert_eq!(reply.as_deref(), Some("你好呀"));
    let turns = transcript.turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1].content, "你好");
    assert_eq!(turns[2].content, "你好呀");
}

#[tokio::test]
async fn relay_client_renders_non_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(504).set_body_string("Gateway Timeout"))
        .mount(&server)
        .await;

    let client = RelayClient::new(format!("{}/chat", server.uri()));
    let reply = client
        .send(&persona_relay::model::ChatRequest::new("hi"))
        .await;

    assert_eq!(
        reply,
        "【错误】API返回不是JSON\nHTTP 504\n(body=\"Gateway Timeout\")"
    );
}
