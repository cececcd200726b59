//! Retry behavior of the reasoning client over a scripted transport.

mod common;

use common::{BASE_DELAY, Prompt, ScriptedTransport, client};
use twenty_questions::LlmErrorKind;

#[tokio::test]
async fn transient_failures_are_retried_with_backoff() {
    let transport = ScriptedTransport::new()
        .push(Prompt::Other, Err(LlmErrorKind::RateLimited))
        .push(Prompt::Other, Err(LlmErrorKind::Timeout))
        .push(Prompt::Other, Ok("Hello, world!"));
    let (client, sleeper) = client(&transport);

    let reply = client.prompt("Say hello").await.unwrap();

    assert_eq!(reply, "Hello, world!");
    assert_eq!(transport.total_calls(), 3);
    assert_eq!(sleeper.delays(), vec![BASE_DELAY, BASE_DELAY * 2]);
}

#[tokio::test]
async fn exhausted_retries_report_last_cause() {
    let transport = ScriptedTransport::new()
        .push(Prompt::Other, Err(LlmErrorKind::Transport))
        .push(Prompt::Other, Err(LlmErrorKind::Transport))
        .push(Prompt::Other, Err(LlmErrorKind::RateLimited))
        .push(Prompt::Other, Ok("too late"));
    let (client, sleeper) = client(&transport);

    let err = client.prompt("Say hello").await.unwrap_err();

    assert_eq!(err.kind(), LlmErrorKind::RetriesExhausted);
    assert_eq!(err.root_kind(), LlmErrorKind::RateLimited);
    assert!(err.last_cause().is_some());
    assert_eq!(transport.total_calls(), 3);
    assert_eq!(sleeper.delays().len(), 2);
}

#[tokio::test]
async fn permanent_failures_are_not_retried() {
    for kind in [
        LlmErrorKind::Configuration,
        LlmErrorKind::MalformedResponse,
        LlmErrorKind::Rejected,
    ] {
        let transport = ScriptedTransport::new().push(Prompt::Other, Err(kind));
        let (client, sleeper) = client(&transport);

        let err = client.prompt("Say hello").await.unwrap_err();

        assert_eq!(err.kind(), kind);
        assert_eq!(transport.total_calls(), 1);
        assert!(sleeper.delays().is_empty());
    }
}

#[tokio::test]
async fn generate_passes_messages_through() {
    let transport = ScriptedTransport::new().default_reply(Prompt::Other, "ok");
    let (client, _) = client(&transport);

    client.prompt("Say hello").await.unwrap();

    let request = transport.last_request(Prompt::Other).unwrap();
    assert_eq!(request.len(), 1);
    assert_eq!(request[0].content, "Say hello");
}
