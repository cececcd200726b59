//! Session store tests.

mod common;

use common::{Prompt, ScriptedTransport, client};
use std::collections::HashSet;
use twenty_questions::{GameError, GameStatus, LlmErrorKind, Phase, PlayerKind, SessionStore};

#[tokio::test]
async fn create_get_and_remove() {
    let (client, _) = client(&ScriptedTransport::new());
    let store = SessionStore::new(client);
    assert!(store.is_empty());

    let view = store
        .create(PlayerKind::Passive, PlayerKind::Passive)
        .await
        .unwrap();
    assert_eq!(view.status, GameStatus::Playing);
    assert_eq!(view.phase, Phase::WaitingForObject);
    assert_eq!(view.question_count, 0);
    assert_eq!(store.ids(), vec![view.id.clone()]);

    let session = store.get(&view.id).unwrap();
    session.lock().await.set_object("kite").unwrap();
    let session = store.get(&view.id).unwrap();
    assert_eq!(session.lock().await.phase(), Phase::WaitingForQuestion);

    store.remove(&view.id).unwrap();
    assert!(store.is_empty());
    assert!(matches!(
        store.get(&view.id),
        Err(GameError::SessionNotFound(_))
    ));
    assert!(matches!(
        store.remove(&view.id),
        Err(GameError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (client, _) = client(&ScriptedTransport::new());
    let store = SessionStore::new(client);
    match store.get("missing") {
        Err(GameError::SessionNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("unexpected lookup result: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn failed_creation_stores_nothing() {
    let transport =
        ScriptedTransport::new().push(Prompt::Secret, Err(LlmErrorKind::Configuration));
    let (client, _) = client(&transport);
    let store = SessionStore::new(client);

    let err = store
        .create(PlayerKind::Automated, PlayerKind::Passive)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::ReasoningService(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn concurrent_creation_yields_distinct_sessions() {
    let transport = ScriptedTransport::new().default_reply(Prompt::Secret, "kite");
    let (client, _) = client(&transport);
    let store = SessionStore::new(client);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create(PlayerKind::Automated, PlayerKind::Passive)
                    .await
                    .map(|view| view.id)
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(ids.len(), 16);
    assert_eq!(store.len(), 16);
    assert_eq!(transport.count(Prompt::Secret), 16);
}

#[tokio::test]
async fn sessions_are_independent() {
    let (client, _) = client(&ScriptedTransport::new());
    let store = SessionStore::new(client);
    let a = store
        .create(PlayerKind::Passive, PlayerKind::Passive)
        .await
        .unwrap();
    let b = store
        .create(PlayerKind::Passive, PlayerKind::Passive)
        .await
        .unwrap();

    {
        let session = store.get(&a.id).unwrap();
        let mut session = session.lock().await;
        session.set_object("kite").unwrap();
        session.make_guess("kite").unwrap();
    }

    let b_session = store.get(&b.id).unwrap();
    let b_session = b_session.lock().await;
    assert_eq!(b_session.status(), GameStatus::Playing);
    assert_eq!(b_session.phase(), Phase::WaitingForObject);
}
