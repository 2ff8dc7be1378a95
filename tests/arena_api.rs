//! Orchestration API tests: start, move, reset, terminate, join

#![cfg(unix)]


use std::time::Duration;

use gomoku_arena::protocol::AI_MOVES_FIRST;
use gomoku_arena::session::SessionId;
use gomoku_arena::{Arena, ArenaError};
use test_utils::{FIXED_AI_MOVE, fixture};

fn arena() -> Arena {
    Arena::from_config(&fixture().config())
}

#[tokio::test]
async fn test_start_then_ai_first_move() {
    let arena = arena();

    let id = arena.start_session(None).await.expect("start failed");
    let outcome = arena
        .make_move(&id.to_string(), AI_MOVES_FIRST)
        .await
        .expect("move failed");

    assert_eq!(outcome.index, FIXED_AI_MOVE);
    assert!(!outcome.win);
    arena.shutdown().await;
}

#[tokio::test]
async fn test_unknown_ids_are_no_such_session() {
    let arena = arena();

    let never_issued = SessionId::new().to_string();
    let err = arena.make_move(&never_issued, 5).await.unwrap_err();
    assert!(matches!(err, ArenaError::NoSuchSession(_)));

    let err = arena.make_move("not-a-session", 5).await.unwrap_err();
    assert!(matches!(err, ArenaError::NoSuchSession(_)));

    let err = arena.subscribe(&never_issued).await.err().unwrap();
    assert_eq!(err.kind(), "no_such_session");
}

#[tokio::test]
async fn test_reset_unknown_id_yields_usable_session() {
    let arena = arena();

    let id = arena
        .reset(&SessionId::new().to_string(), None)
        .await
        .expect("reset failed");
    let outcome = arena.make_move(&id.to_string(), 8).await.expect("move failed");

    assert_eq!(outcome.index, FIXED_AI_MOVE);
    assert_eq!(arena.registry().len().await, 1);
    arena.shutdown().await;
}

#[tokio::test]
async fn test_reset_replaces_existing_session() {
    let arena = arena();

    let old = arena.start_session(None).await.unwrap();
    let new = arena.reset(&old.to_string(), None).await.unwrap();

    assert_ne!(old, new);
    let err = arena.make_move(&old.to_string(), 5).await.unwrap_err();
    assert!(matches!(err, ArenaError::SessionClosed(_)), "got {err:?}");
    assert!(arena.make_move(&new.to_string(), 5).await.is_ok());
    assert_eq!(arena.registry().len().await, 1);
    arena.shutdown().await;
}

#[tokio::test]
async fn test_reset_with_unknown_model_keeps_old_session() {
    let arena = arena();
    let old = arena.start_session(None).await.unwrap();

    let err = arena.reset(&old.to_string(), Some("no_such_model")).await.unwrap_err();
    assert_eq!(err.kind(), "unknown_model");

    let outcome = arena.make_move(&old.to_string(), 5).await.expect("old session was closed");
    assert_eq!(outcome.index, FIXED_AI_MOVE);
    assert_eq!(arena.registry().len().await, 1);
    arena.shutdown().await;
}

#[tokio::test]
async fn test_reset_with_garbage_id_still_starts() {
    let arena = arena();
    let id = arena.reset("garbage", None).await.expect("reset failed");
    assert!(arena.registry().get(&id).await.is_ok());
    arena.shutdown().await;
}

#[tokio::test]
async fn test_terminate_then_move_is_session_closed() {
    let arena = arena();
    let id = arena.start_session(None).await.unwrap();

    arena.terminate(&id.to_string()).await.unwrap();

    let err = arena.make_move(&id.to_string(), 5).await.unwrap_err();
    assert_eq!(err.kind(), "session_closed");
    assert!(arena.registry().is_empty().await);
}

#[tokio::test]
async fn test_start_with_explicit_and_unknown_models() {
    let arena = arena();

    let id = arena.start_session(Some("winner")).await.unwrap();
    let outcome = arena.make_move(&id.to_string(), 1).await.unwrap();
    assert!(outcome.win);
    assert_eq!(outcome.index, 77);

    let err = arena.start_session(Some("../engine")).await.unwrap_err();
    assert_eq!(err.kind(), "unknown_model");
    let err = arena.start_session(Some("bot_level_9")).await.unwrap_err();
    assert_eq!(err.kind(), "unknown_model");
    arena.shutdown().await;
}

#[tokio::test]
async fn test_select_model_applies_to_new_sessions() {
    let arena = arena();
    arena.select_model("winner").await.unwrap();

    let id = arena.start_session(None).await.unwrap();
    let info = arena
        .list_sessions()
        .await
        .into_iter()
        .find(|s| s.session_id == id)
        .unwrap();
    assert_eq!(info.model, "winner");

    let listing = arena.list_models().await.unwrap();
    assert_eq!(listing.current, "winner");
    assert!(listing.available.contains(&"fixed".to_string()));
    arena.shutdown().await;
}

#[tokio::test]
async fn test_join_receives_session_logs() {
    let arena = arena();
    let id = arena.start_session(None).await.unwrap();
    let (joined, mut logs) = arena.subscribe(&id.to_string()).await.unwrap();
    assert_eq!(joined, id);

    arena.make_move(&id.to_string(), AI_MOVES_FIRST).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), logs.recv())
        .await
        .expect("no log received")
        .unwrap();
    assert_eq!(event.session_id, id);
    assert_eq!(event.log, "thinking about -1");
    arena.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_everything() {
    let arena = arena();
    let a = arena.start_session(None).await.unwrap();
    let b = arena.start_session(None).await.unwrap();
    assert_eq!(arena.list_sessions().await.len(), 2);

    arena.shutdown().await;

    assert!(arena.registry().is_empty().await);
    for id in [a, b] {
        let err = arena.make_move(&id.to_string(), 5).await.unwrap_err();
        assert_eq!(err.kind(), "session_closed");
    }
}

#[tokio::test]
async fn test_move_count_in_listing() {
    let arena = arena();
    let id = arena.start_session(None).await.unwrap();
    arena.make_move(&id.to_string(), 1).await.unwrap();
    arena.make_move(&id.to_string(), 2).await.unwrap();
    let _ = arena.make_move(&id.to_string(), 13).await;

    let sessions = arena.list_sessions().await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].moves, 2);
    arena.shutdown().await;
}
