mod common;

use std::time::Duration;

use pickleball_back::{
    dao::models::GameStatus,
    dto::{
        auth::{LoginRequest, RegisterRequest},
        chat::PostMessageRequest,
        game::{CreateGameRequest, GameListQuery},
    },
    error::ServiceError,
    services::{auth_service, chat_service, game_service, sse_service},
};

use common::{add_court, add_user, memory_state};

fn request(court_id: i64) -> CreateGameRequest {
    CreateGameRequest {
        court_id: Some(court_id),
        date: Some("2025-03-01".into()),
        time: Some("10:00".into()),
        ..CreateGameRequest::default()
    }
}

#[tokio::test]
async fn creator_hand_over_then_cancellation() {
    let (state, store) = memory_state();
    for n in 1..=5 {
        add_court(&store, &format!("Court {n}"), None).await;
    }
    let alice = add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;

    let created = game_service::create_game(&state, alice.id, request(5))
        .await
        .unwrap();
    assert_eq!(created.message, "Game scheduled successfully");
    assert_eq!(created.game.court_id, 5);
    assert_eq!(created.game.creator_id, alice.id);
    assert_eq!(created.game.scheduled_time, "2025-03-01T10:00:00");
    assert_eq!(created.game.max_players, 4);
    let ids: Vec<i64> = created.game.participants.iter().map(|p| p.user_id).collect();
    assert_eq!(ids, vec![alice.id]);
    let game_id = created.game_id;

    let joined = game_service::join_game(&state, game_id, bob.id).await.unwrap();
    assert_eq!(joined.game.current_players, 2);

    game_service::leave_game(&state, game_id, alice.id)
        .await
        .unwrap();
    let after_creator_left = game_service::get_game(&state, game_id).await.unwrap().game;
    assert_eq!(after_creator_left.creator_id, bob.id);
    assert_eq!(after_creator_left.status, GameStatus::Scheduled);
    assert_eq!(after_creator_left.current_players, 1);
    assert_eq!(
        after_creator_left.court.as_ref().map(|c| c.court_id),
        Some(5)
    );

    let left = game_service::leave_game(&state, game_id, bob.id).await.unwrap();
    assert_eq!(left.message, "Successfully left the game");
    let cancelled = game_service::get_game(&state, game_id).await.unwrap().game;
    assert_eq!(cancelled.status, GameStatus::Cancelled);
    assert!(cancelled.participants.is_empty());

    let scheduled = game_service::list_games(&state, GameListQuery::default())
        .await
        .unwrap();
    assert!(scheduled.games.is_empty());
    let cancelled_list = game_service::list_games(
        &state,
        GameListQuery {
            status: Some("cancelled".into()),
            ..GameListQuery::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cancelled_list.games.len(), 1);
}

#[tokio::test]
async fn full_and_duplicate_joins_are_rejected_without_changes() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;
    let carol = add_user(&store, "carol").await;

    let game_id = game_service::create_game(
        &state,
        alice.id,
        CreateGameRequest {
            max_players: Some(2),
            ..request(court.id)
        },
    )
    .await
    .unwrap()
    .game_id;

    let twice = game_service::join_game(&state, game_id, alice.id)
        .await
        .unwrap_err();
    assert!(
        matches!(twice, ServiceError::Conflict(ref m) if m == "You are already a participant in this game")
    );

    game_service::join_game(&state, game_id, bob.id).await.unwrap();
    let full = game_service::join_game(&state, game_id, carol.id)
        .await
        .unwrap_err();
    assert!(matches!(full, ServiceError::Conflict(ref m) if m == "Game is already full"));

    let game = game_service::get_game(&state, game_id).await.unwrap().game;
    assert_eq!(game.current_players, 2);
    assert!(game.current_players <= game.max_players as usize);
}

#[tokio::test]
async fn cancelled_game_with_room_still_accepts_joins() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;

    let game_id = game_service::create_game(&state, alice.id, request(court.id))
        .await
        .unwrap()
        .game_id;
    game_service::leave_game(&state, game_id, alice.id)
        .await
        .unwrap();

    let joined = game_service::join_game(&state, game_id, bob.id).await.unwrap();
    assert_eq!(joined.message, "Successfully joined the game");
    assert_eq!(joined.game.status, GameStatus::Cancelled);
    assert_eq!(joined.game.current_players, 1);
    let ids: Vec<i64> = joined.game.participants.iter().map(|p| p.user_id).collect();
    assert_eq!(ids, vec![bob.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_never_overbook() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;
    let game_id = game_service::create_game(&state, alice.id, request(court.id))
        .await
        .unwrap()
        .game_id;

    let mut players = Vec::new();
    for n in 0..12 {
        players.push(add_user(&store, &format!("player{n}")).await);
    }

    let handles: Vec<_> = players
        .into_iter()
        .map(|player| {
            let state = state.clone();
            tokio::spawn(async move { game_service::join_game(&state, game_id, player.id).await })
        })
        .collect();

    let mut joined = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(err) => {
                assert!(matches!(err, ServiceError::Conflict(ref m) if m == "Game is already full"))
            }
        }
    }

    let game = game_service::get_game(&state, game_id).await.unwrap().game;
    assert_eq!(joined, 3);
    assert_eq!(game.participants.len(), 4);
    assert_eq!(game.current_players, game.max_players as usize);
}

#[tokio::test]
async fn leaving_requires_membership() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;

    let game_id = game_service::create_game(&state, alice.id, request(court.id))
        .await
        .unwrap()
        .game_id;

    let err = game_service::leave_game(&state, game_id, bob.id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::Conflict(ref m) if m == "You are not a participant in this game")
    );
    let missing = game_service::leave_game(&state, game_id + 100, alice.id)
        .await
        .unwrap_err();
    assert!(matches!(missing, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn create_game_reports_bad_input() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;

    let missing = game_service::create_game(
        &state,
        alice.id,
        CreateGameRequest {
            court_id: Some(court.id),
            ..CreateGameRequest::default()
        },
    )
    .await
    .unwrap_err();
    assert!(
        matches!(missing, ServiceError::InvalidInput(ref m) if m == "Missing required fields: date, time")
    );

    let unknown_court = game_service::create_game(&state, alice.id, request(999))
        .await
        .unwrap_err();
    assert!(
        matches!(unknown_court, ServiceError::NotFound(ref m) if m == "Court not found with ID: 999")
    );

    let bad_date = game_service::create_game(
        &state,
        alice.id,
        CreateGameRequest {
            date: Some("03/01/2025".into()),
            ..request(court.id)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_date, ServiceError::InvalidFormat(_)));

    let bad_time = game_service::create_game(
        &state,
        alice.id,
        CreateGameRequest {
            time: Some("25:00".into()),
            ..request(court.id)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_time, ServiceError::InvalidFormat(_)));

    let too_many = game_service::create_game(
        &state,
        alice.id,
        CreateGameRequest {
            max_players: Some(101),
            ..request(court.id)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(too_many, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn list_games_validates_filters() {
    let (state, _store) = memory_state();

    let bad_date = game_service::list_games(
        &state,
        GameListQuery {
            date: Some("tomorrow".into()),
            ..GameListQuery::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_date, ServiceError::InvalidInput(_)));

    let bad_status = game_service::list_games(
        &state,
        GameListQuery {
            status: Some("pending".into()),
            ..GameListQuery::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_status, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn chat_is_limited_to_participants_and_fans_out() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;
    let mallory = add_user(&store, "mallory").await;

    let game_id = game_service::create_game(&state, alice.id, request(court.id))
        .await
        .unwrap()
        .game_id;

    let denied = chat_service::list_messages(&state, game_id, mallory.id)
        .await
        .unwrap_err();
    assert!(matches!(denied, ServiceError::Forbidden(_)));

    let mut live = chat_service::subscribe(&state, game_id, alice.id)
        .await
        .unwrap();

    let empty = chat_service::post_message(
        &state,
        game_id,
        alice.id,
        PostMessageRequest {
            message: Some("   ".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(empty, ServiceError::InvalidInput(ref m) if m == "Missing message content"));

    let posted = chat_service::post_message(
        &state,
        game_id,
        alice.id,
        PostMessageRequest {
            message: Some("see you at ten".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(posted.message, "Message sent successfully");
    assert_eq!(posted.chat_message.username, "alice");

    let event = live.recv().await.unwrap();
    assert_eq!(event.event.as_deref(), Some("message"));
    let body: serde_json::Value = serde_json::from_str(&event.data).unwrap();
    assert_eq!(body["message_text"], "see you at ten");

    let history = chat_service::list_messages(&state, game_id, alice.id)
        .await
        .unwrap();
    assert_eq!(history.messages.len(), 1);
    assert_eq!(history.messages[0].message_id, posted.chat_message.message_id);

    let intruder = chat_service::post_message(
        &state,
        game_id,
        mallory.id,
        PostMessageRequest {
            message: Some("hi".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(intruder, ServiceError::Forbidden(_)));

    let blank_intruder = chat_service::post_message(
        &state,
        game_id,
        mallory.id,
        PostMessageRequest { message: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(blank_intruder, ServiceError::Forbidden(_)));

    let unknown = chat_service::subscribe(&state, game_id + 1, alice.id)
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn closing_the_last_chat_stream_releases_the_channel() {
    let (state, store) = memory_state();
    let court = add_court(&store, "Riverside", None).await;
    let alice = add_user(&store, "alice").await;
    let game_id = game_service::create_game(&state, alice.id, request(court.id))
        .await
        .unwrap()
        .game_id;

    let receiver = chat_service::subscribe(&state, game_id, alice.id)
        .await
        .unwrap();
    let stream = sse_service::to_sse_stream(state.clone(), receiver, game_id, alice.id);
    assert_eq!(state.chat().channel_count(), 1);

    drop(stream);
    for _ in 0..100 {
        if state.chat().channel_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state.chat().channel_count(), 0);
}

#[tokio::test]
async fn register_then_login_with_email() {
    let (state, _store) = memory_state();

    let registered = auth_service::register(
        &state,
        RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret123".into(),
        },
    )
    .await
    .unwrap();
    let claims = state.jwt().verify(&registered.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), registered.user.user_id);

    let duplicate = auth_service::register(
        &state,
        RegisterRequest {
            username: "alice".into(),
            email: "other@example.com".into(),
            password: "secret123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(duplicate, ServiceError::Conflict(ref m) if m == "Username already exists"));

    let logged_in = auth_service::login(
        &state,
        LoginRequest {
            username: "alice@example.com".into(),
            password: "secret123".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(logged_in.user.username, "alice");

    let wrong = auth_service::login(
        &state,
        LoginRequest {
            username: "alice".into(),
            password: "secret124".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(wrong, ServiceError::Unauthorized(ref m) if m == "Invalid credentials"));

    let weak = auth_service::register(
        &state,
        RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "password".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(weak, ServiceError::InvalidInput(_)));
}
