use asc_api::client::{ApiError, AscApi, FALLBACK_MESSAGE};
use asc_api::result::MatchResult;
use asc_api::{MatchStatus, Player, TournamentStatus};
use mockito::Matcher;
use std::time::Duration;

const TOURNAMENT_JSON: &str = r#"{
    "id": 12,
    "title": "Afrik Soccer Cup - Saison 3",
    "status": "in-progress",
    "maxPlayers": 4,
    "prizeDistribution": {"first": 100000, "second": 50000, "third": 25000},
    "players": [
        {"id": 1, "name": "Kofi", "registeredAt": "2026-09-01T08:00:00Z"},
        {"id": 2, "name": "Ama"},
        {"id": 3, "name": "Moussa"}
    ]
}"#;

fn api(server: &mockito::Server) -> AscApi {
    AscApi::new(server.url()).with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn lists_tournaments() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/tournaments")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id": 1, "title": "Cup A", "status": "open", "playerCount": 3, "maxPlayers": 16},
                {"id": "b", "title": "Cup B", "status": "completed", "maxPlayers": 8}]"#,
        )
        .create_async()
        .await;

    let list = api(&server).list_tournaments().await.unwrap();
    mock.assert_async().await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].player_count, 3);
    assert_eq!(list[1].id, "b");
    assert_eq!(list[1].status, TournamentStatus::Complete);
}

#[tokio::test]
async fn fetches_tournament_without_bracket() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/tournaments/12")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOURNAMENT_JSON)
        .create_async()
        .await;

    let t = api(&server).fetch_tournament("12").await.unwrap();
    assert_eq!(t.title, "Afrik Soccer Cup - Saison 3");
    assert_eq!(t.players.len(), 3);
    assert!(t.players[0].registered_at.is_some());
    assert!(!t.has_bracket());
    assert_eq!(t.prizes.first, 100000);
}

#[tokio::test]
async fn sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/tournaments/12")
        .match_header("authorization", "Bearer s3cret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOURNAMENT_JSON)
        .create_async()
        .await;

    api(&server)
        .with_token(Some("s3cret".into()))
        .fetch_tournament("12")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_uses_backend_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/tournaments/12")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Session expirée"}"#)
        .create_async()
        .await;

    let err = api(&server).fetch_tournament("12").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Session expirée"));
}

#[tokio::test]
async fn generate_bracket_returns_confirmation() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/tournaments/12/generate-bracket")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Bracket created with 2 rounds"}"#)
        .create_async()
        .await;

    let message = api(&server).generate_bracket("12").await.unwrap();
    mock.assert_async().await;
    assert_eq!(message, "Bracket created with 2 rounds");
}

#[tokio::test]
async fn generate_bracket_with_empty_body_still_succeeds() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/tournaments/12/generate-bracket")
        .with_status(204)
        .create_async()
        .await;

    let message = api(&server).generate_bracket("12").await.unwrap();
    assert_eq!(message, "Bracket generated");
}

#[tokio::test]
async fn existing_bracket_is_a_rejection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/tournaments/12/generate-bracket")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Bracket already generated"}"#)
        .create_async()
        .await;

    let err = api(&server).generate_bracket("12").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
    assert_eq!(err.user_message(), "Bracket already generated");
}

#[tokio::test]
async fn server_error_without_body_falls_back_to_generic_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/tournaments")
        .with_status(500)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let err = api(&server).list_tournaments().await.unwrap_err();
    assert!(matches!(err, ApiError::Server(..)));
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/tournaments/12")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 12, "title": "x", "status": "paused"}"#)
        .create_async()
        .await;

    let err = api(&server).fetch_tournament("12").await.unwrap_err();
    assert!(matches!(err, ApiError::Parsing(..)));
}

#[tokio::test]
async fn submits_match_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/tournaments/12/matches/m7/result")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "date": "2026-10-17",
            "time": "18:30",
            "scores": [{"playerId": "1", "score": 3}, {"playerId": "2", "score": 2}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": "m7", "round": 1, "matchNumber": 1, "status": "completed",
                "players": [{"id": 1, "name": "Kofi"}, {"id": 2, "name": "Ama"}],
                "scores": [{"playerId": 1, "score": 3}, {"playerId": 2, "score": 2}],
                "winnerId": 1, "nextMatchId": "m9"}"#,
        )
        .create_async()
        .await;

    let players = vec![Player::new("1", "Kofi"), Player::new("2", "Ama")];
    let result =
        MatchResult::parse("2026-10-17", "18:30", &players, &["3".into(), "2".into()]).unwrap();

    let updated = api(&server)
        .submit_match_result("12", "m7", &result)
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(updated.status, MatchStatus::Completed);
    assert_eq!(updated.score, Some((3, 2)));
    assert_eq!(updated.winner_id.as_deref(), Some("1"));
    assert_eq!(updated.next_match_id.as_deref(), Some("m9"));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let api = AscApi::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(500));
    let err = api.list_tournaments().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(..)));
    assert_eq!(err.user_message(), FALLBACK_MESSAGE);
}

#[tokio::test]
async fn tournament_id_stays_one_path_segment() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/tournaments/cup%2F2%3Fx")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TOURNAMENT_JSON)
        .create_async()
        .await;

    api(&server).fetch_tournament("cup/2?x").await.unwrap();
    mock.assert_async().await;
}
