use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use warp::Filter;

use draft_core::{GameRecorded, GameSubmission, LeaderboardAggregator, SubmitError, WeekId};
use draft_persistence::repositories::GameRepository;
use draft_types::{GameResult, ROSTER_SIZE, SubmitGameRequest, SubmitGameResponse};

#[derive(Deserialize)]
struct LeaderboardQuery {
    week: Option<String>,
}

pub mod config;
pub mod events;

pub fn create_routes(
    aggregator: Arc<LeaderboardAggregator>,
    game_repository: Arc<GameRepository>,
    game_events: mpsc::UnboundedSender<GameRecorded>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let aggregator_filter = warp::any().map({
        let aggregator = aggregator.clone();
        move || aggregator.clone()
    });

    let game_repository_filter = warp::any().map({
        let game_repository = game_repository.clone();
        move || game_repository.clone()
    });

    let game_events_filter = warp::any().map({
        let game_events = game_events.clone();
        move || game_events.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Direct submission endpoint
    let submit_game = warp::path!("leaderboard" / "games")
        .and(warp::post())
        .and(warp::body::json())
        .and(aggregator_filter.clone())
        .and_then(handle_submit_game);

    // Weekly top-10 endpoint
    let leaderboard = warp::path!("leaderboard")
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(aggregator_filter.clone())
        .and_then(handle_leaderboard_request);

    // Game history endpoints
    let record_game = warp::path!("users" / String / "games")
        .and(warp::post())
        .and(warp::body::json())
        .and(game_repository_filter.clone())
        .and(game_events_filter.clone())
        .and_then(handle_record_game);

    let user_games = warp::path!("users" / String / "games")
        .and(warp::get())
        .and(game_repository_filter.clone())
        .and_then(handle_user_games_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(submit_game)
        .or(leaderboard)
        .or(record_game)
        .or(user_games)
        .with(cors)
        .with(warp::log("draft_arena"))
}

async fn handle_submit_game(
    request: SubmitGameRequest,
    aggregator: Arc<LeaderboardAggregator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match aggregator.submit_game(&request.user_id, &request.game).await {
        Ok(_) => Ok(warp::reply::with_status(
            warp::reply::json(&SubmitGameResponse::ok()),
            warp::http::StatusCode::OK,
        )),
        Err(SubmitError::InvalidInput(reason)) => Ok(warp::reply::with_status(
            warp::reply::json(&SubmitGameResponse::rejected(reason)),
            warp::http::StatusCode::BAD_REQUEST,
        )),
        Err(SubmitError::Store(err)) => {
            tracing::error!("Failed to store submission: {}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&SubmitGameResponse::rejected("Failed to store submission")),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_leaderboard_request(
    query: LeaderboardQuery,
    aggregator: Arc<LeaderboardAggregator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let week = match query.week {
        Some(raw) => match raw.parse::<WeekId>() {
            Ok(week) => Some(week),
            Err(err) => {
                return Ok(warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({
                        "error": format!("Invalid week: {}", err)
                    })),
                    warp::http::StatusCode::BAD_REQUEST,
                ));
            }
        },
        None => None,
    };

    match aggregator.top_entries(week).await {
        Ok(entries) => Ok(warp::reply::with_status(
            warp::reply::json(&entries),
            warp::http::StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to fetch leaderboard: {}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Failed to fetch leaderboard"
                })),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_record_game(
    user_id: String,
    game: GameResult,
    game_repository: Arc<GameRepository>,
    game_events: mpsc::UnboundedSender<GameRecorded>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // History is the gameplay-facing surface, so the full roster contract
    // applies here, not just the looser ranking checks.
    if game.players.len() != ROSTER_SIZE {
        return Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": format!(
                    "A completed draft has exactly {} players, got {}",
                    ROSTER_SIZE,
                    game.players.len()
                )
            })),
            warp::http::StatusCode::BAD_REQUEST,
        ));
    }

    // Validation never touches the store, so any error here is client-caused.
    let submission = match GameSubmission::new(&user_id, &game, Utc::now()) {
        Ok(submission) => submission,
        Err(err) => {
            return Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({ "error": err.to_string() })),
                warp::http::StatusCode::BAD_REQUEST,
            ));
        }
    };

    match game_repository
        .record_game(
            &user_id,
            submission.score,
            &submission.players,
            submission.timestamp,
        )
        .await
    {
        Ok(record) => {
            // The stored game triggers ranking; recording succeeds whether or
            // not the trigger is picked up.
            let event = GameRecorded {
                user_id: record.user_id.clone(),
                score: record.score,
                players: record.players.clone(),
                played_at: submission.timestamp,
            };
            if let Err(err) = game_events.send(event) {
                tracing::warn!(
                    "Ranking trigger for user {} was dropped: {}",
                    record.user_id,
                    err
                );
            }

            Ok(warp::reply::with_status(
                warp::reply::json(&record),
                warp::http::StatusCode::CREATED,
            ))
        }
        Err(err) => {
            tracing::error!("Failed to record game for user {}: {}", user_id, err);
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Failed to record game"
                })),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_user_games_request(
    user_id: String,
    game_repository: Arc<GameRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_repository.games_for_user(&user_id).await {
        Ok(games) => Ok(warp::reply::with_status(
            warp::reply::json(&games),
            warp::http::StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to fetch games for user {}: {}", user_id, err);
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Failed to fetch game history"
                })),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::time::Duration;

    use draft_persistence::connection::connect_to_memory_database;
    use draft_persistence::repositories::LeaderboardRepository;
    use draft_types::{GameRecord, LeaderboardEntry, ROSTER_POSITIONS};
    use migration::{Migrator, MigratorTrait};

    async fn create_test_app()
    -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        // In-memory database plus the ranking consumer, wired the way main
        // does it.
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let aggregator = Arc::new(LeaderboardAggregator::new(Arc::new(
            LeaderboardRepository::new(db.clone()),
        )));
        let game_repository = Arc::new(GameRepository::new(db));

        let (game_events, receiver) = events::game_event_channel();
        events::spawn_game_recorded_consumer(aggregator.clone(), receiver);

        create_routes(aggregator, game_repository, game_events)
    }

    fn roster_json(points_each: f64) -> serde_json::Value {
        let players: Vec<serde_json::Value> = ROSTER_POSITIONS
            .iter()
            .map(|position| {
                serde_json::json!({
                    "name": format!("Test {}", position),
                    "team": "FA",
                    "position": position,
                    "points": points_each,
                    "year": 2024,
                })
            })
            .collect();
        serde_json::Value::Array(players)
    }

    fn game_json(score: f64, date: Option<&str>) -> serde_json::Value {
        let mut game = serde_json::json!({
            "score": score,
            "players": roster_json(score / ROSTER_SIZE as f64),
        });
        if let Some(date) = date {
            game["date"] = serde_json::json!(date);
        }
        game
    }

    fn submit_body(user_id: &str, score: f64, date: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "userId": user_id,
            "game": game_json(score, date),
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_submit_game_success_envelope() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("user-1", 91.5, Some("2025-10-01T12:00:00Z")))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("error").is_none());

        // 2025-10-01 falls in ISO week 2025-W40
        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W40")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "user-1");
        assert_eq!(entries[0].score, 91.5);
    }

    #[tokio::test]
    async fn test_submit_game_rejects_invalid_input() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("", 50.0, Some("2025-10-01T12:00:00Z")))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("userId"));

        let response = warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("user-1", 50.0, Some("yesterday-ish")))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 400);

        // Nothing landed on the board
        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W40")
            .reply(&app)
            .await;
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_submit_game_rejects_malformed_body() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .header("content-type", "application/json")
            .body("{\"userId\": \"user-1\", \"game\":")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_and_caps_at_ten() {
        let app = create_test_app().await;

        for i in 1..=12u32 {
            let date = format!("2025-10-01T12:{:02}:00Z", i);
            let response = warp::test::request()
                .method("POST")
                .path("/leaderboard/games")
                .json(&submit_body(
                    &format!("user-{}", i),
                    (i * 10) as f64,
                    Some(&date),
                ))
                .reply(&app)
                .await;
            assert_eq!(response.status(), 200);
        }

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W40")
            .reply(&app)
            .await;

        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(entries.len(), 10);

        let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
        let expected: Vec<f64> = (3..=12u32).rev().map(|i| (i * 10) as f64).collect();
        assert_eq!(scores, expected);
        assert_eq!(entries[0].user_id, "user-12");
        assert_eq!(entries[9].user_id, "user-3");
    }

    #[tokio::test]
    async fn test_leaderboard_tiebreak_prefers_earlier_game() {
        let app = create_test_app().await;

        // Submitted in the opposite order of their game dates
        warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("u-late", 50.0, Some("2025-10-01T10:05:00Z")))
            .reply(&app)
            .await;
        warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("u-early", 50.0, Some("2025-10-01T10:00:00Z")))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W40")
            .reply(&app)
            .await;

        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        let users: Vec<&str> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(users, vec!["u-early", "u-late"]);
    }

    #[tokio::test]
    async fn test_leaderboard_endpoint_empty() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W07")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_rejects_malformed_week() {
        let app = create_test_app().await;

        for week in ["2025-40", "banana", "2025-W1", "2025-W99"] {
            let response = warp::test::request()
                .method("GET")
                .path(&format!("/leaderboard?week={}", week))
                .reply(&app)
                .await;

            assert_eq!(response.status(), 400, "week {:?} should be rejected", week);
            let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
            assert!(body["error"].as_str().unwrap().contains("Invalid week"));
        }
    }

    #[tokio::test]
    async fn test_leaderboard_defaults_to_current_week() {
        let app = create_test_app().await;

        // Undated, so it lands in the processing week
        let response = warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("user-now", 64.0, None))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "user-now");
    }

    #[tokio::test]
    async fn test_weeks_partition_over_http() {
        let app = create_test_app().await;

        // Sunday 23:59 of 2025-W39 and Monday 00:00 of 2025-W40
        warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("sunday", 80.0, Some("2025-09-28T23:59:59Z")))
            .reply(&app)
            .await;
        warp::test::request()
            .method("POST")
            .path("/leaderboard/games")
            .json(&submit_body("monday", 90.0, Some("2025-09-29T00:00:00Z")))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W39")
            .reply(&app)
            .await;
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "sunday");

        let response = warp::test::request()
            .method("GET")
            .path("/leaderboard?week=2025-W40")
            .reply(&app)
            .await;
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "monday");
    }

    #[tokio::test]
    async fn test_record_game_and_fetch_history() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/users/user-1/games")
            .json(&game_json(77.0, Some("2025-10-01T15:00:00Z")))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 201);
        let record: GameRecord = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.score, 77.0);
        let played_at = chrono::DateTime::parse_from_rfc3339(&record.played_at).unwrap();
        assert_eq!(
            played_at,
            chrono::DateTime::parse_from_rfc3339("2025-10-01T15:00:00Z").unwrap()
        );

        let response = warp::test::request()
            .method("POST")
            .path("/users/user-1/games")
            .json(&game_json(82.5, Some("2025-10-01T18:00:00Z")))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 201);

        // Most recent game first
        let response = warp::test::request()
            .method("GET")
            .path("/users/user-1/games")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let history: Vec<GameRecord> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].score, 82.5);
        assert_eq!(history[1].score, 77.0);

        let response = warp::test::request()
            .method("GET")
            .path("/users/someone-else/games")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let history: Vec<GameRecord> = serde_json::from_slice(response.body()).unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_record_game_rejects_wrong_roster_size() {
        let app = create_test_app().await;

        for count in [3, 8] {
            let players: Vec<serde_json::Value> = (0..count)
                .map(|i| {
                    serde_json::json!({
                        "name": format!("Player {}", i),
                        "team": "FA",
                        "position": "FLEX",
                        "points": 5.0,
                        "year": 2024,
                    })
                })
                .collect();
            let body = serde_json::json!({ "score": 35.0, "players": players });

            let response = warp::test::request()
                .method("POST")
                .path("/users/user-1/games")
                .json(&body)
                .reply(&app)
                .await;

            assert_eq!(response.status(), 400);
            let error: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
            assert!(
                error["error"]
                    .as_str()
                    .unwrap()
                    .contains("exactly 7 players")
            );
        }

        // Nothing got recorded
        let response = warp::test::request()
            .method("GET")
            .path("/users/user-1/games")
            .reply(&app)
            .await;
        let history: Vec<GameRecord> = serde_json::from_slice(response.body()).unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_record_game_rejects_invalid_content() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/users/user-1/games")
            .json(&game_json(-5.0, None))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 400);

        let response = warp::test::request()
            .method("POST")
            .path("/users/user-1/games")
            .json(&game_json(40.0, Some("not a date")))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_recorded_game_feeds_leaderboard() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("POST")
            .path("/users/rank-me/games")
            .json(&game_json(99.0, Some("2025-10-01T12:00:00Z")))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 201);

        // The consumer ranks the game asynchronously
        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        for _ in 0..50 {
            let response = warp::test::request()
                .method("GET")
                .path("/leaderboard?week=2025-W40")
                .reply(&app)
                .await;
            entries = serde_json::from_slice(response.body()).unwrap();
            if !entries.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "rank-me");
        assert_eq!(entries[0].score, 99.0);
    }

    #[tokio::test]
    async fn test_http_endpoints_cors() {
        let app = create_test_app().await;

        // Test CORS preflight request
        let response = warp::test::request()
            .method("OPTIONS")
            .path("/health")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "GET")
            .reply(&app)
            .await;

        // Should allow CORS
        assert_eq!(response.status(), 200);

        // Check CORS headers are present
        let headers = response.headers();
        assert!(headers.contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_invalid_routes() {
        let app = create_test_app().await;

        // Test invalid path
        let response = warp::test::request()
            .method("GET")
            .path("/invalid")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }
}
