use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::game_manager::{GameManager, ManagerError};
use game_types::GameAction;

pub mod config;
pub mod game_manager;
pub mod text_generation;

pub fn create_routes(
    game_manager: Arc<GameManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let game_manager_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let state = warp::path("state")
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_state_request);

    let actions = warp::path("actions")
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json::<GameAction>())
        .and(game_manager_filter.clone())
        .and_then(handle_action_request);

    let history = warp::path("history")
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_history_request);

    let leaderboard = warp::path("leaderboard")
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_leaderboard_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(state)
        .or(actions)
        .or(history)
        .or(leaderboard)
        .with(cors)
        .with(warp::log("imposter_game"))
}

fn unavailable_reply() -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": "Game manager is not running"
        })),
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

async fn handle_state_request(
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.snapshot().await {
        Ok(snapshot) => Ok(warp::reply::with_status(
            warp::reply::json(&snapshot),
            StatusCode::OK,
        )),
        Err(_) => Ok(unavailable_reply()),
    }
}

async fn handle_action_request(
    action: GameAction,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.apply(action).await {
        Ok(snapshot) => Ok(warp::reply::with_status(
            warp::reply::json(&snapshot),
            StatusCode::OK,
        )),
        Err(ManagerError::Game(e)) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": e.to_string(),
                "details": e,
            })),
            StatusCode::BAD_REQUEST,
        )),
        Err(ManagerError::Unavailable) => Ok(unavailable_reply()),
    }
}

async fn handle_history_request(
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.history().await {
        Ok(summary) => Ok(warp::reply::with_status(
            warp::reply::json(&summary),
            StatusCode::OK,
        )),
        Err(_) => Ok(unavailable_reply()),
    }
}

async fn handle_leaderboard_request(
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.leaderboard().await {
        Ok(profiles) => Ok(warp::reply::with_status(
            warp::reply::json(&profiles),
            StatusCode::OK,
        )),
        Err(_) => Ok(unavailable_reply()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::text_generation::OfflineGenerator;
    use game_core::Game;
    use game_persistence::{HistoryRepository, MemoryStore};
    use serde_json::Value;

    async fn create_test_app()
    -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let history = HistoryRepository::new(Arc::new(MemoryStore::new()));
        let game_manager = GameManager::start(
            Game::with_seed(7),
            Arc::new(OfflineGenerator),
            history,
            Duration::from_millis(10),
        )
        .await;

        create_routes(Arc::new(game_manager))
    }

    fn action_request(body: Value) -> warp::test::RequestBuilder {
        warp::test::request()
            .method("POST")
            .path("/actions")
            .json(&body)
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
    async fn test_initial_state_is_setup() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/state")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["phase"], "SETUP");
        assert_eq!(body["difficulty"], "medium");
        assert_eq!(body["players"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_add_player_returns_snapshot() {
        let app = create_test_app().await;

        let action = serde_json::json!({ "type": "AddPlayer", "name": "  Alice  " });
        let response = action_request(action).reply(&app).await;

        assert_eq!(response.status(), 200);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["players"][0]["player"]["name"], "Alice");
    }

    #[tokio::test]
    async fn test_guard_violation_is_bad_request() {
        let app = create_test_app().await;

        let response = action_request(serde_json::json!({ "type": "StartGame" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert!(body["error"].as_str().unwrap().contains("at least 3"));
        assert!(body["details"].get("NotEnoughPlayers").is_some());
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let app = create_test_app().await;

        let response = action_request(serde_json::json!({ "type": "FlipTable" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_history_and_leaderboard_start_empty() {
        let app = create_test_app().await;

        let history = warp::test::request()
            .method("GET")
            .path("/history")
            .reply(&app)
            .await;
        assert_eq!(history.status(), 200);
        let body: Value = serde_json::from_slice(history.body()).unwrap();
        assert_eq!(body["total_games"], 0);

        let leaderboard = warp::test::request()
            .method("GET")
            .path("/leaderboard")
            .reply(&app)
            .await;
        assert_eq!(leaderboard.status(), 200);
        assert_eq!(leaderboard.body(), "[]");
    }
}
