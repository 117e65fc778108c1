//! REST API handlers.
//!
//! Discovery and publishing touch the filesystem synchronously, so both run
//! on the blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use escape_admin_core::{
    find_games,
    store::{PublishOutcome, StoreError},
    GamesListing, PublishKey,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::ApiState;

/// Body of `GET /api/games/list`.
#[derive(Serialize)]
struct ListResponse {
    ok: bool,
    #[serde(flatten)]
    listing: GamesListing,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Body of every publish reply.
#[derive(Serialize)]
struct PublishResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(PublishResponse {
            ok: false,
            error: Some(msg.to_string()),
        }),
    )
}

/// GET /api/games/list
pub async fn list_games(State(state): State<ApiState>) -> impl IntoResponse {
    let roots = state.roots.clone();
    let response = match tokio::task::spawn_blocking(move || find_games(&roots)).await {
        Ok(listing) => ListResponse {
            ok: true,
            listing,
            error: None,
        },
        Err(err) => {
            error!("Game discovery task failed: {err}");
            ListResponse {
                ok: false,
                listing: GamesListing::default(),
                error: Some(err.to_string()),
            }
        }
    };
    (StatusCode::OK, Json(response))
}

/// POST /api/games/publish
pub async fn publish_game(
    State(state): State<ApiState>,
    body: Result<Json<PublishKey>, JsonRejection>,
) -> impl IntoResponse {
    let key = match body {
        Ok(Json(key)) => key,
        Err(rejection) => {
            return error_response(&rejection.body_text(), StatusCode::BAD_REQUEST).into_response()
        }
    };
    if let Err(err) = key.validate() {
        return error_response(&err.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.publish(&key)).await;
    match result {
        Ok(Ok(PublishOutcome::Published { slug, path })) => {
            info!(slug = %slug, path = %path.display(), "Published game");
            Json(PublishResponse {
                ok: true,
                error: None,
            })
            .into_response()
        }
        Ok(Ok(PublishOutcome::NotFound)) => {
            warn!("Publish request matched no game");
            Json(PublishResponse {
                ok: true,
                error: None,
            })
            .into_response()
        }
        Ok(Err(StoreError::InvalidKey(err))) => {
            error_response(&err.to_string(), StatusCode::BAD_REQUEST).into_response()
        }
        Ok(Err(err)) => {
            error!("Publish failed: {err}");
            error_response(&err.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
        Err(err) => {
            error!("Publish task failed: {err}");
            error_response(&err.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf, sync::Arc};

    use axum::body::to_bytes;
    use axum::response::Response;
    use escape_admin_core::{
        discovery::METADATA_FILE, store::GameStore, DiscoveryRoots, FsGameStore,
    };
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};

    struct BrokenStore;

    impl GameStore for BrokenStore {
        fn publish(&self, _key: &PublishKey) -> Result<PublishOutcome, StoreError> {
            Err(StoreError::NotAnObject {
                path: PathBuf::from("/games/broken/metadata.json"),
            })
        }
    }

    fn test_state() -> (TempDir, ApiState) {
        let dir = tempdir().expect("tempdir");
        let game = dir.path().join("harbor");
        fs::create_dir_all(&game).expect("game dir");
        fs::write(
            game.join(METADATA_FILE),
            r#"{ "slug": "harbor", "title": "Harbor Hunt", "channel": "draft" }"#,
        )
        .expect("metadata");

        let modern = vec![dir.path().to_path_buf()];
        let state = ApiState {
            roots: Arc::new(DiscoveryRoots {
                modern: modern.clone(),
                ..DiscoveryRoots::default()
            }),
            store: Arc::new(FsGameStore::new(modern, Vec::new())),
        };
        (dir, state)
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn list_returns_games_and_base_dirs() {
        let (_dir, state) = test_state();
        let resp = list_games(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["baseDirs"].as_array().map(Vec::len), Some(1));
        let slugs: Vec<&str> = body["games"]
            .as_array()
            .expect("games")
            .iter()
            .filter_map(|game| game["slug"].as_str())
            .collect();
        assert_eq!(slugs, vec!["default", "harbor"]);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn list_without_directories_still_has_default() {
        let state = ApiState {
            roots: Arc::new(DiscoveryRoots::default()),
            store: Arc::new(FsGameStore::default()),
        };
        let resp = list_games(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["baseDirs"], json!([]));
        assert_eq!(body["games"][0]["slug"], json!("default"));
    }

    #[tokio::test]
    async fn publish_requires_id_or_slug() {
        let (_dir, state) = test_state();
        let resp = publish_game(State(state), Ok(Json(PublishKey::default())))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["ok"], json!(false));
        assert_eq!(body["error"], json!("id or slug is required"));
    }

    #[tokio::test]
    async fn publish_marks_game_published() {
        let (dir, state) = test_state();
        let resp = publish_game(State(state.clone()), Ok(Json(PublishKey::slug("harbor"))))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({ "ok": true }));

        let raw = fs::read_to_string(dir.path().join("harbor").join(METADATA_FILE))
            .expect("metadata");
        let metadata: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(metadata["channel"], json!("published"));

        let body = json_body(list_games(State(state)).await.into_response()).await;
        let harbor = body["games"]
            .as_array()
            .expect("games")
            .iter()
            .find(|game| game["slug"] == json!("harbor"))
            .cloned()
            .expect("harbor");
        assert_eq!(harbor["channel"], json!("published"));
    }

    #[tokio::test]
    async fn publish_accepts_numeric_id() {
        let (dir, state) = test_state();
        let game = dir.path().join("lake-run");
        fs::create_dir_all(&game).expect("game dir");
        fs::write(
            game.join(METADATA_FILE),
            r#"{ "id": 7, "title": "Lake Run", "channel": "draft" }"#,
        )
        .expect("metadata");

        let key: PublishKey = serde_json::from_value(json!({ "id": 7 })).expect("key");
        let resp = publish_game(State(state), Ok(Json(key)))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({ "ok": true }));

        let raw = fs::read_to_string(game.join(METADATA_FILE)).expect("metadata");
        let metadata: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(metadata["channel"], json!("published"));
    }

    #[tokio::test]
    async fn unknown_game_is_not_an_error() {
        let (_dir, state) = test_state();
        let resp = publish_game(State(state), Ok(Json(PublishKey::slug("nowhere"))))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_failure_is_a_server_error() {
        let (_dir, mut state) = test_state();
        state.store = Arc::new(BrokenStore);
        let resp = publish_game(State(state), Ok(Json(PublishKey::id("1"))))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert_eq!(body["ok"], json!(false));
        assert!(body["error"]
            .as_str()
            .map(|msg| msg.contains("not a JSON object"))
            .unwrap_or(false));
    }
}
