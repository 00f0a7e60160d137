//! HTTP transport for the versioned document store.
//!
//! Plain GET and PUT on logical paths. A GET returns blob bytes or a JSON
//! directory listing; appending the metadata suffix (`.json`) returns the
//! path's view with its history. A PUT writes the body with the optimistic
//! check described by the `Wiki-Last-Id` header.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::VdsServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use serde_json::Value;
    use tower::util::ServiceExt;
    use vds_repo::{RepoConfig, Repository};

    fn app() -> Router {
        build_router(Repository::in_memory(RepoConfig::default()), false)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn put(app: &Router, uri: &str, body: &str, headers: &[(&str, &str)]) -> Response {
        let mut builder = Request::put(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        send(app, builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    async fn create(app: &Router, uri: &str, body: &str) -> Value {
        let response = put(app, uri, body, &[("Wiki-Last-Id", "null")]).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let app = app();
        let out = create(&app, "/docs/readme.md", "# Readme").await;

        let response = get(&app, "/docs/readme.md").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(
            response.headers()["wiki-id"].to_str().unwrap(),
            out["id"].as_str().unwrap()
        );
        assert_eq!(body_bytes(response).await, b"# Readme");
    }

    #[tokio::test]
    async fn first_write_needs_null_last_id() {
        let app = app();
        let response = put(&app, "/a", "x", &[]).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn directory_without_slash_redirects() {
        let app = app();
        create(&app, "/dir/file", "x").await;
        let response = get(&app, "/dir").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/dir/");
    }

    #[tokio::test]
    async fn listing_has_parent_entry_except_at_root() {
        let app = app();
        create(&app, "/dir/file", "x").await;

        let listing = body_json(get(&app, "/dir/").await).await;
        assert_eq!(listing["type"], "directory");
        let names: Vec<_> = listing["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["..", "file"]);

        let root = body_json(get(&app, "/").await).await;
        assert_eq!(root["entries"][0]["name"], "dir");
        assert_eq!(root["entries"][0]["isDirectory"], true);
    }

    #[tokio::test]
    async fn metadata_suffix_returns_history() {
        let app = app();
        let first = create(&app, "/page", "v1").await;
        let last_id = first["id"].as_str().unwrap().to_string();
        let second = put(
            &app,
            "/page",
            "v2",
            &[
                ("Wiki-Last-Id", last_id.as_str()),
                ("Wiki-Message", "Second draft"),
                ("Wiki-Author-Name", "Grace"),
            ],
        )
        .await;
        assert_eq!(second.status(), StatusCode::OK);

        let view = body_json(get(&app, "/page.json").await).await;
        assert_eq!(view["path"], "/page");
        assert_eq!(view["type"], "file");
        let history = view["history"]["entries"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["message"], "Second draft");
        assert_eq!(history[0]["author"]["name"], "Grace");
        assert_eq!(history[1]["message"], "Update /page");

        let dir_view = body_json(get(&app, "/.json").await).await;
        assert_eq!(dir_view["type"], "directory");
    }

    #[tokio::test]
    async fn stale_and_missing_expectations() {
        let app = app();
        let first = create(&app, "/page", "v1").await;
        let stale = first["id"].as_str().unwrap().to_string();
        put(&app, "/page", "v2", &[]).await;

        let response = put(&app, "/page", "v3", &[("Wiki-Last-Id", stale.as_str())]).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = put(&app, "/other", "v1", &[("Wiki-Last-Id", stale.as_str())]).await;
        assert_eq!(response.status(), StatusCode::GONE);

        let response = put(&app, "/page", "v3", &[("Wiki-Last-Id", "not-an-id")]).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn bad_targets() {
        let app = app();
        create(&app, "/page", "v1").await;

        assert_eq!(get(&app, "/missing").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/page/").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            put(&app, "/page.json", "x", &[]).await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(put(&app, "/dir/", "x", &[]).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(put(&app, "/", "x", &[]).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            put(&app, "/page/child", "x", &[]).await.status(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn empty_repository_root_lists_nothing() {
        let app = app();
        let root = body_json(get(&app, "/").await).await;
        assert_eq!(root["entries"].as_array().unwrap().len(), 0);
        assert!(root["commit"].is_null());
    }
}
