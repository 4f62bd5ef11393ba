//! HTTP surface of the service.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use mugsmith_core::{
    ar::{ArLinkBuilder, ArLinkError, ArUrlRequest, ArUrlResponse, ErrorResponse},
    editor::{Editor, EditorConfig},
    io::{data_url, DesignFile, Sources},
    repositories::{fonts::Fonts, images::Images},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub ar: Arc<ArLinkBuilder>,
    pub fonts: Arc<Fonts>,
    pub editor: EditorConfig,
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/ar-url", post(ar_url))
        .route("/api/composite", post(composite))
        .route("/ar/:session", get(viewer))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// An error status with a JSON body.
#[derive(Debug)]
struct ApiError(StatusCode, ErrorResponse);
impl ApiError {
    fn new(status: StatusCode, error: &str, details: Option<String>) -> Self {
        Self(
            status,
            ErrorResponse {
                error: error.to_owned(),
                details,
            },
        )
    }
    fn internal(error: &str, details: impl std::fmt::Display) -> Self {
        log::error!("{error}: {details}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error,
            Some(details.to_string()),
        )
    }
    fn unprocessable(error: &str, details: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            error,
            Some(details.to_string()),
        )
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Bodies are parsed by hand so every failure, even a missing content type, answers in JSON.
async fn ar_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ArUrlResponse>, ApiError> {
    let request: ArUrlRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::internal("Failed to generate AR URL", e))?;
    let image_url = request.image_url.unwrap_or_default();
    match state.ar.link(&image_url) {
        Ok(link) => {
            log::info!("generated AR link for session {}", link.session_id);
            Ok(Json(ArUrlResponse::new(link, &state.ar, &image_url)))
        }
        Err(ArLinkError::MissingImage) => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Image URL is required",
            None,
        )),
        Err(e) => Err(ApiError::internal("Failed to generate AR URL", e)),
    }
}

#[derive(Debug, serde::Deserialize)]
struct ViewerQuery {
    image: Option<String>,
}
#[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSession {
    pub session_id: String,
    pub image_url: String,
}

/// What a viewer needs to load the texture of a session.
async fn viewer(
    Path(session): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<ViewerSession>, ApiError> {
    let image_url = query
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "No image provided", None))?;
    Ok(Json(ViewerSession {
        session_id: session,
        image_url,
    }))
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
enum Target {
    /// The whole canvas, as shown in the editor.
    #[default]
    Stage,
    /// The image-sized mug texture.
    Texture,
}
#[derive(Debug, Default, serde::Deserialize)]
struct CompositeQuery {
    #[serde(default)]
    target: Target,
}
#[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResponse {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

async fn composite(
    State(state): State<AppState>,
    Query(query): Query<CompositeQuery>,
    body: Bytes,
) -> Result<Json<CompositeResponse>, ApiError> {
    let file: DesignFile =
        serde_json::from_slice(&body).map_err(|e| ApiError::unprocessable("Invalid design", e))?;
    // Decoding and rasterizing are CPU bound, keep them off the reactor.
    tokio::task::spawn_blocking(move || render_design(&state, file, query.target))
        .await
        .map_err(|e| ApiError::internal("Render task failed", e))?
        .map(Json)
}

fn render_design(
    state: &AppState,
    file: DesignFile,
    target: Target,
) -> Result<CompositeResponse, ApiError> {
    // Each request gets its own image store, dropped with the editor. Clients never get to
    // name files on this machine.
    let mut editor = Editor::new(
        Arc::new(Images::new()),
        state.fonts.clone(),
        state.editor.clone(),
    );
    file.import(&mut editor, Sources::InlineOnly)
        .map_err(|e| ApiError::unprocessable("Invalid design", e))?;
    let image = match target {
        Target::Stage => editor.composite(),
        Target::Texture => editor.texture(),
    }
    .map_err(|e| ApiError::unprocessable("Failed to render design", e))?;
    let data_url = data_url::encode_png(&image)
        .map_err(|e| ApiError::internal("Failed to encode image", e))?;
    Ok(CompositeResponse {
        data_url,
        width: image.width(),
        height: image.height(),
    })
}

#[cfg(test)]
mod test {
    use super::{router, AppState, CompositeResponse, ViewerSession};
    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use mugsmith_core::{
        ar::{ArLinkBuilder, ArUrlResponse, ErrorResponse},
        editor::EditorConfig,
        io::data_url,
        repositories::fonts::Fonts,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        router(
            AppState {
                ar: Arc::new(ArLinkBuilder::new("https://mugs.example").unwrap()),
                fonts: Arc::new(Fonts::empty()),
                editor: EditorConfig::default(),
            },
            1024 * 1024,
        )
    }
    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap()
    }
    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }
    #[tokio::test]
    async fn ar_url_links_viewer() {
        let (status, body) = send(post_json(
            "/api/ar-url",
            r#"{"imageUrl": "https://cdn.example/mug.png"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: ArUrlResponse = serde_json::from_slice(&body).unwrap();
        assert!(response
            .url
            .starts_with(&format!("https://mugs.example/ar/{}?image=", response.session_id)));
        assert_eq!(response.debug.base_url, "https://mugs.example");
        assert_eq!(response.debug.image_url_length, 27);
    }
    #[tokio::test]
    async fn ar_url_requires_image() {
        let (status, body) = send(post_json("/api/ar-url", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Image URL is required");
    }
    #[tokio::test]
    async fn viewer_echoes_session() {
        let request = Request::get("/ar/abc123?image=https%3A%2F%2Fcdn.example%2Fmug.png")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        let session: ViewerSession = serde_json::from_slice(&body).unwrap();
        assert_eq!(session.session_id, "abc123");
        assert_eq!(session.image_url, "https://cdn.example/mug.png");

        let request = Request::get("/ar/abc123").body(Body::empty()).unwrap();
        assert_eq!(send(request).await.0, StatusCode::BAD_REQUEST);
    }
    #[tokio::test]
    async fn composite_renders_canvas() {
        let design = r##"{"canvas": {"width": 4, "height": 2, "color": "#ff0000"}}"##;
        let (status, body) = send(post_json("/api/composite", design)).await;
        assert_eq!(status, StatusCode::OK);
        let response: CompositeResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!((response.width, response.height), (4, 2));
        let png = data_url::decode(&response.data_url).unwrap().data;
        let image = image_pixels(&png);
        assert!(image.iter().all(|pixel| *pixel == [255, 0, 0, 255]));
    }
    #[tokio::test]
    async fn texture_needs_image() {
        let (status, body) = send(post_json("/api/composite?target=texture", "{}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Failed to render design");
    }
    #[tokio::test]
    async fn composite_rejects_bad_image() {
        let design = r#"{"image": {"src": "data:image/png;base64,AAAA"}}"#;
        let (status, _) = send(post_json("/api/composite", design)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn ar_url_errors_are_json() {
        for missing in [r#"{"imageUrl": null}"#, r#"{"imageUrl": ""}"#, "{}"] {
            let (status, body) = send(post_json("/api/ar-url", missing)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{missing}");
            let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(error.error, "Image URL is required");
            assert_eq!(error.details, None);
        }
        for broken in ["not json", r#"{"imageUrl": 5}"#, ""] {
            let (status, body) = send(post_json("/api/ar-url", broken)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{broken}");
            let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(error.error, "Failed to generate AR URL");
            assert!(error.details.is_some());
        }
    }
    #[tokio::test]
    async fn ar_url_ignores_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/ar-url")
            .body(Body::from(r#"{"imageUrl": " "}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        let response: ArUrlResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.debug.image_url_length, 1);
    }
    #[tokio::test]
    async fn composite_never_reads_local_files() {
        let path = std::env::temp_dir().join("mugsmith-route-local.png");
        std::fs::write(&path, canvas_png(3, 2, "#074db1").await).unwrap();
        let design = serde_json::json!({ "image": { "src": path } }).to_string();
        for uri in ["/api/composite", "/api/composite?target=texture"] {
            let (status, body) = send(post_json(uri, &design)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(error.error, "Invalid design");
        }
        let _ = std::fs::remove_file(path);
    }
    #[tokio::test]
    async fn composite_rejects_huge_canvas() {
        let design = r#"{"canvas": {"width": 4294967295, "height": 4294967295}}"#;
        let (status, body) = send(post_json("/api/composite", design)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Invalid design");
    }
    #[tokio::test]
    async fn composite_malformed_body_is_json() {
        let (status, body) = send(post_json("/api/composite", "{")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Invalid design");
    }

    /// PNG bytes of a flat canvas, rendered through the service itself.
    async fn canvas_png(width: u32, height: u32, color: &str) -> Vec<u8> {
        let design = serde_json::json!({
            "canvas": { "width": width, "height": height, "color": color }
        })
        .to_string();
        let (_, body) = send(post_json("/api/composite", &design)).await;
        let response: CompositeResponse = serde_json::from_slice(&body).unwrap();
        data_url::decode(&response.data_url).unwrap().data
    }
    /// Decode PNG bytes back to RGBA through the core's image repository round trip.
    fn image_pixels(png: &[u8]) -> Vec<[u8; 4]> {
        let image = mugsmith_core::raster::decode(png).unwrap();
        image.pixels().map(|pixel| pixel.0).collect()
    }
}
