use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ContentResult, GenerationRequest, SingleVideoResult, VideoResult};

const CONTENT_FALLBACK_ERROR: &str = "Failed to generate content";
const VIDEO_FALLBACK_ERROR: &str = "Failed to generate video";
const DOWNLOAD_FALLBACK_ERROR: &str = "Failed to download video";

/// The generation backend as seen by the client.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn generate_content(&self, request: &GenerationRequest) -> Result<ContentResult>;

    async fn generate_video(&self, content: &ContentResult) -> Result<VideoResult>;

    async fn generate_single(&self, request: &GenerationRequest) -> Result<SingleVideoResult>;

    async fn check_health(&self) -> Result<Value>;

    /// Fetch `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;

    /// Stream/download URL for a video handle returned by `generate_video`.
    fn download_url(&self, video_path: &str) -> String;
}

pub struct HttpGenerationApi {
    client: Client,
    api_base_url: String,
    health_url: String,
    single_endpoint_url: String,
}

impl HttpGenerationApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("videogen-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            health_url: config.health_url.clone(),
            single_endpoint_url: config.single_endpoint_url.clone(),
        })
    }

    fn content_endpoint(&self) -> String {
        format!("{}/content/generate", self.api_base_url)
    }

    fn video_endpoint(&self) -> String {
        format!("{}/video/generate", self.api_base_url)
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationApi {
    async fn generate_content(&self, request: &GenerationRequest) -> Result<ContentResult> {
        tracing::info!(topic = %request.topic, "Sending content generation request");

        let response = self
            .client
            .post(self.content_endpoint())
            .header("accept", "application/json")
            .json(&request.content_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "error", CONTENT_FALLBACK_ERROR).await);
        }

        let content: ContentResult = response.json().await?;
        tracing::info!(presentation_path = %content.presentation_path, "Content generated");
        Ok(content)
    }

    async fn generate_video(&self, content: &ContentResult) -> Result<VideoResult> {
        tracing::info!(presentation_path = %content.presentation_path, "Sending video generation request");

        let response = self
            .client
            .post(self.video_endpoint())
            .header("accept", "application/json")
            .json(content)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "error", VIDEO_FALLBACK_ERROR).await);
        }

        let video: VideoResult = response.json().await?;
        tracing::info!(video_path = %video.video_path, "Video generated");
        Ok(video)
    }

    async fn generate_single(&self, request: &GenerationRequest) -> Result<SingleVideoResult> {
        tracing::info!(topic = %request.topic, "Sending single-step video request");

        let response = self
            .client
            .post(&self.single_endpoint_url)
            .json(&request.single_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response, "detail", VIDEO_FALLBACK_ERROR).await);
        }

        let mut result: SingleVideoResult = response.json().await?;
        result.video_url = resolve_video_url(&self.single_endpoint_url, &result.video_url)?;
        tracing::info!(video_url = %result.video_url, "Video generated");
        Ok(result)
    }

    async fn check_health(&self) -> Result<Value> {
        let response = self.client.get(&self.health_url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Api(format!(
                "API is not responding (HTTP {})",
                response.status()
            )));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "error", DOWNLOAD_FALLBACK_ERROR).await);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!(bytes = written, "Downloaded video to {}", dest.display());
        Ok(written)
    }

    fn download_url(&self, video_path: &str) -> String {
        format!("{}/video/download/{}", self.api_base_url, video_path)
    }
}

/// The single-call backend answers with a path relative to its own root
/// (e.g. `data/output/Math.mp4`). Absolute URLs pass through unchanged.
fn resolve_video_url(endpoint: &str, video_url: &str) -> Result<String> {
    let root = Url::parse(endpoint)?.join("/")?;
    Ok(root.join(video_url)?.to_string())
}

/// Turn a non-success response into the server-reported message, or the
/// fallback when the body carries none.
async fn api_error(response: Response, field: &str, fallback: &str) -> AppError {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| match body.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | Some(Value::String(_)) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| fallback.to_string());

    tracing::warn!(%status, "Backend returned an error: {}", message);
    AppError::Api(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DetailLevel;
    use axum::extract::Path as UrlPath;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn api_for(server: &str) -> HttpGenerationApi {
        let config = Config {
            api_base_url: format!("{server}/api"),
            health_url: format!("{server}/health"),
            single_endpoint_url: format!("{server}/generate_video/"),
            ..Config::default()
        };
        HttpGenerationApi::new(&config).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "Photosynthesis".to_string(),
            duration: 5,
            detail_level: DetailLevel::Basic,
        }
    }

    #[tokio::test]
    async fn content_request_posts_form_fields() {
        let router = Router::new().route(
            "/api/content/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(
                    body,
                    json!({ "topic": "Photosynthesis", "duration": 5, "detailLevel": "basic" })
                );
                Json(json!({ "status": "success", "content": "...", "presentation_path": "p1" }))
            }),
        );
        let api = api_for(&serve(router).await);

        let content = assert_ok!(api.generate_content(&request()).await);
        assert_eq!(content.presentation_path, "p1");
        assert_eq!(content.content, json!("..."));
    }

    #[tokio::test]
    async fn content_error_message_is_surfaced() {
        let router = Router::new().route(
            "/api/content/generate",
            post(|| async {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing required parameters" })))
            }),
        );
        let api = api_for(&serve(router).await);

        let err = assert_err!(api.generate_content(&request()).await);
        assert_eq!(err.to_string(), "Missing required parameters");
    }

    #[tokio::test]
    async fn non_json_error_body_uses_fallback() {
        let router = Router::new().route(
            "/api/video/generate",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
        );
        let api = api_for(&serve(router).await);
        let content = ContentResult {
            content: json!("..."),
            presentation_path: "p1".to_string(),
        };

        let err = assert_err!(api.generate_video(&content).await);
        assert_eq!(err.to_string(), "Failed to generate video");
    }

    #[tokio::test]
    async fn video_request_forwards_content_result() {
        let router = Router::new().route(
            "/api/video/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({ "content": { "slides": 3 }, "presentation_path": "p1" }));
                Json(json!({ "status": "success", "video_path": "v1.mp4" }))
            }),
        );
        let api = api_for(&serve(router).await);
        let content = ContentResult {
            content: json!({ "slides": 3 }),
            presentation_path: "p1".to_string(),
        };

        let video = assert_ok!(api.generate_video(&content).await);
        assert_eq!(video.video_path, "v1.mp4");
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_error() {
        let router = Router::new().route(
            "/api/video/generate",
            post(|| async { Json(json!({ "unexpected": true })) }),
        );
        let api = api_for(&serve(router).await);
        let content = ContentResult {
            content: Value::Null,
            presentation_path: "p1".to_string(),
        };

        assert!(matches!(api.generate_video(&content).await, Err(AppError::Http(_))));
    }

    #[tokio::test]
    async fn single_flow_reports_detail() {
        let router = Router::new().route(
            "/generate_video/",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["level"], "basic");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "ffmpeg missing" })))
            }),
        );
        let api = api_for(&serve(router).await);

        let err = assert_err!(api.generate_single(&request()).await);
        assert_eq!(err.to_string(), "ffmpeg missing");
    }

    #[tokio::test]
    async fn single_flow_relative_video_url_is_downloadable() {
        let router = Router::new()
            .route(
                "/generate_video/",
                post(|| async {
                    Json(json!({
                        "message": "Video generated successfully!",
                        "video_url": "data/output/Math.mp4"
                    }))
                }),
            )
            .route("/data/output/Math.mp4", get(|| async { vec![1u8; 512] }));
        let server = serve(router).await;
        let api = api_for(&server);

        let result = assert_ok!(api.generate_single(&request()).await);
        assert_eq!(result.video_url, format!("{server}/data/output/Math.mp4"));

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Math.mp4");
        let written = assert_ok!(api.download(&result.video_url, &dest).await);
        assert_eq!(written, 512);
    }

    #[test]
    fn absolute_video_url_is_left_alone() {
        let resolved = resolve_video_url(
            "http://127.0.0.1:8000/generate_video/",
            "https://cdn.example.com/videos/Math.mp4",
        )
        .unwrap();
        assert_eq!(resolved, "https://cdn.example.com/videos/Math.mp4");

        let resolved =
            resolve_video_url("http://127.0.0.1:8000/generate_video/", "/data/output/a.mp4").unwrap();
        assert_eq!(resolved, "http://127.0.0.1:8000/data/output/a.mp4");
    }

    #[tokio::test]
    async fn health_accepts_any_success_body() {
        let router = Router::new().route("/health", get(|| async { "ok" }));
        let api = api_for(&serve(router).await);

        let body = assert_ok!(api.check_health().await);
        assert_eq!(body, json!("ok"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = api_for(&format!("http://{addr}"));

        assert!(matches!(api.check_health().await, Err(AppError::Http(_))));
    }

    #[tokio::test]
    async fn download_writes_file() {
        let router = Router::new().route(
            "/api/video/download/{*path}",
            get(|UrlPath(path): UrlPath<String>| async move {
                assert_eq!(path, "output/v1.mp4");
                vec![7u8; 4096]
            }),
        );
        let server = serve(router).await;
        let api = api_for(&server);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("videos").join("v1.mp4");

        let url = api.download_url("output/v1.mp4");
        assert_eq!(url, format!("{server}/api/video/download/output/v1.mp4"));

        let written = assert_ok!(api.download(&url, &dest).await);
        assert_eq!(written, 4096);
        assert_eq!(std::fs::read(&dest).unwrap().len(), 4096);
    }
}
