use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::api::GenerationApi;
use crate::error::Result;
use crate::models::{FlowMode, GenerationOutcome, GenerationRequest};

pub const PROGRESS_STARTED: u16 = 30;
pub const PROGRESS_CONTENT_READY: u16 = 60;
pub const PROGRESS_COMPLETE: u16 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Progress(u16),
    Completed(GenerationOutcome),
    Failed(String),
}

/// Submit → await → render-or-alert, for either backend flow.
pub struct Pipeline {
    api: Arc<dyn GenerationApi>,
    flow: FlowMode,
    completion_delay: Duration,
}

impl Pipeline {
    pub fn new(api: Arc<dyn GenerationApi>, flow: FlowMode, completion_delay: Duration) -> Self {
        Self {
            api,
            flow,
            completion_delay,
        }
    }

    /// Run one request to completion. Every failure ends up as a single
    /// `Failed` event; nothing is retried.
    pub async fn run(&self, request: GenerationRequest, events: &mpsc::Sender<PipelineEvent>) {
        let event = match self.execute(request, events).await {
            Ok(outcome) => PipelineEvent::Completed(outcome),
            Err(e) => {
                tracing::error!("Video generation failed: {}", e);
                PipelineEvent::Failed(e.to_string())
            }
        };
        let _ = events.send(event).await;
    }

    /// Start `run` on a background task.
    pub fn spawn(self: &Arc<Self>, request: GenerationRequest, events: mpsc::Sender<PipelineEvent>) {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.run(request, &events).await;
        });
    }

    async fn execute(
        &self,
        request: GenerationRequest,
        events: &mpsc::Sender<PipelineEvent>,
    ) -> Result<GenerationOutcome> {
        match self.flow {
            FlowMode::Chained => self.execute_chained(request, events).await,
            FlowMode::Single => self.execute_single(request).await,
        }
    }

    async fn execute_chained(
        &self,
        request: GenerationRequest,
        events: &mpsc::Sender<PipelineEvent>,
    ) -> Result<GenerationOutcome> {
        let _ = events.send(PipelineEvent::Progress(PROGRESS_STARTED)).await;
        let content = self.api.generate_content(&request).await?;

        let _ = events.send(PipelineEvent::Progress(PROGRESS_CONTENT_READY)).await;
        let video = self.api.generate_video(&content).await?;

        let _ = events.send(PipelineEvent::Progress(PROGRESS_COMPLETE)).await;
        if !self.completion_delay.is_zero() {
            tokio::time::sleep(self.completion_delay).await;
        }

        Ok(GenerationOutcome {
            video_url: self.api.download_url(&video.video_path),
            video_path: Some(video.video_path),
            message: None,
            completed_at: Utc::now(),
        })
    }

    async fn execute_single(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let result = self.api.generate_single(&request).await?;

        Ok(GenerationOutcome {
            video_url: result.video_url,
            video_path: None,
            message: Some(result.message),
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::api::GenerationApi;
    use crate::error::{AppError, Result};
    use crate::models::{ContentResult, GenerationRequest, SingleVideoResult, VideoResult};

    pub const BASE_URL: &str = "http://localhost:5000/api";

    /// In-memory backend that records the order of calls it receives.
    #[derive(Default)]
    pub struct FakeApi {
        pub content_error: Option<String>,
        pub video_error: Option<String>,
        pub single_error: Option<String>,
        pub health_error: Option<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    fn fail(message: &Option<String>) -> Result<()> {
        match message {
            Some(m) => Err(AppError::Api(m.clone())),
            None => Ok(()),
        }
    }

    #[async_trait]
    impl GenerationApi for FakeApi {
        async fn generate_content(&self, request: &GenerationRequest) -> Result<ContentResult> {
            self.record(&format!("content:{}", request.topic));
            fail(&self.content_error)?;
            Ok(ContentResult {
                content: json!("..."),
                presentation_path: "p1".to_string(),
            })
        }

        async fn generate_video(&self, content: &ContentResult) -> Result<VideoResult> {
            self.record(&format!("video:{}", content.presentation_path));
            fail(&self.video_error)?;
            Ok(VideoResult {
                video_path: "v1.mp4".to_string(),
            })
        }

        async fn generate_single(&self, request: &GenerationRequest) -> Result<SingleVideoResult> {
            self.record(&format!("single:{}", request.topic));
            fail(&self.single_error)?;
            Ok(SingleVideoResult {
                message: "Video generated successfully!".to_string(),
                video_url: "http://127.0.0.1:8000/data/output/Math.mp4".to_string(),
            })
        }

        async fn check_health(&self) -> Result<Value> {
            self.record("health");
            fail(&self.health_error)?;
            Ok(json!({ "status": "healthy" }))
        }

        async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
            self.record(&format!("download:{url}"));
            tokio::fs::write(dest, b"video").await?;
            Ok(5)
        }

        fn download_url(&self, video_path: &str) -> String {
            format!("{BASE_URL}/video/download/{video_path}")
        }
    }
}
