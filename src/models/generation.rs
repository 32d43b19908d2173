use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which backend contract a submit goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    /// Content generation followed by video generation.
    #[default]
    Chained,
    /// One combined call to the generate_video endpoint.
    Single,
}

/// Output of the content-generation call, sent back unchanged as the body of
/// the video-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentResult {
    pub content: serde_json::Value,
    pub presentation_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoResult {
    pub video_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SingleVideoResult {
    pub message: String,
    pub video_url: String,
}

/// What the result view shows once a pipeline completes.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub video_url: String,
    pub video_path: Option<String>,
    pub message: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl GenerationOutcome {
    /// File name to use when saving the video locally.
    pub fn file_name(&self) -> String {
        let source = self.video_path.as_deref().unwrap_or(&self.video_url);
        let source = source.split(['?', '#']).next().unwrap_or_default();
        source
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("video.mp4")
            .to_string()
    }
}
