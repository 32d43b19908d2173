use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::api::{GenerationApi, HttpGenerationApi};
use crate::config::Config;
use crate::error::Result;
use crate::models::{parse_duration, DetailLevel, FlowMode, GenerationOutcome, GenerationRequest};
use crate::pipeline::{Pipeline, PipelineEvent, PROGRESS_STARTED};
use crate::tui::{AppAction, InputMode};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Which screen is visible. Exactly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Form,
    InProgress { progress: u16 },
    Done(GenerationOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Topic,
    Duration,
    DetailLevel,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Topic => FormField::Duration,
            FormField::Duration => FormField::DetailLevel,
            FormField::DetailLevel => FormField::Topic,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Topic => FormField::DetailLevel,
            FormField::Duration => FormField::Topic,
            FormField::DetailLevel => FormField::Duration,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub topic: String,
    pub duration: String,
    pub detail_level: DetailLevel,
    pub focus: FormField,
}

impl FormState {
    pub fn reset(&mut self) {
        *self = FormState::default();
    }

    pub fn to_request(&self) -> Result<GenerationRequest> {
        Ok(GenerationRequest {
            topic: self.topic.clone(),
            duration: parse_duration(&self.duration)?,
            detail_level: self.detail_level,
        })
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Topic => Some(&mut self.topic),
            FormField::Duration => Some(&mut self.duration),
            FormField::DetailLevel => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Idle,
    Downloading,
    Saved(PathBuf),
    Failed,
}

// Message for a finished download
struct DownloadResult {
    download_id: u64,
    result: std::result::Result<PathBuf, String>,
}

pub struct App {
    // UI State
    pub view: View,
    pub form: FormState,
    pub alert: Option<String>,
    pub show_help: bool,
    pub download_status: DownloadStatus,
    download_id: u64,
    spinner_frame: usize,

    // Settings
    pub flow: FlowMode,
    pub backend_url: String,
    download_dir: PathBuf,

    // Async state
    pipeline_rx: mpsc::Receiver<PipelineEvent>,
    pipeline_tx: mpsc::Sender<PipelineEvent>,
    health_rx: mpsc::Receiver<std::result::Result<Value, String>>,
    health_tx: mpsc::Sender<std::result::Result<Value, String>>,
    download_rx: mpsc::Receiver<DownloadResult>,
    download_tx: mpsc::Sender<DownloadResult>,

    // Services
    api: Arc<dyn GenerationApi>,
    pipeline: Arc<Pipeline>,
    health_url: String,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let api = Arc::new(HttpGenerationApi::new(config)?);
        Ok(Self::with_api(config, api))
    }

    pub fn with_api(config: &Config, api: Arc<dyn GenerationApi>) -> Self {
        let pipeline = Arc::new(Pipeline::new(
            Arc::clone(&api),
            config.flow,
            config.completion_delay(),
        ));

        let backend_url = match config.flow {
            FlowMode::Chained => config.api_base_url.clone(),
            FlowMode::Single => config.single_endpoint_url.clone(),
        };

        let (pipeline_tx, pipeline_rx) = mpsc::channel(16);
        let (health_tx, health_rx) = mpsc::channel(1);
        let (download_tx, download_rx) = mpsc::channel(1);

        Self {
            view: View::Form,
            form: FormState::default(),
            alert: None,
            show_help: false,
            download_status: DownloadStatus::Idle,
            download_id: 0,
            spinner_frame: 0,
            flow: config.flow,
            backend_url,
            download_dir: PathBuf::from(&config.download_dir),
            pipeline_rx,
            pipeline_tx,
            health_rx,
            health_tx,
            download_rx,
            download_tx,
            api,
            pipeline,
            health_url: config.health_url.clone(),
        }
    }

    /// Current progress bar fraction in percent.
    pub fn progress(&self) -> u16 {
        match self.view {
            View::Form => 0,
            View::InProgress { progress } => progress,
            View::Done(_) => 100,
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        match &self.view {
            View::Done(outcome) => Some(outcome.video_url.as_str()),
            _ => None,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.alert.is_some() {
            return InputMode::Alert;
        }
        if self.show_help {
            return InputMode::Help;
        }
        match self.view {
            View::Form if self.form.focus == FormField::DetailLevel => InputMode::FormChoice,
            View::Form => InputMode::FormText,
            View::InProgress { .. } => InputMode::Busy,
            View::Done(_) => InputMode::Result,
        }
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    pub fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::NextField => self.form.focus = self.form.focus.next(),
            AppAction::PrevField => self.form.focus = self.form.focus.prev(),

            AppAction::InputChar(c) => {
                if let Some(text) = self.form.focused_text() {
                    text.push(c);
                }
            }

            AppAction::InputBackspace => {
                if let Some(text) = self.form.focused_text() {
                    text.pop();
                }
            }

            AppAction::NextLevel => self.form.detail_level = self.form.detail_level.next(),
            AppAction::PrevLevel => self.form.detail_level = self.form.detail_level.prev(),

            AppAction::Submit => self.submit(),

            AppAction::OpenVideo => {
                if let Some(url) = self.video_url() {
                    let url = url.to_string();
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Failed to open {}: {}", url, e);
                        self.alert = Some(format!("Error: could not open {url}: {e}"));
                    }
                }
            }

            AppAction::DownloadVideo => self.start_download(),

            AppAction::NewVideo => {
                if matches!(self.view, View::Done(_)) {
                    self.reset_ui();
                }
            }

            AppAction::DismissAlert => self.alert = None,
            AppAction::ShowHelp => self.show_help = true,
            AppAction::HideHelp => self.show_help = false,
        }

        Ok(false)
    }

    fn submit(&mut self) {
        if matches!(self.view, View::InProgress { .. }) {
            tracing::debug!("Ignoring submit while a generation is in flight");
            return;
        }

        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.alert = Some(format!("Error: {e}"));
                return;
            }
        };

        let progress = match self.flow {
            FlowMode::Chained => PROGRESS_STARTED,
            FlowMode::Single => 0,
        };
        self.view = View::InProgress { progress };
        self.download_status = DownloadStatus::Idle;

        tracing::info!(
            topic = %request.topic,
            duration = request.duration,
            level = request.detail_level.as_str(),
            "Starting video generation"
        );
        self.pipeline.spawn(request, self.pipeline_tx.clone());
    }

    /// Back to the empty form with no video bound and the progress at zero.
    pub fn reset_ui(&mut self) {
        self.view = View::Form;
        self.form.reset();
        self.download_status = DownloadStatus::Idle;
    }

    /// Poll for pipeline progress and completion (non-blocking)
    pub fn poll_pipeline_events(&mut self) {
        while let Ok(event) = self.pipeline_rx.try_recv() {
            match event {
                PipelineEvent::Progress(progress) => {
                    if let View::InProgress { progress: current } = &mut self.view {
                        *current = progress;
                    }
                }
                PipelineEvent::Completed(outcome) => {
                    tracing::info!("Video ready at {}", outcome.video_url);
                    self.view = View::Done(outcome);
                }
                PipelineEvent::Failed(message) => {
                    self.alert = Some(format!("Error: {message}"));
                    self.reset_ui();
                }
            }
        }
    }

    /// Ping the backend once in the background. Never blocks the UI.
    pub fn start_health_check(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.health_tx.clone();

        tokio::spawn(async move {
            let result = api.check_health().await.map_err(|e| e.to_string());
            let _ = tx.send(result).await;
        });
    }

    pub fn poll_health_result(&mut self) {
        if let Ok(result) = self.health_rx.try_recv() {
            match result {
                Ok(body) => tracing::info!("API is healthy: {}", body),
                Err(e) => {
                    tracing::warn!("API health check failed: {}", e);
                    if self.alert.is_none() {
                        self.alert = Some(format!(
                            "Cannot connect to the backend server at {}. Please make sure it is running.",
                            self.health_url
                        ));
                    }
                }
            }
        }
    }

    fn start_download(&mut self) {
        let View::Done(outcome) = &self.view else {
            return;
        };
        if self.download_status == DownloadStatus::Downloading {
            return;
        }

        let url = outcome.video_url.clone();
        let dest = self.download_dir.join(outcome.file_name());
        self.download_status = DownloadStatus::Downloading;
        self.download_id += 1;
        let download_id = self.download_id;

        let api = Arc::clone(&self.api);
        let tx = self.download_tx.clone();

        tokio::spawn(async move {
            let result = match api.download(&url, &dest).await {
                Ok(_) => Ok(dest),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(DownloadResult { download_id, result }).await;
        });
    }

    pub fn poll_download_result(&mut self) {
        while let Ok(download) = self.download_rx.try_recv() {
            // Results from a download started before the last reset are stale
            if download.download_id != self.download_id
                || self.download_status != DownloadStatus::Downloading
            {
                tracing::debug!("Dropping stale download result");
                continue;
            }
            match download.result {
                Ok(path) => self.download_status = DownloadStatus::Saved(path),
                Err(e) => {
                    tracing::error!("Failed to download video: {}", e);
                    self.download_status = DownloadStatus::Failed;
                    self.alert = Some(format!("Error: {e}"));
                }
            }
        }
    }
}
