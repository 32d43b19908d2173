mod generation;
mod request;

pub use generation::{ContentResult, FlowMode, GenerationOutcome, SingleVideoResult, VideoResult};
pub use request::{parse_duration, DetailLevel, GenerationRequest};
