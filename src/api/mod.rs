mod client;

pub use client::{GenerationApi, HttpGenerationApi};
