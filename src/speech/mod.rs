//! Spoken question playback
//!
//! This module turns a question's text into audible speech:
//! - `TtsClient` synthesizes PCM over HTTP
//! - `SpeakerSink` plays PCM on the default output device
//! - `SpeechPlayback` is the seam the session orchestrator drives

pub mod engine;
pub mod playback;
pub mod tts;

pub use engine::{SpeechPlayback, SpokenQuestionReader};
pub use playback::SpeakerSink;
pub use tts::{TtsClient, TTS_SAMPLE_RATE};
