use anyhow::{Context, Result};

use super::playback::SpeakerSink;
use super::tts::{TtsClient, TTS_SAMPLE_RATE};

/// Reads one question aloud and reports completion
///
/// At most one playback is active at a time; the session state machine
/// never overlaps utterances, and `cancel` interrupts the current one.
/// After `cancel` returns, the pending `speak` resolves promptly and its
/// completion is not acted on by the caller.
#[async_trait::async_trait]
pub trait SpeechPlayback: Send + Sync {
    /// Speak the text; resolves when the utterance has finished playing
    async fn speak(&self, text: &str) -> Result<()>;

    /// Interrupt the current utterance, if any
    fn cancel(&self);
}

/// Production reader: synthesize over HTTP, play through the speakers
pub struct SpokenQuestionReader {
    tts: TtsClient,
    sink: SpeakerSink,
}

impl SpokenQuestionReader {
    pub fn new(tts: TtsClient) -> Self {
        Self {
            tts,
            sink: SpeakerSink::new(),
        }
    }
}

#[async_trait::async_trait]
impl SpeechPlayback for SpokenQuestionReader {
    async fn speak(&self, text: &str) -> Result<()> {
        let pcm = self
            .tts
            .synthesize(text)
            .await
            .context("Question synthesis failed")?;

        self.sink.play(pcm, TTS_SAMPLE_RATE).await
    }

    fn cancel(&self) {
        self.sink.cancel();
    }
}
