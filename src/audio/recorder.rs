use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::Path;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureConfig};

/// Upper bound on buffered audio; frames past this are dropped with a warning
pub const MAX_RECORDING_SECS: u64 = 1800;

/// Finalized answer recording for one question (WAV, in memory)
#[derive(Debug, Clone)]
pub struct AnswerArtifact {
    /// Encoded WAV bytes
    pub wav: Vec<u8>,
    /// Total samples across all captured frames
    pub sample_count: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

impl AnswerArtifact {
    pub fn duration_secs(&self) -> f64 {
        self.sample_count as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Write the WAV blob to disk
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.wav)
            .with_context(|| format!("Failed to write artifact to {:?}", path))
    }
}

/// Buffers capture frames for one answer until stopped
///
/// Frames are kept in arrival order and concatenated at finalize time; the
/// produced artifact contains every buffered chunk exactly once, in order.
/// The recorder does not release the underlying stream; the session tears
/// the stream down after the artifact is finalized.
pub struct AnswerRecorder {
    stop_tx: Option<oneshot::Sender<()>>,
    buffer_task: JoinHandle<Vec<AudioFrame>>,
    sample_rate: u32,
    channels: u16,
}

impl AnswerRecorder {
    /// Arm the recorder on a capture stream's frame receiver
    pub fn arm(frames: mpsc::Receiver<AudioFrame>, config: &CaptureConfig) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();

        let sample_rate = config.target_sample_rate;
        let channels = config.target_channels;
        let max_samples = MAX_RECORDING_SECS * u64::from(sample_rate) * u64::from(channels);

        let buffer_task = tokio::spawn(buffer_frames(frames, stop_rx, max_samples));

        Self {
            stop_tx: Some(stop_tx),
            buffer_task,
            sample_rate,
            channels,
        }
    }

    /// Stop buffering and finalize the artifact
    ///
    /// Asynchronous: the artifact is available only after the buffering task
    /// drains and the WAV blob is encoded. A recorder that was armed always
    /// yields an artifact, possibly with zero captured samples.
    pub async fn stop(mut self) -> Option<AnswerArtifact> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        let frames = match self.buffer_task.await {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Recorder buffer task failed: {}", e);
                return None;
            }
        };

        match finalize(frames, self.sample_rate, self.channels) {
            Ok(artifact) => {
                info!(
                    "Answer finalized: {} samples ({:.1}s)",
                    artifact.sample_count,
                    artifact.duration_secs()
                );
                Some(artifact)
            }
            Err(e) => {
                warn!("Failed to finalize answer artifact: {}", e);
                None
            }
        }
    }
}

async fn buffer_frames(
    mut frames: mpsc::Receiver<AudioFrame>,
    mut stop_rx: oneshot::Receiver<()>,
    max_samples: u64,
) -> Vec<AudioFrame> {
    let mut buffer = FrameBuffer::new(max_samples);

    loop {
        tokio::select! {
            maybe = frames.recv() => match maybe {
                Some(frame) => buffer.push(frame),
                // Stream ended (device released or backend stopped)
                None => return buffer.frames,
            },
            _ = &mut stop_rx => break,
        }
    }

    // Flush chunks already delivered before the stop signal; nothing that
    // arrived may be dropped
    while let Ok(frame) = frames.try_recv() {
        buffer.push(frame);
    }

    buffer.frames
}

struct FrameBuffer {
    frames: Vec<AudioFrame>,
    sample_total: u64,
    max_samples: u64,
    capped: bool,
}

impl FrameBuffer {
    fn new(max_samples: u64) -> Self {
        Self {
            frames: Vec::new(),
            sample_total: 0,
            max_samples,
            capped: false,
        }
    }

    fn push(&mut self, frame: AudioFrame) {
        if self.sample_total + frame.samples.len() as u64 > self.max_samples {
            if !self.capped {
                self.capped = true;
                warn!(
                    "Recording exceeded {}s; dropping further frames",
                    MAX_RECORDING_SECS
                );
            }
            return;
        }
        self.sample_total += frame.samples.len() as u64;
        self.frames.push(frame);
    }
}

/// Concatenate frames in arrival order into a WAV blob
fn finalize(frames: Vec<AudioFrame>, sample_rate: u32, channels: u16) -> Result<AnswerArtifact> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut sample_count = 0usize;

    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .context("Failed to create WAV writer")?;

        for frame in &frames {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            sample_count += frame.samples.len();
        }

        writer.finalize().context("Failed to finalize WAV blob")?;
    }

    Ok(AnswerArtifact {
        wav: cursor.into_inner(),
        sample_count,
        sample_rate,
        channels,
    })
}
