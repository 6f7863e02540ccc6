// Scripted collaborators for driving an InterviewSession without real
// devices, speakers, or a backend.

#![allow(dead_code)]

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use vivavoce::audio::{
    AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureDeviceManager,
    CaptureSource, DeviceError,
};
use vivavoce::audio::AnswerArtifact;
use vivavoce::session::{InterviewPlan, Question, SessionDeps, UploadOutcome};
use vivavoce::speech::SpeechPlayback;
use vivavoce::upload::AnswerUploader;

// ============================================================================
// Speech
// ============================================================================

/// Speech that records what it was asked to say and completes after a
/// simulated delay
pub struct ScriptedSpeech {
    pub delay: Duration,
    pub spoken: Mutex<Vec<String>>,
    pub cancels: AtomicUsize,
}

impl ScriptedSpeech {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
        })
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SpeechPlayback for ScriptedSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Speech that blocks until the test releases it (or never)
pub struct GatedSpeech {
    pub gate: watch::Receiver<bool>,
    pub spoken: Mutex<Vec<String>>,
    pub cancels: AtomicUsize,
}

impl GatedSpeech {
    pub fn new() -> (Arc<Self>, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let speech = Arc::new(Self {
            gate: rx,
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
        });
        (speech, tx)
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SpeechPlayback for GatedSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        let mut gate = self.gate.clone();
        let _ = gate.wait_for(|open| *open).await;
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Capture devices
// ============================================================================

/// Factory producing scripted capture streams, or device failures on demand
pub struct ScriptedCaptureFactory {
    pub fail_preview: bool,
    pub fail_microphone: bool,
    /// Frames each stream emits as soon as it starts
    pub frames_per_stream: usize,
    pub preview_acquired: AtomicUsize,
    pub microphone_acquired: AtomicUsize,
}

impl ScriptedCaptureFactory {
    pub fn working(frames_per_stream: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_preview: false,
            fail_microphone: false,
            frames_per_stream,
            preview_acquired: AtomicUsize::new(0),
            microphone_acquired: AtomicUsize::new(0),
        })
    }

    pub fn without_microphone() -> Arc<Self> {
        Arc::new(Self {
            fail_preview: false,
            fail_microphone: true,
            frames_per_stream: 0,
            preview_acquired: AtomicUsize::new(0),
            microphone_acquired: AtomicUsize::new(0),
        })
    }

    pub fn preview_count(&self) -> usize {
        self.preview_acquired.load(Ordering::SeqCst)
    }

    pub fn microphone_count(&self) -> usize {
        self.microphone_acquired.load(Ordering::SeqCst)
    }
}

impl CaptureBackendFactory for ScriptedCaptureFactory {
    fn create(
        &self,
        source: CaptureSource,
        config: &CaptureConfig,
    ) -> Result<Box<dyn CaptureBackend>, DeviceError> {
        match source {
            CaptureSource::Preview => {
                if self.fail_preview {
                    return Err(DeviceError::NoDevice);
                }
                self.preview_acquired.fetch_add(1, Ordering::SeqCst);
            }
            CaptureSource::Microphone => {
                if self.fail_microphone {
                    return Err(DeviceError::NoDevice);
                }
                self.microphone_acquired.fetch_add(1, Ordering::SeqCst);
            }
        }

        Ok(Box::new(ScriptedBackend {
            frames_to_emit: self.frames_per_stream,
            config: config.clone(),
            frame_tx: None,
        }))
    }
}

/// Backend that emits a fixed number of frames immediately, then keeps the
/// stream open until stopped
pub struct ScriptedBackend {
    frames_to_emit: usize,
    config: CaptureConfig,
    frame_tx: Option<mpsc::Sender<AudioFrame>>,
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(self.frames_to_emit.max(1));

        for i in 0..self.frames_to_emit {
            let frame = AudioFrame {
                samples: vec![i as i16; 4],
                sample_rate: self.config.target_sample_rate,
                channels: self.config.target_channels,
                timestamp_ms: (i as u64) * 100,
            };
            let _ = tx.try_send(frame);
        }

        self.frame_tx = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.frame_tx = None;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.frame_tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Uploads
// ============================================================================

/// One recorded upload call
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub session_id: String,
    pub question_id: String,
    pub sample_count: usize,
}

/// Uploader that records every call and resolves to a fixed outcome
pub struct RecordingUploader {
    pub outcome: UploadOutcome,
    pub uploads: Mutex<Vec<UploadRecord>>,
    pub analyses: Mutex<Vec<String>>,
    pub fail_analysis: bool,
}

impl RecordingUploader {
    pub fn with_outcome(outcome: UploadOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            uploads: Mutex::new(Vec::new()),
            analyses: Mutex::new(Vec::new()),
            fail_analysis: false,
        })
    }

    pub fn failing_analysis() -> Arc<Self> {
        Arc::new(Self {
            outcome: UploadOutcome::Success,
            uploads: Mutex::new(Vec::new()),
            analyses: Mutex::new(Vec::new()),
            fail_analysis: true,
        })
    }

    pub fn upload_records(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn analysis_requests(&self) -> Vec<String> {
        self.analyses.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AnswerUploader for RecordingUploader {
    async fn upload(
        &self,
        session_id: &str,
        question_id: &str,
        artifact: &AnswerArtifact,
    ) -> UploadOutcome {
        self.uploads.lock().unwrap().push(UploadRecord {
            session_id: session_id.to_string(),
            question_id: question_id.to_string(),
            sample_count: artifact.sample_count,
        });
        self.outcome
    }

    async fn request_analysis(&self, session_id: &str) -> Result<()> {
        self.analyses.lock().unwrap().push(session_id.to_string());
        if self.fail_analysis {
            anyhow::bail!("analysis backend unavailable");
        }
        Ok(())
    }
}

// ============================================================================
// Assembly
// ============================================================================

pub fn deps(
    speech: Arc<dyn SpeechPlayback>,
    factory: Arc<ScriptedCaptureFactory>,
    uploader: Arc<RecordingUploader>,
) -> SessionDeps {
    SessionDeps {
        speech,
        devices: CaptureDeviceManager::new(factory, CaptureConfig::default()),
        uploader,
    }
}

pub fn question(id: &str, text: &str, estimated_seconds: Option<u32>) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        estimated_seconds,
    }
}

pub fn plan(session_id: &str, questions: Vec<Question>) -> InterviewPlan {
    InterviewPlan {
        session_id: session_id.to_string(),
        questions,
    }
}
