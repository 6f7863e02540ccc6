use super::plan::{InterviewPlan, Question, SessionConfig};
use super::state::{Phase, SessionSnapshot, UploadOutcome};
use crate::audio::{AnswerRecorder, CaptureDeviceManager, CaptureStream};
use crate::speech::SpeechPlayback;
use crate::timer::{CountdownTimer, TimerEvent};
use crate::upload::AnswerUploader;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{info, warn};

/// Collaborators the session drives; injectable so tests can script them
#[derive(Clone)]
pub struct SessionDeps {
    pub speech: Arc<dyn SpeechPlayback>,
    pub devices: CaptureDeviceManager,
    pub uploader: Arc<dyn AnswerUploader>,
}

/// Control requests from the surrounding UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Advance,
    Finish,
}

/// How a question's lifecycle ended
enum QuestionEnd {
    Advanced,
    FinishRequested,
}

/// A running interview session
///
/// One driver task sequences every question through the fixed phase order,
/// awaiting each suspension point (device acquisition, playback completion,
/// timer events, recorder finalize, upload resolution) before arming the
/// next, so two questions' lifecycles never interleave. Control commands
/// land on a single channel consumed only at the driver's wait points.
pub struct InterviewSession {
    session_id: String,
    commands: mpsc::Sender<Command>,
    state: Arc<RwLock<SessionSnapshot>>,
    finished_rx: watch::Receiver<bool>,
}

impl InterviewSession {
    /// Spawn the driver task and return the session handle
    pub fn start(plan: InterviewPlan, config: SessionConfig, deps: SessionDeps) -> Arc<Self> {
        let (commands, commands_rx) = mpsc::channel(16);
        let (finished_tx, finished_rx) = watch::channel(false);

        let session_id = plan.session_id.clone();

        let state = Arc::new(RwLock::new(SessionSnapshot {
            session_id: session_id.clone(),
            question_index: 0,
            total_questions: plan.questions.len(),
            phase: Phase::Reading,
            remaining_secs: None,
            upload_outcome: UploadOutcome::Idle,
            started_at: Utc::now(),
            finished: false,
        }));

        let driver = Driver {
            plan,
            config,
            deps,
            state: Arc::clone(&state),
            commands: commands_rx,
            finished: finished_tx,
        };

        tokio::spawn(driver.run());

        Arc::new(Self {
            session_id,
            commands,
            state,
            finished_rx,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Request a jump to the next question; inert while a question is
    /// being read aloud
    pub async fn advance(&self) {
        let _ = self.commands.send(Command::Advance).await;
    }

    /// End the interview from whatever state it is in
    pub async fn finish(&self) {
        let _ = self.commands.send(Command::Finish).await;
    }

    /// Read-only view of the current session state
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    /// Resolves once teardown is complete, regardless of analysis outcome
    pub async fn finished(&self) {
        let mut rx = self.finished_rx.clone();
        // An error means the driver is gone; either way the session is over
        let _ = rx.wait_for(|done| *done).await;
    }
}

struct Driver {
    plan: InterviewPlan,
    config: SessionConfig,
    deps: SessionDeps,
    state: Arc<RwLock<SessionSnapshot>>,
    commands: mpsc::Receiver<Command>,
    finished: watch::Sender<bool>,
}

impl Driver {
    async fn run(mut self) {
        info!(
            "Interview session started: {} ({} questions)",
            self.plan.session_id,
            self.plan.questions.len()
        );

        let total = self.plan.questions.len();

        for idx in 0..total {
            match self.run_question(idx).await {
                QuestionEnd::FinishRequested => break,
                QuestionEnd::Advanced => {
                    let last = idx + 1 == total;
                    if !last {
                        self.update(|s| s.phase = Phase::Advancing).await;
                        if let QuestionEnd::FinishRequested = self.settle().await {
                            break;
                        }
                    }
                }
            }
        }

        self.finish_session().await;
    }

    /// One question's full lifecycle; every exit path releases the streams
    /// it acquired
    async fn run_question(&mut self, idx: usize) -> QuestionEnd {
        let question = self.plan.questions[idx].clone();

        self.update(|s| {
            s.question_index = idx;
            s.phase = Phase::Reading;
            s.upload_outcome = UploadOutcome::Idle;
            s.remaining_secs = None;
        })
        .await;

        // Preview is cosmetic: failure degrades it to nothing
        let mut preview = match self.deps.devices.acquire_preview().await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("Preview unavailable for question {}: {}", question.id, e);
                None
            }
        };

        if let QuestionEnd::FinishRequested = self.read_question(&question).await {
            release(&mut preview).await;
            return QuestionEnd::FinishRequested;
        }

        self.update(|s| s.phase = Phase::RecordingArmed).await;

        let budget = question.recording_budget_secs();

        // Fresh microphone stream per question, independent of the preview.
        // Failure degrades the question: nothing records, the countdown
        // still runs to deadline and the session advances on schedule.
        let mut recording: Option<(AnswerRecorder, CaptureStream)> =
            match self.deps.devices.acquire_microphone().await {
                Ok(mut stream) => match stream.take_frames() {
                    Some(frames) => {
                        let recorder =
                            AnswerRecorder::arm(frames, self.deps.devices.capture_config());
                        Some((recorder, stream))
                    }
                    None => {
                        warn!("Microphone stream had no frame receiver");
                        stream.release().await;
                        None
                    }
                },
                Err(e) => {
                    warn!(
                        "Microphone unavailable for question {}; recording nothing: {}",
                        question.id, e
                    );
                    None
                }
            };

        let mut countdown = CountdownTimer::start(budget);

        self.update(|s| {
            s.phase = Phase::Recording;
            s.remaining_secs = Some(budget);
        })
        .await;

        // First of deadline, advance, or finish wins
        let mut finish_requested = false;
        loop {
            tokio::select! {
                event = countdown.next_event() => match event {
                    Some(TimerEvent::Tick(remaining)) => {
                        self.update(|s| s.remaining_secs = Some(remaining)).await;
                    }
                    Some(TimerEvent::Deadline) | None => break,
                },
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Advance) => break,
                    Some(Command::Finish) | None => {
                        finish_requested = true;
                        break;
                    }
                },
            }
        }
        countdown.cancel();

        self.update(|s| {
            s.phase = Phase::Stopping;
            s.remaining_secs = None;
        })
        .await;

        // The artifact is only available after the recorder drains; the
        // stream is torn down afterwards, here, not by the recorder
        let artifact = match recording.take() {
            Some((recorder, mut stream)) => {
                let artifact = recorder.stop().await;
                stream.release().await;
                artifact
            }
            None => None,
        };

        release(&mut preview).await;

        match artifact {
            Some(artifact) => {
                self.update(|s| {
                    s.phase = Phase::Uploading;
                    s.upload_outcome = UploadOutcome::Uploading;
                })
                .await;

                let outcome = self
                    .deps
                    .uploader
                    .upload(&self.plan.session_id, &question.id, &artifact)
                    .await;

                self.update(|s| s.upload_outcome = outcome).await;
            }
            // Degraded mode: no artifact, no upload attempt
            None => {}
        }

        if finish_requested {
            QuestionEnd::FinishRequested
        } else {
            QuestionEnd::Advanced
        }
    }

    /// Reading phase: wait for playback completion. Advance requests are
    /// discarded, not queued; finish is honored immediately. A bounded
    /// allowance keeps a hung speech engine from stalling the question.
    async fn read_question(&mut self, question: &Question) -> QuestionEnd {
        let speech = Arc::clone(&self.deps.speech);
        let text = question.text.clone();
        let mut speak_task = tokio::spawn(async move { speech.speak(&text).await });

        let allowance = reading_allowance(&question.text, self.config.reading_cap);
        let fallback = tokio::time::sleep(allowance);
        tokio::pin!(fallback);

        loop {
            tokio::select! {
                result = &mut speak_task => {
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            warn!("Question playback failed; continuing: {:#}", e);
                        }
                        Err(e) => warn!("Playback task failed: {}", e),
                    }
                    return QuestionEnd::Advanced;
                }
                _ = &mut fallback => {
                    warn!(
                        "Playback never completed within {:?} for question {}; continuing",
                        allowance, question.id
                    );
                    self.deps.speech.cancel();
                    speak_task.abort();
                    return QuestionEnd::Advanced;
                }
                cmd = self.commands.recv() => match cmd {
                    // Control is disabled while Reading; nothing is queued
                    Some(Command::Advance) => continue,
                    Some(Command::Finish) | None => {
                        self.deps.speech.cancel();
                        speak_task.abort();
                        return QuestionEnd::FinishRequested;
                    }
                },
            }
        }
    }

    /// Brief pause between a question's outcome and the next Reading phase
    async fn settle(&mut self) -> QuestionEnd {
        let delay = tokio::time::sleep(self.config.settle_delay);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return QuestionEnd::Advanced,
                cmd = self.commands.recv() => match cmd {
                    // Already advancing; extra requests are meaningless
                    Some(Command::Advance) => continue,
                    Some(Command::Finish) | None => return QuestionEnd::FinishRequested,
                },
            }
        }
    }

    /// Unconditional teardown: every stream is already released by the
    /// question scope that acquired it, so only playback and the analysis
    /// boundary remain
    async fn finish_session(&mut self) {
        self.update(|s| s.phase = Phase::Finishing).await;

        self.deps.speech.cancel();

        if let Err(e) = self
            .deps
            .uploader
            .request_analysis(&self.plan.session_id)
            .await
        {
            warn!(
                "Session analysis request failed; leaving the interview anyway: {:#}",
                e
            );
        }

        self.update(|s| {
            s.phase = Phase::Finished;
            s.finished = true;
        })
        .await;

        let _ = self.finished.send(true);

        info!("Interview session finished: {}", self.plan.session_id);
    }

    async fn update(&self, apply: impl FnOnce(&mut SessionSnapshot)) {
        let mut state = self.state.write().await;
        apply(&mut state);
    }
}

async fn release(stream: &mut Option<CaptureStream>) {
    if let Some(mut stream) = stream.take() {
        stream.release().await;
    }
}

/// Upper bound on how long Reading may wait for playback completion,
/// scaled to the question length plus synthesis slack
fn reading_allowance(text: &str, cap: Duration) -> Duration {
    let words = text.split_whitespace().count().max(1) as u64;
    Duration::from_millis(5000 + words * 500).min(cap)
}
