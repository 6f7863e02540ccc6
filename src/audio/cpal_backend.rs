use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleRate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};
use super::devices::DeviceError;

/// Capture backend for the default input device via cpal
///
/// cpal streams are not `Send`, so the stream lives on a dedicated thread;
/// frames cross back over a tokio channel. The audio callback never blocks:
/// frames are dropped (not queued) when the receiver falls behind.
pub struct CpalBackend {
    source: CaptureSource,
    config: CaptureConfig,
    stop: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl CpalBackend {
    pub fn new(source: CaptureSource, config: CaptureConfig) -> Self {
        Self {
            source,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        // Unreleased stream: let the worker thread wind down on its own
        self.stop.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CaptureBackend for CpalBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.worker.is_some() {
            bail!("capture already started");
        }

        self.stop.store(false, Ordering::SeqCst);

        let (frame_tx, frame_rx) = mpsc::channel(128);
        let (ready_tx, ready_rx) = oneshot::channel();

        let config = self.config.clone();
        let source = self.source;
        let stop = Arc::clone(&self.stop);

        let worker = std::thread::Builder::new()
            .name("vivavoce-capture".to_string())
            .spawn(move || capture_thread(source, config, frame_tx, ready_tx, stop))
            .context("Failed to spawn capture thread")?;

        self.worker = Some(worker);

        match ready_rx.await {
            Ok(Ok(())) => Ok(frame_rx),
            Ok(Err(msg)) => {
                self.worker = None;
                bail!("Failed to open input stream: {}", msg)
            }
            Err(_) => {
                self.worker = None;
                bail!("Capture thread exited before startup")
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || {
                let _ = worker.join();
            })
            .await
            .context("Capture thread join failed")?;
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.worker.is_some()
    }

    fn name(&self) -> &str {
        "cpal-input"
    }
}

fn capture_thread(
    source: CaptureSource,
    config: CaptureConfig,
    frame_tx: mpsc::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<std::result::Result<(), String>>,
    stop: Arc<AtomicBool>,
) {
    let setup = open_input_stream(source, &config, frame_tx);

    match setup {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            while !stop.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            drop(stream);
            debug!("{:?} capture stream closed", source);
        }
        Err(msg) => {
            let _ = ready_tx.send(Err(msg));
        }
    }
}

fn open_input_stream(
    source: CaptureSource,
    config: &CaptureConfig,
    frame_tx: mpsc::Sender<AudioFrame>,
) -> std::result::Result<cpal::Stream, String> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| "no input device available".to_string())?;

    let rate = config.target_sample_rate;
    let channels = config.target_channels;

    let supported = device
        .supported_input_configs()
        .map_err(|e| e.to_string())?
        .find(|c| {
            c.channels() == channels
                && c.min_sample_rate() <= SampleRate(rate)
                && c.max_sample_rate() >= SampleRate(rate)
        })
        .ok_or_else(|| format!("no input config for {}Hz/{}ch", rate, channels))?;

    let stream_config = supported.with_sample_rate(SampleRate(rate)).config();

    debug!(
        "{:?} capture on {} ({}Hz, {}ch)",
        source,
        device.name().unwrap_or_default(),
        rate,
        channels
    );

    let mut samples_seen: u64 = 0;

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data
                    .iter()
                    .map(|s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
                    .collect();

                let timestamp_ms = samples_seen * 1000 / (u64::from(rate) * u64::from(channels));
                samples_seen += data.len() as u64;

                let frame = AudioFrame {
                    samples,
                    sample_rate: rate,
                    channels,
                    timestamp_ms,
                };

                // Receiver backlogged or gone; drop the frame rather than block
                let _ = frame_tx.try_send(frame);
            },
            move |err| {
                error!("{:?} capture stream error: {}", source, err);
            },
            None,
        )
        .map_err(|e| e.to_string())?;

    stream.play().map_err(|e| e.to_string())?;

    Ok(stream)
}

/// Production factory: every stream kind maps to the default input device
pub struct CpalCaptureFactory;

impl CaptureBackendFactory for CpalCaptureFactory {
    fn create(
        &self,
        source: CaptureSource,
        config: &CaptureConfig,
    ) -> std::result::Result<Box<dyn CaptureBackend>, DeviceError> {
        let host = cpal::default_host();
        if host.default_input_device().is_none() {
            return Err(DeviceError::NoDevice);
        }

        Ok(Box::new(CpalBackend::new(source, config.clone())))
    }
}
