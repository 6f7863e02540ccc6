use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleRate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Plays synthesized PCM to the default output device
///
/// Cancellation is cooperative: `cancel` flips a stop flag that the playback
/// loop observes within one poll interval, after which no completion is
/// reported for the cancelled utterance.
pub struct SpeakerSink {
    stop: Arc<AtomicBool>,
}

impl SpeakerSink {
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Interrupt the current utterance, if any
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Play mono i16 samples to completion (or cancellation)
    pub async fn play(&self, samples: Vec<i16>, sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        self.stop.store(false, Ordering::SeqCst);
        let stop = Arc::clone(&self.stop);

        tokio::task::spawn_blocking(move || play_blocking(samples, sample_rate, stop))
            .await
            .context("Playback task failed")?
    }
}

impl Default for SpeakerSink {
    fn default() -> Self {
        Self::new()
    }
}

fn play_blocking(samples: Vec<i16>, sample_rate: u32, stop: Arc<AtomicBool>) -> Result<()> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no output device available"))?;

    let supported = device
        .supported_output_configs()
        .context("Failed to enumerate output configs")?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .or_else(|| {
            // Fallback: stereo output, same sample duplicated per channel
            device.supported_output_configs().ok()?.find(|c| {
                c.channels() == 2
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
        })
        .ok_or_else(|| anyhow!("no suitable output config found"))?;

    let config = supported.with_sample_rate(SampleRate(sample_rate)).config();
    let channels = config.channels as usize;

    let sample_count = samples.len();
    let samples = Arc::new(samples);
    let position = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let samples_cb = Arc::clone(&samples);
    let position_cb = Arc::clone(&position);
    let finished_cb = Arc::clone(&finished);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let pos = position_cb.load(Ordering::Relaxed);
                    let sample = if pos < samples_cb.len() {
                        position_cb.store(pos + 1, Ordering::Relaxed);
                        f32::from(samples_cb[pos]) / 32768.0
                    } else {
                        finished_cb.store(true, Ordering::Relaxed);
                        0.0
                    };

                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
            },
            |err| {
                tracing::error!("audio playback error: {}", err);
            },
            None,
        )
        .context("Failed to build output stream")?;

    stream.play().context("Failed to start output stream")?;

    let duration_ms = (sample_count as u64 * 1000) / u64::from(sample_rate);
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(duration_ms + 500);

    while !finished.load(Ordering::Relaxed) && !stop.load(Ordering::SeqCst) {
        if std::time::Instant::now() > deadline {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    let cancelled = stop.load(Ordering::SeqCst);
    if !cancelled {
        // Let the device drain the final buffer
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    drop(stream);
    debug!("playback {} ({} samples)", if cancelled { "cancelled" } else { "complete" }, sample_count);

    Ok(())
}
