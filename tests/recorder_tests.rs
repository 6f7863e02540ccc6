// Tests for the answer recorder
//
// These verify the artifact invariant: buffered chunks are concatenated in
// arrival order, with nothing dropped and nothing duplicated.

use std::io::Cursor;
use tempfile::TempDir;
use tokio::sync::mpsc;
use vivavoce::audio::{AnswerRecorder, AudioFrame, CaptureConfig};

fn frame(samples: Vec<i16>, timestamp_ms: u64) -> AudioFrame {
    AudioFrame {
        samples,
        sample_rate: 16000,
        channels: 1,
        timestamp_ms,
    }
}

fn decode(wav: &[u8]) -> Vec<i16> {
    let reader = hound::WavReader::new(Cursor::new(wav)).expect("valid WAV blob");
    reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("decodable samples")
}

#[tokio::test]
async fn artifact_preserves_chunk_arrival_order() {
    let (tx, rx) = mpsc::channel(16);
    let recorder = AnswerRecorder::arm(rx, &CaptureConfig::default());

    // Distinct, ordered sample runs so reordering or loss is visible
    tx.send(frame(vec![1, 2, 3], 0)).await.unwrap();
    tx.send(frame(vec![4, 5], 100)).await.unwrap();
    tx.send(frame(vec![6, 7, 8, 9], 200)).await.unwrap();
    drop(tx);

    let artifact = recorder.stop().await.expect("artifact");

    assert_eq!(artifact.sample_count, 9);
    assert_eq!(decode(&artifact.wav), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[tokio::test]
async fn stop_flushes_chunks_delivered_before_the_signal() {
    let (tx, rx) = mpsc::channel(16);
    let recorder = AnswerRecorder::arm(rx, &CaptureConfig::default());

    tx.send(frame(vec![10, 11], 0)).await.unwrap();
    tx.send(frame(vec![12], 100)).await.unwrap();

    // Stop without closing the stream; everything already sent must land
    let artifact = recorder.stop().await.expect("artifact");

    assert_eq!(artifact.sample_count, 3);
    assert_eq!(decode(&artifact.wav), vec![10, 11, 12]);
}

#[tokio::test]
async fn armed_recorder_with_no_frames_yields_empty_artifact() {
    let (tx, rx) = mpsc::channel::<AudioFrame>(4);
    let recorder = AnswerRecorder::arm(rx, &CaptureConfig::default());
    drop(tx);

    let artifact = recorder.stop().await.expect("artifact");

    assert_eq!(artifact.sample_count, 0);
    assert_eq!(artifact.duration_secs(), 0.0);
    assert!(decode(&artifact.wav).is_empty());
}

#[tokio::test]
async fn artifact_carries_the_capture_format() {
    let config = CaptureConfig {
        target_sample_rate: 16000,
        target_channels: 1,
        buffer_duration_ms: 100,
    };

    let (tx, rx) = mpsc::channel(4);
    let recorder = AnswerRecorder::arm(rx, &config);

    tx.send(frame(vec![0; 1600], 0)).await.unwrap();
    drop(tx);

    let artifact = recorder.stop().await.expect("artifact");

    assert_eq!(artifact.sample_rate, 16000);
    assert_eq!(artifact.channels, 1);
    // 1600 samples at 16kHz mono = 100ms
    assert!((artifact.duration_secs() - 0.1).abs() < 1e-9);
}

#[tokio::test]
async fn artifact_writes_a_readable_wav_file() {
    let (tx, rx) = mpsc::channel(4);
    let recorder = AnswerRecorder::arm(rx, &CaptureConfig::default());

    tx.send(frame(vec![100, -100, 200], 0)).await.unwrap();
    drop(tx);

    let artifact = recorder.stop().await.expect("artifact");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("answer.wav");
    artifact.write_to(&path).unwrap();

    let reader = hound::WavReader::open(&path).expect("readable WAV file");
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);
}
