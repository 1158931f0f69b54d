//! Background conversion job tests

mod common;

use common::{props, read_output, touch_input, ScriptedBackend};
use wavpipe_audio::{spawn_decode, PipelineOptions};
use wavpipe_core::{DecodeOutcome, DecodeRequest, ErrorKind};

#[test]
fn job_streams_progress_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let request = DecodeRequest::new(touch_input(dir.path()), dir.path().join("out.wav"));
    let output = request.output.clone();
    let backend = ScriptedBackend::new(props(2, 44_100, 16, 20_000));

    let job = spawn_decode(request, backend, PipelineOptions { chunk_frames: 1000 }).unwrap();

    // Iteration ends when the decode thread drops its sender
    let reports: Vec<f32> = job.progress().iter().collect();
    assert_eq!(reports.len(), 20);
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(reports.last().copied(), Some(1.0));

    let outcome = job.join();
    match outcome {
        DecodeOutcome::Success(summary) => assert_eq!(summary.samples_written, 20_000),
        DecodeOutcome::Failure { message, .. } => panic!("unexpected failure: {}", message),
    }

    let (header, _) = read_output(&output);
    assert_eq!(header.data_size, 20_000 * 2 * 2);
}

#[test]
fn job_reports_failure_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let request = DecodeRequest::new(touch_input(dir.path()), dir.path().join("out.wav"));
    let backend = ScriptedBackend::new(props(1, 44_100, 16, 100)).with_crc_errors(2);

    let job = spawn_decode(request, backend, PipelineOptions::default()).unwrap();
    let outcome = job.join();

    assert_eq!(outcome.kind(), Some(ErrorKind::StreamIntegrityErrors));
    assert_eq!(outcome.to_string(), "Decoding failed with 2 CRC errors");
}

#[test]
fn job_can_be_joined_without_reading_progress() {
    let dir = tempfile::tempdir().unwrap();
    let request = DecodeRequest::new(touch_input(dir.path()), dir.path().join("out.wav"));
    let backend = ScriptedBackend::new(props(1, 8000, 16, 50_000));

    let job = spawn_decode(request, backend, PipelineOptions { chunk_frames: 16 }).unwrap();
    assert!(job.join().is_success());
}
