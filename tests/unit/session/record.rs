use super::*;
use crate::encode::format::FixedCodecProbe;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Fps;

fn cfg(format: ContainerFormat) -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::default(),
        format,
        audio: None,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![7; 16],
        premultiplied: true,
    }
}

#[test]
fn transition_table() {
    use RecordState::*;
    assert!(Idle.can_transition_to(Recording));
    assert!(Recording.can_transition_to(Stopping));
    assert!(Stopping.can_transition_to(Finalized));
    assert!(Recording.can_transition_to(Finalized));
    assert!(!Idle.can_transition_to(Stopping));
    assert!(!Stopping.can_transition_to(Recording));
    assert!(!Finalized.can_transition_to(Recording));
    assert!(!Finalized.can_transition_to(Idle));
    assert!(!Recording.can_transition_to(Recording));
}

#[test]
fn happy_path_collects_all_chunks() {
    let mut sink = InMemorySink::new();
    let mut session = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap();
    assert_eq!(session.state(), RecordState::Recording);
    for i in 0..3 {
        session.push_frame(FrameIndex(i), &frame()).unwrap();
    }
    assert_eq!(session.chunk_count(), 3);
    let captured = session.stop().unwrap();
    assert_eq!(captured.chunks.len(), 3);
    assert_eq!(captured.frames, 3);
    assert!(!captured.partial);
    assert!(sink.was_ended());
}

#[test]
fn start_failure_leaves_no_session() {
    let mut sink = InMemorySink::new().failing_on_begin();
    let err = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap_err();
    assert!(matches!(err, KinetypeError::Unsupported(_)));
    assert!(sink.was_aborted());
}

#[test]
fn unsupported_format_is_refused_before_begin() {
    let mut sink = InMemorySink::new().with_probe(FixedCodecProbe::new(["libvpx"]));
    let err = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap_err();
    assert!(matches!(err, KinetypeError::Unsupported(_)));
    assert!(sink.config().is_none());
}

#[test]
fn mid_session_failure_yields_partial_recording() {
    let mut sink = InMemorySink::new().failing_after(2);
    let mut session = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap();
    session.push_frame(FrameIndex(0), &frame()).unwrap();
    session.push_frame(FrameIndex(1), &frame()).unwrap();
    assert!(session.push_frame(FrameIndex(2), &frame()).is_err());
    assert_eq!(session.state(), RecordState::Stopping);
    assert!(session.failure().is_some());
    // Stopping refuses further frames.
    assert!(session.push_frame(FrameIndex(3), &frame()).is_err());

    let captured = session.stop().unwrap();
    assert!(captured.partial);
    assert_eq!(captured.chunks.len(), 2);
}

#[test]
fn failure_without_data_is_recording_error() {
    let mut sink = InMemorySink::new().failing_after(0);
    let mut session = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap();
    assert!(session.push_frame(FrameIndex(0), &frame()).is_err());
    let err = session.stop().unwrap_err();
    assert!(matches!(err, KinetypeError::Recording(_)));
}

#[test]
fn cancel_aborts_sink() {
    let mut sink = InMemorySink::new();
    let mut session = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap();
    session.push_frame(FrameIndex(0), &frame()).unwrap();
    let err = session.cancel();
    assert!(matches!(err, KinetypeError::Cancelled));
    assert!(sink.was_aborted());
    assert!(!sink.was_ended());
}

#[test]
fn external_failure_marks_recording_partial() {
    let mut sink = InMemorySink::new();
    let mut session = RecordingSession::start(&mut sink, cfg(ContainerFormat::WebmVp9Opus)).unwrap();
    session.push_frame(FrameIndex(0), &frame()).unwrap();
    session.fail("compositor broke").unwrap();
    assert_eq!(session.state(), RecordState::Stopping);
    let captured = session.stop().unwrap();
    assert!(captured.partial);
    assert_eq!(captured.frames, 1);
}
