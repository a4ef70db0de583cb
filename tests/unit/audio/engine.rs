use std::sync::{Arc, Mutex};

use super::*;

fn ctx() -> SoundContext {
    SoundContext {
        style: StyleTag::Left,
        duration_secs: 0.2,
        seed: 7,
    }
}

struct Capture(Arc<Mutex<Vec<usize>>>);

impl AudioMonitor for Capture {
    fn deliver(&mut self, pcm: &AudioPcm) -> KinetypeResult<()> {
        self.0.lock().unwrap().push(pcm.frames());
        Ok(())
    }
}

#[test]
fn sound_spec_json_shapes() {
    let s: SoundSpec = serde_json::from_str(r#"{"kind":{"preset":"preset_3"},"volume":0.5}"#).unwrap();
    assert_eq!(s.kind, SoundKind::Preset("preset_3".into()));
    assert_eq!(s.volume, 0.5);

    let s: SoundSpec = serde_json::from_str(r#"{"kind":"whoosh"}"#).unwrap();
    assert_eq!(s.kind, SoundKind::Whoosh);
    assert_eq!(s.volume, DEFAULT_VOLUME);

    let s: SoundSpec = serde_json::from_str("{}").unwrap();
    assert!(s.is_none());
}

#[test]
fn validation_rejects_bad_volume_and_unknown_preset() {
    assert!(SoundSpec::preset("preset_1").validate().is_ok());
    assert!(SoundSpec::preset("preset_500").validate().is_err());
    let loud = SoundSpec {
        volume: 1.5,
        ..SoundSpec::none()
    };
    assert!(loud.validate().is_err());
}

#[test]
fn none_renders_nothing() {
    let engine = AudioEngine::with_sample_rate(8_000);
    assert!(engine.render(&SoundSpec::none(), &ctx()).unwrap().is_none());
}

#[test]
fn preset_renders_stereo_at_engine_rate() {
    let engine = AudioEngine::with_sample_rate(8_000);
    let pcm = engine
        .render(&SoundSpec::preset("preset_1"), &ctx())
        .unwrap()
        .unwrap();
    assert_eq!(pcm.sample_rate, 8_000);
    assert_eq!(pcm.channels, 2);
    // duration 0.2 + release 0.1
    assert!((pcm.duration_secs() - 0.3).abs() < 0.01);
    assert!(pcm.peak() > 0.05);
}

#[test]
fn whoosh_renders() {
    let engine = AudioEngine::with_sample_rate(8_000);
    let spec = SoundSpec {
        kind: SoundKind::Whoosh,
        volume: 0.5,
    };
    let pcm = engine.render(&spec, &ctx()).unwrap().unwrap();
    assert!((pcm.duration_secs() - 0.45).abs() < 0.01);
}

#[test]
fn missing_clip_degrades_to_silence() {
    let mut engine = AudioEngine::with_sample_rate(8_000);
    let spec = SoundSpec {
        kind: SoundKind::Clip("/definitely/not/here.wav".into()),
        volume: 1.0,
    };
    assert!(engine.render(&spec, &ctx()).is_err());
    assert!(engine.render_for_export(&spec, &ctx()).is_none());
}

#[test]
fn monitor_receives_the_exported_pcm() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut engine = AudioEngine::with_sample_rate(8_000);
    engine.set_monitor(Some(Box::new(Capture(seen.clone()))));

    let pcm = engine
        .render_for_export(&SoundSpec::preset("preset_2"), &ctx())
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![pcm.frames()]);
}

#[test]
fn wav_monitor_writes_readable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/preview.wav");
    let pcm = AudioPcm::stereo_from_mono(&[0.25, -0.25, 0.0], 8_000);
    WavMonitor::new(&path).deliver(&pcm).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 8_000);
    assert_eq!(reader.len(), 6);
}

#[test]
fn f32le_is_little_endian_floats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.f32le");
    write_f32le(&[1.0, -0.5], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), -0.5);
}
