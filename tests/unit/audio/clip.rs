use super::*;

fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn mono_int_wav_becomes_stereo_float() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 48_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let bytes = wav_bytes(spec, &[16_384, -16_384, 0]);
    assert!(is_wav(&bytes));

    let pcm = decode_wav(&bytes, 48_000).unwrap();
    assert_eq!(pcm.channels, 2);
    assert_eq!(pcm.frames(), 3);
    assert!((pcm.interleaved_f32[0] - 0.5).abs() < 1e-4);
    assert_eq!(pcm.interleaved_f32[0], pcm.interleaved_f32[1]);
    assert!((pcm.interleaved_f32[2] + 0.5).abs() < 1e-4);
}

#[test]
fn wav_is_resampled_to_target_rate() {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let bytes = wav_bytes(spec, &vec![1000i16; 24_000 * 2]);
    let pcm = decode_wav(&bytes, 48_000).unwrap();
    assert_eq!(pcm.sample_rate, 48_000);
    assert_eq!(pcm.frames(), 48_000);
    assert!((pcm.duration_secs() - 1.0).abs() < 1e-6);
}

#[test]
fn garbage_is_an_audio_error() {
    let err = decode_wav(b"RIFF....WAVEnope", 48_000).unwrap_err();
    assert!(matches!(err, KinetypeError::Audio(_)));
    assert!(!is_wav(b"ID3\x04"));
}

#[test]
fn multichannel_keeps_first_two_channels() {
    let out = to_stereo(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
    assert_eq!(out, vec![1.0, 2.0, 4.0, 5.0]);
}
