use super::*;
use crate::encode::format::FixedCodecProbe;
use crate::encode::sink::AudioInputConfig;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0; 4]).is_err());
}

fn args_of(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn webm_command_streams_to_stdout() {
    let sink = FfmpegSink::with_probe(FfmpegSinkOpts::default(), FfmpegCodecProbe::default());
    let cfg = SinkConfig {
        width: 64,
        height: 36,
        fps: Fps::new(30, 1).unwrap(),
        format: ContainerFormat::WebmVp9Opus,
        audio: Some(AudioInputConfig {
            path: "/tmp/a.f32".into(),
            sample_rate: 48_000,
            channels: 2,
        }),
    };
    let args = args_of(&sink.build_command(&cfg).unwrap());
    let joined = args.join(" ");
    assert!(joined.contains("-s 64x36"));
    assert!(joined.contains("-r 30/1"));
    assert!(joined.contains("-c:v libvpx-vp9"));
    assert!(joined.contains("-map 1:a -c:a libopus"));
    assert!(joined.contains("-f webm"));
    assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
}

#[test]
fn silent_mp4_command_is_fragmented() {
    let sink = FfmpegSink::with_probe(FfmpegSinkOpts::default(), FfmpegCodecProbe::default());
    let cfg = SinkConfig {
        width: 64,
        height: 36,
        fps: Fps::default(),
        format: ContainerFormat::Mp4H264Aac,
        audio: None,
    };
    let joined = args_of(&sink.build_command(&cfg).unwrap()).join(" ");
    assert!(joined.contains("-an"));
    assert!(joined.contains("-movflags frag_keyframe+empty_moov"));
    assert!(!joined.contains("f32le"));
}

#[test]
fn sink_without_encoders_supports_nothing() {
    let sink = FfmpegSink::with_probe(FfmpegSinkOpts::default(), FfmpegCodecProbe::default());
    for f in ContainerFormat::PREFERENCE {
        assert!(!sink.supports(f));
    }
    assert!(
        ContainerFormat::PREFERENCE
            .iter()
            .all(|f| f.is_supported_by(&FixedCodecProbe::all()))
    );
}

#[test]
fn transcoder_defaults_to_mp4_and_accepts_other_targets() {
    assert_eq!(FfmpegTranscoder::new().target, ContainerFormat::Mp4H264Aac);
    assert_eq!(
        FfmpegTranscoder::to_format(ContainerFormat::WebmVp9Opus).target,
        ContainerFormat::WebmVp9Opus
    );
}
