use super::*;
use crate::audio::engine::SoundKind;

#[test]
fn empty_json_is_a_valid_default_request() {
    let req = AnimationRequest::from_json_str("{}").unwrap();
    req.validate().unwrap();
    assert_eq!(req.content, ContentMode::Text);
    assert_eq!(req.style, StyleTag::None);
    assert_eq!(req.fps, Fps::default());
    assert_eq!(req.canvas, Canvas::FULL_HD);
    assert!(req.sound.is_none());
}

#[test]
fn json_fields_are_read() {
    let req = AnimationRequest::from_json_str(
        r##"{
            "text": "Hello World!",
            "style": "font-flicker",
            "duration_secs": 2,
            "fps": 24,
            "color": "#ff8800",
            "glow": true,
            "fade_speed": "fast",
            "flicker_interval_ms": 250,
            "sound": { "kind": "whoosh", "volume": 0.3 },
            "canvas": { "width": 640, "height": 360 }
        }"##,
    )
    .unwrap();
    assert_eq!(req.text.as_deref(), Some("Hello World!"));
    assert_eq!(req.style, StyleTag::FontFlicker);
    assert_eq!(req.fps, Fps::new(24, 1).unwrap());
    assert_eq!(req.fade_speed, Some(FadeSpeed::Fast));
    assert_eq!(req.flicker_interval(), 250);
    assert_eq!(req.sound.kind, SoundKind::Whoosh);
    assert_eq!(req.canvas, Canvas { width: 640, height: 360 });
}

#[test]
fn unknown_fields_are_rejected() {
    let err = AnimationRequest::from_json_str(r#"{"colour": "red"}"#).unwrap_err();
    assert!(matches!(err, KinetypeError::Serde(_)));
}

#[test]
fn validation_catches_bad_ranges() {
    let bad = [
        AnimationRequest {
            duration_secs: 0.0,
            ..AnimationRequest::default()
        },
        AnimationRequest {
            duration_secs: f64::NAN,
            ..AnimationRequest::default()
        },
        AnimationRequest {
            color: "not-a-color".into(),
            ..AnimationRequest::default()
        },
        AnimationRequest {
            flicker_interval_ms: Some(0),
            ..AnimationRequest::default()
        },
        AnimationRequest {
            zoom_min_scale: 0.0,
            ..AnimationRequest::default()
        },
        AnimationRequest {
            canvas: Canvas { width: 101, height: 100 },
            ..AnimationRequest::default()
        },
        AnimationRequest {
            font: "  ".into(),
            ..AnimationRequest::default()
        },
    ];
    for req in bad {
        let err = req.validate().unwrap_err();
        assert!(matches!(err, KinetypeError::Validation(_)), "{err}");
    }
}

#[test]
fn resolve_fills_style_params() {
    let req = AnimationRequest {
        text: Some("abc".into()),
        fade_speed: Some(FadeSpeed::Slow),
        zoom_min_scale: 0.5,
        canvas: Canvas { width: 320, height: 180 },
        ..AnimationRequest::default()
    };
    let r = req.resolve().unwrap();
    assert_eq!(r.content.text(), Some("abc"));
    assert_eq!(r.style_params.text_len, 3);
    assert_eq!(r.style_params.fade_speed, Some(FadeSpeed::Slow));
    assert_eq!(r.style_params.zoom_min_scale, 0.5);
    assert_eq!(r.canvas(), Canvas { width: 320, height: 180 });
    assert_eq!(r.color, Rgba8::WHITE);
}

#[test]
fn image_mode_needs_an_image_for_export_but_not_preview() {
    let req = AnimationRequest {
        content: ContentMode::Image,
        ..AnimationRequest::default()
    };
    assert!(matches!(
        req.resolve().unwrap_err(),
        KinetypeError::MissingContent(_)
    ));
    let preview = req.resolve_preview().unwrap();
    assert!(preview.content.is_placeholder());
}

#[test]
fn flicker_pool_defaults_to_request_font_first() {
    let req = AnimationRequest {
        font: "Papyrus".into(),
        ..AnimationRequest::default()
    };
    let pool = req.flicker_pool();
    assert_eq!(pool[0], "Papyrus");
    assert_eq!(pool.len(), DEFAULT_FLICKER_FONTS.len() + 1);

    let req = AnimationRequest {
        flicker_fonts: vec!["A".into(), "B".into()],
        ..AnimationRequest::default()
    };
    assert_eq!(req.flicker_pool(), vec!["A".to_owned(), "B".to_owned()]);
}

#[test]
fn request_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("req.json");
    std::fs::write(&path, r#"{"text":"from file","style":"zoom"}"#).unwrap();
    let req = AnimationRequest::from_path(&path).unwrap();
    assert_eq!(req.style, StyleTag::Zoom);

    assert!(AnimationRequest::from_path(&dir.path().join("missing.json")).is_err());
}
