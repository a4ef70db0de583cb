use super::*;

#[test]
fn hex_forms() {
    assert_eq!(parse_color("#ff3366").unwrap(), Rgba8::new(255, 51, 102, 255));
    assert_eq!(parse_color("#FFF").unwrap(), Rgba8::WHITE);
    assert_eq!(parse_color("#00ff0080").unwrap(), Rgba8::new(0, 255, 0, 128));
    assert!(parse_color("#12345").is_err());
    assert!(parse_color("#gg0000").is_err());
}

#[test]
fn functional_and_named_forms() {
    assert_eq!(
        parse_color("rgba(0,0,0,0.6)").unwrap(),
        Rgba8::new(0, 0, 0, 153)
    );
    assert_eq!(parse_color(" rgb(10, 20, 30) ").unwrap(), Rgba8::new(10, 20, 30, 255));
    assert_eq!(parse_color("White").unwrap(), Rgba8::WHITE);
    assert!(parse_color("rgb(1,2)").is_err());
    assert!(parse_color("chartreuse-ish").is_err());
}
