use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn weights_and_saturation() {
    assert_eq!(unit_to_u8_weight(-1.0), 0);
    assert_eq!(unit_to_u8_weight(2.0), 255);
    assert_eq!(add_sat_u8(200, 100), 255);
    assert_eq!(secs_to_ms(0.3), 300);
}
