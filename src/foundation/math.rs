pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

/// Map a unit-interval factor to an 8-bit weight.
pub(crate) fn unit_to_u8_weight(f: f32) -> u16 {
    ((f.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Seconds to milliseconds, saturating at zero.
pub(crate) fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
