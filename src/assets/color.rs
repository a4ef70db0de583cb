use crate::foundation::core::Rgba8;
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Parse a CSS-style color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` or a basic
/// color name.
pub fn parse_color(s: &str) -> KinetypeResult<Rgba8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_fn(args);
    }
    named(&lower).ok_or_else(|| KinetypeError::validation(format!("invalid color \"{s}\"")))
}

fn parse_hex(s: &str) -> KinetypeResult<Rgba8> {
    fn hex_byte(pair: &str) -> KinetypeResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| KinetypeError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(KinetypeError::validation("hex color must be ascii"));
    }
    match s.len() {
        3 => {
            let r = hex_byte(&s[0..1].repeat(2))?;
            let g = hex_byte(&s[1..2].repeat(2))?;
            let b = hex_byte(&s[2..3].repeat(2))?;
            Ok(Rgba8::new(r, g, b, 255))
        }
        6 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        )),
        8 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err(KinetypeError::validation(
            "hex color must be #RGB, #RRGGBB or #RRGGBBAA",
        )),
    }
}

fn parse_rgb_fn(args: &str) -> KinetypeResult<Rgba8> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(KinetypeError::validation(
            "rgb()/rgba() take 3 or 4 components",
        ));
    }
    let channel = |p: &str| -> KinetypeResult<u8> {
        let v: f64 = p
            .parse()
            .map_err(|_| KinetypeError::validation(format!("invalid color channel \"{p}\"")))?;
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };
    let a = match parts.get(3) {
        Some(p) => {
            let v: f64 = p
                .parse()
                .map_err(|_| KinetypeError::validation(format!("invalid alpha \"{p}\"")))?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Ok(Rgba8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

fn named(name: &str) -> Option<Rgba8> {
    let c = match name {
        "white" => Rgba8::new(255, 255, 255, 255),
        "black" => Rgba8::new(0, 0, 0, 255),
        "red" => Rgba8::new(255, 0, 0, 255),
        "green" | "lime" => Rgba8::new(0, 255, 0, 255),
        "blue" => Rgba8::new(0, 0, 255, 255),
        "yellow" => Rgba8::new(255, 255, 0, 255),
        "cyan" => Rgba8::new(0, 255, 255, 255),
        "magenta" => Rgba8::new(255, 0, 255, 255),
        "orange" => Rgba8::new(255, 165, 0, 255),
        "transparent" => Rgba8::new(0, 0, 0, 0),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
