//! Colour string parsing.
//!
//! Colours are stored as CSS strings on objects so snapshots stay readable.
//! The renderer and the tint filter need numeric channels, so this module
//! resolves the subset of CSS colour syntax the editor produces.

/// Parse a CSS colour into straight RGBA bytes.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`,
/// `rgba(r,g,b,a)` and a handful of named colours. Returns `None` for
/// anything else.
#[must_use]
pub fn parse_color(input: &str) -> Option<[u8; 4]> {
    let value = input.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
    {
        return parse_functional(body.strip_suffix(')')?);
    }

    match value.as_str() {
        "transparent" => Some([0, 0, 0, 0]),
        "black" => Some([0, 0, 0, 255]),
        "white" => Some([255, 255, 255, 255]),
        "red" => Some([255, 0, 0, 255]),
        "green" => Some([0, 128, 0, 255]),
        "blue" => Some([0, 0, 255, 255]),
        "yellow" => Some([255, 255, 0, 255]),
        "gray" | "grey" => Some([128, 128, 128, 255]),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len()) {
                let n = nibble(i)?;
                *slot = n * 17;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [255u8; 4];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
                *slot = byte(i * 2)?;
            }
            Some(out)
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_functional(body: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let mut out = [255u8; 4];
    for (slot, part) in out.iter_mut().zip(&parts[..3]) {
        let channel: f64 = part.parse().ok()?;
        *slot = channel.clamp(0.0, 255.0).round() as u8;
    }
    if let Some(alpha) = parts.get(3) {
        let alpha: f64 = alpha.parse().ok()?;
        out[3] = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color("#fff"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("#FF0000"), Some([255, 0, 0, 255]));
        assert_eq!(parse_color("#00ff0080"), Some([0, 255, 0, 128]));
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn test_functional_forms() {
        assert_eq!(parse_color("rgb(10, 20, 30)"), Some([10, 20, 30, 255]));
        assert_eq!(parse_color("rgba(0,0,0,0.5)"), Some([0, 0, 0, 128]));
        assert_eq!(parse_color("rgb(1,2)"), None);
    }

    #[test]
    fn test_named() {
        assert_eq!(parse_color("White"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("transparent"), Some([0, 0, 0, 0]));
        assert_eq!(parse_color("chartreuse-ish"), None);
    }
}
