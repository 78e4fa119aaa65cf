//! Value helpers shared by the token model and static checks.
//!
//! Colors are compared through a normalized string form:
//! - hex: lowercased as written (`#FFF` -> `#fff`);
//! - `rgb()`/`rgba()`: `rgb(r,g,b)`, alpha dropped;
//! - `hsl()`/`hsla()`: lowercased with whitespace removed.

use serde_json::Value as Json;

/// Normalize a color literal for equality matching.
pub fn normalize_color(raw: &str) -> String {
    let s = raw.trim().to_ascii_lowercase();
    if s.starts_with("rgb(") || s.starts_with("rgba(") {
        if let Some([r, g, b]) = parse_rgb_fn(&s) {
            return format!("rgb({},{},{})", r, g, b);
        }
    }
    if s.starts_with("hsl(") || s.starts_with("hsla(") {
        return s.chars().filter(|c| !c.is_whitespace()).collect();
    }
    s
}

/// True for strings that look like a color literal.
pub fn looks_like_color(s: &str) -> bool {
    let s = s.trim_start().to_ascii_lowercase();
    s.starts_with('#')
        || s.starts_with("rgb(")
        || s.starts_with("rgba(")
        || s.starts_with("hsl(")
        || s.starts_with("hsla(")
}

/// RGB channels of a normalized hex or `rgb()` color, if comparable.
pub fn rgb_channels(normalized: &str) -> Option<[u8; 3]> {
    if let Some(hex) = normalized.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
        return Some([r, g, b]);
    }
    if normalized.starts_with("rgb") {
        return parse_rgb_fn(normalized);
    }
    None
}

/// Squared euclidean distance in RGB space.
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as i32 - *y as i32;
            (d * d) as u32
        })
        .sum()
}

fn parse_rgb_fn(s: &str) -> Option<[u8; 3]> {
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close <= open {
        return None;
    }
    let parts: Vec<&str> = s[open + 1..close]
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }
    let mut out = [0u8; 3];
    for (i, p) in parts.iter().take(3).enumerate() {
        let n: f64 = p.parse().ok()?;
        out[i] = n.round().clamp(0.0, 255.0) as u8;
    }
    Some(out)
}

/// Pixel value of a JSON number, a unitless numeric string, or a `px` string.
pub fn pixel_value(v: &Json) -> Option<f64> {
    match v {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => {
            let t = s.trim();
            let num = t.strip_suffix("px").unwrap_or(t).trim();
            num.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn is_dimension(s: &str) -> bool {
    let t = s.trim();
    ["px", "rem", "em"].iter().any(|unit| {
        t.strip_suffix(unit)
            .map(|n| !n.is_empty() && n.trim().parse::<f64>().is_ok())
            .unwrap_or(false)
    })
}

/// Infer a token type from the shape of its raw value.
pub fn infer_type(v: &Json) -> &'static str {
    match v {
        Json::String(s) if looks_like_color(s) => "color",
        Json::String(s) if is_dimension(s) => "dimension",
        Json::Number(_) => "number",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_color_forms() {
        assert_eq!(normalize_color("#FF0000"), "#ff0000");
        assert_eq!(normalize_color("#FFF"), "#fff");
        assert_eq!(normalize_color("rgba(255, 0, 0, 0.5)"), "rgb(255,0,0)");
        assert_eq!(normalize_color("RGB( 1 ,2, 3 )"), "rgb(1,2,3)");
        assert_eq!(normalize_color("hsl(120, 50%, 50%)"), "hsl(120,50%,50%)");
    }

    #[test]
    fn test_rgb_channels_expand_short_hex() {
        assert_eq!(rgb_channels("#fff"), Some([255, 255, 255]));
        assert_eq!(rgb_channels("#4285f4"), Some([0x42, 0x85, 0xf4]));
        assert_eq!(rgb_channels("rgb(1,2,3)"), Some([1, 2, 3]));
        assert_eq!(rgb_channels("hsl(1,2%,3%)"), None);
    }

    #[test]
    fn test_infer_type_and_pixels() {
        assert_eq!(infer_type(&json!("#fff")), "color");
        assert_eq!(infer_type(&json!("rgb(0,0,0)")), "color");
        assert_eq!(infer_type(&json!("16px")), "dimension");
        assert_eq!(infer_type(&json!("1.5rem")), "dimension");
        assert_eq!(infer_type(&json!(4)), "number");
        assert_eq!(infer_type(&json!("Inter")), "other");
        assert_eq!(infer_type(&json!({"a": 1})), "other");
        assert_eq!(pixel_value(&json!("16px")), Some(16.0));
        assert_eq!(pixel_value(&json!(8)), Some(8.0));
        assert_eq!(pixel_value(&json!("1rem")), None);
    }
}
