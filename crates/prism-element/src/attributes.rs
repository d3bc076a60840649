/// Raw element attributes, exactly as given by the embedder.
///
/// Values stay strings until read so that parsing follows one set of rules
/// no matter where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    pub src: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl ElementAttributes {
    /// Shader URL; a missing attribute reads as the empty string.
    pub fn src(&self) -> &str {
        self.src.as_deref().unwrap_or("")
    }

    pub fn width(&self) -> u32 {
        dimension(self.width.as_deref())
    }

    pub fn height(&self) -> u32 {
        dimension(self.height.as_deref())
    }

    /// Non-fullscreen viewport size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// Missing, non-numeric and negative values all become 0.
fn dimension(raw: Option<&str>) -> u32 {
    raw.and_then(parse_int)
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Integer parsing with the lenient rules HTML attributes use.
///
/// Leading whitespace is skipped, an optional sign is accepted, a `0x`/`0X`
/// prefix switches to hexadecimal, and parsing stops at the first character
/// that is not a digit. Returns `None` when no digit was consumed.
/// Magnitudes beyond `i64` saturate.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');

    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let mut value: i64 = 0;
    let mut consumed = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        consumed = true;
        value = value.saturating_mul(radix as i64).saturating_add(d as i64);
    }

    if !consumed {
        return None;
    }
    Some(if negative { -value } else { value })
}
