/// Parse `#rrggbb` (or `#rgb`) into channels.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let num = u32::from_str_radix(&expanded, 16).ok()?;
    Some(((num >> 16) as u8, (num >> 8) as u8, num as u8))
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Shift every channel by `amount`, clamped to 0..=255. Unparsable input is
/// returned unchanged.
pub fn adjust_color(color: &str, amount: i32) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => {
            let shift = |c: u8| (c as i32 + amount).clamp(0, 255) as u8;
            to_hex(shift(r), shift(g), shift(b))
        }
        None => color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_color_darken() {
        assert_eq!(adjust_color("#e74c3c", -20), "#d33828");
        assert_eq!(adjust_color("#ff69b4", -20), "#eb55a0");
    }

    #[test]
    fn test_adjust_color_clamps() {
        assert_eq!(adjust_color("#0a0a0a", -20), "#000000");
        assert_eq!(adjust_color("#f0f0f0", 40), "#ffffff");
    }

    #[test]
    fn test_short_and_invalid_colors() {
        assert_eq!(adjust_color("#666", -20), "#525252");
        assert_eq!(adjust_color("teal", -20), "teal");
        assert_eq!(parse_hex("#12345"), None);
    }
}
