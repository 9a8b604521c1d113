//! Hex color helpers and the frame color presets

/// A named frame color offered by the color picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPreset {
    pub name: &'static str,
    pub hex: &'static str,
}

pub const COLOR_PRESETS: [ColorPreset; 10] = [
    ColorPreset { name: "Xbox Green", hex: "#107C10" },
    ColorPreset { name: "PlayStation Blue", hex: "#0070D1" },
    ColorPreset { name: "Nintendo Red", hex: "#E60012" },
    ColorPreset { name: "Classic Black", hex: "#000000" },
    ColorPreset { name: "Pure White", hex: "#FFFFFF" },
    ColorPreset { name: "Silver", hex: "#C0C0C0" },
    ColorPreset { name: "Gold", hex: "#FFD700" },
    ColorPreset { name: "Purple", hex: "#6B3FA0" },
    ColorPreset { name: "Orange", hex: "#FF8C00" },
    ColorPreset { name: "Crystal Clear", hex: "#E8F4F8" },
];

/// Parse `#RRGGBB`, `RRGGBB`, or the short `#RGB` form into 8-bit channels
pub fn parse_hex(value: &str) -> Option<[u8; 3]> {
    let digits = value.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return None;
    }
    match digits.len() {
        6 => {
            let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
            let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
            let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in digits.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Format 8-bit channels as uppercase `#RRGGBB`
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("#107C10"), Some([0x10, 0x7C, 0x10]));
        assert_eq!(parse_hex("0070d1"), Some([0x00, 0x70, 0xD1]));
        assert_eq!(parse_hex("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#GGGGGG"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn test_to_hex_uppercase() {
        assert_eq!(to_hex([16, 124, 16]), "#107C10");
    }

    #[test]
    fn test_presets_are_valid_and_unique() {
        for preset in COLOR_PRESETS {
            assert!(parse_hex(preset.hex).is_some(), "{}", preset.name);
        }
        let mut names: Vec<_> = COLOR_PRESETS.iter().map(|p| p.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), COLOR_PRESETS.len());
    }
}
