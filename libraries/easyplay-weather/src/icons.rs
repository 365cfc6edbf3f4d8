//! WMO weather interpretation code to glyph lookup.

/// Glyph shown for codes outside the table
pub const FALLBACK_GLYPH: &str = "...";

/// Map a WMO weather code to a display glyph.
pub fn weather_glyph(code: u16) -> &'static str {
    match code {
        0 | 1 => "☀️",
        2 => "⛅",
        3 => "☁️",
        45 | 48 => "🌫️",
        // Drizzle and rain share a glyph
        51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 => "🌧️",
        80..=82 => "🌦️",
        71 | 73 | 75 | 77 | 85 | 86 => "❄️",
        95 | 96 | 99 => "⛈️",
        _ => FALLBACK_GLYPH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(weather_glyph(0), "☀️");
        assert_eq!(weather_glyph(2), "⛅");
        assert_eq!(weather_glyph(48), "🌫️");
        assert_eq!(weather_glyph(55), weather_glyph(63));
        assert_eq!(weather_glyph(81), "🌦️");
        assert_eq!(weather_glyph(86), "❄️");
        assert_eq!(weather_glyph(99), "⛈️");
    }

    #[test]
    fn unmapped_codes_use_fallback() {
        for code in [4, 50, 70, 100, 999] {
            assert_eq!(weather_glyph(code), FALLBACK_GLYPH);
        }
    }
}
