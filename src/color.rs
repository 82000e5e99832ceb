use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: source file → Color32
// ---------------------------------------------------------------------------

/// Stable colour per source file, assigned in upload order so a file keeps
/// its colour while the selection changes.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ColorMap {
    pub fn new(sources: &[String]) -> Self {
        let palette = generate_palette(sources.len());
        ColorMap {
            mapping: sources.iter().cloned().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, source: &str) -> Color32 {
        self.mapping
            .get(source)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Same colour at the given opacity (0..=1).
    pub fn faded(&self, source: &str, alpha: f32) -> Color32 {
        self.color_for(source).gamma_multiply(alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        for (i, a) in palette.iter().enumerate() {
            assert!(palette[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn unknown_sources_fall_back_to_grey() {
        let map = ColorMap::new(&["a.xlsx".to_string()]);
        assert_ne!(map.color_for("a.xlsx"), Color32::GRAY);
        assert_eq!(map.color_for("other.xlsx"), Color32::GRAY);
    }
}
