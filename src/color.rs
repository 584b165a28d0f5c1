use eframe::egui::Color32;
use palette::{IntoColor, Hsl, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette (pie slices)
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale (correlation heatmap)
// ---------------------------------------------------------------------------

/// Colour used for undefined coefficients.
pub const UNDEFINED: Color32 = Color32::from_gray(110);

/// Map a coefficient in [-1, 1] onto a blue → light grey → red scale.
/// Mixing happens in linear RGB so the midpoint does not turn muddy.
pub fn correlation_color(r: f64) -> Color32 {
    if !r.is_finite() {
        return UNDEFINED;
    }
    let t = r.clamp(-1.0, 1.0) as f32;
    let negative: LinSrgb = Srgb::new(0.230, 0.299, 0.754).into_linear();
    let neutral: LinSrgb = Srgb::new(0.865, 0.865, 0.865).into_linear();
    let positive: LinSrgb = Srgb::new(0.706, 0.016, 0.150).into_linear();

    let mixed = if t < 0.0 {
        neutral.mix(negative, -t)
    } else {
        neutral.mix(positive, t)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Text colour that stays readable on top of `background`.
pub fn contrasting_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(10);
        assert_eq!(colors.len(), 10);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_correlation_scale_endpoints() {
        let low = correlation_color(-1.0);
        let high = correlation_color(1.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        assert_eq!(correlation_color(f64::NAN), UNDEFINED);
        assert_eq!(correlation_color(5.0), high);
    }
}
