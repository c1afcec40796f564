//! Color Matcher - Snap Arbitrary Colors to Palette Roles
//!
//! Agents speak hex; labels speak roles. Distance is CIE76 delta-E in L*a*b*.

use thiserror::Error;

use crate::document::{ColorRole, Palette};
use crate::logging::EngineLogger;

const COMPONENT: &str = "color";

// D65 reference white
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    fn is_finite(&self) -> bool {
        self.l.is_finite() && self.a.is_finite() && self.b.is_finite()
    }
}

/// Normalize a 3- or 6-digit hex color to `#RRGGBB`
pub fn normalize_hex_color(input: &str) -> Result<String, ColorError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidColor(input.to_string()));
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(ColorError::InvalidColor(input.to_string())),
    };

    Ok(format!("#{}", expanded.to_ascii_uppercase()))
}

/// Parse a hex color into its channels
pub fn hex_to_rgb(input: &str) -> Result<Rgb, ColorError> {
    let normalized = normalize_hex_color(input)?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&normalized[range], 16)
            .map_err(|_| ColorError::InvalidColor(input.to_string()))
    };

    Ok(Rgb {
        r: channel(1..3)?,
        g: channel(3..5)?,
        b: channel(5..7)?,
    })
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// sRGB -> linear RGB -> XYZ (D65) -> L*a*b*
pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(f64::from(rgb.r) / 255.0);
    let g = srgb_to_linear(f64::from(rgb.g) / 255.0);
    let b = srgb_to_linear(f64::from(rgb.b) / 255.0);

    let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
    let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
    let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y / WHITE_Y);
    let fz = lab_f(z / WHITE_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// CIE76 delta-E
pub fn delta_e(a: Lab, b: Lab) -> f64 {
    ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
}

fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Perceptual distance between two parsed colors.
///
/// Falls back to RGB Euclidean distance if the L*a*b* pipeline goes non-finite.
pub fn rgb_color_distance(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (rgb_to_lab(a), rgb_to_lab(b));
    let d = delta_e(la, lb);
    if la.is_finite() && lb.is_finite() && d.is_finite() {
        d
    } else {
        rgb_distance(a, b)
    }
}

/// Perceptual distance between two hex colors; `f64::INFINITY` if either is invalid
pub fn color_distance(a: &str, b: &str) -> f64 {
    match (hex_to_rgb(a), hex_to_rgb(b)) {
        (Ok(a), Ok(b)) => rgb_color_distance(a, b),
        _ => f64::INFINITY,
    }
}

/// Resolve a hex color to the perceptually closest palette role.
///
/// Roles are scanned primary, secondary, accent, background; the first strict
/// minimum wins. Invalid input degrades to `Primary`.
pub fn hex_to_closest_palette_role(
    hex: &str,
    palette: &Palette,
    logger: &dyn EngineLogger,
) -> ColorRole {
    let target = match hex_to_rgb(hex) {
        Ok(rgb) => rgb,
        Err(e) => {
            logger.warn(COMPONENT, &format!("{e}; defaulting to primary"));
            return ColorRole::Primary;
        }
    };

    let mut best = ColorRole::Primary;
    let mut best_distance = f64::INFINITY;

    for (role, value) in palette.entries() {
        let distance = match hex_to_rgb(value) {
            Ok(rgb) => rgb_color_distance(target, rgb),
            Err(e) => {
                logger.warn(COMPONENT, &format!("palette {role} is unusable: {e}"));
                continue;
            }
        };
        if distance < best_distance {
            best = role;
            best_distance = distance;
        }
    }

    logger.debug(
        COMPONENT,
        &format!("{hex} -> {best} (delta-E {best_distance:.2})"),
    );
    best
}
