use rayon::prelude::*;

/// Slider values of the tone adjustments. These are a view setting of the editor, not part
/// of the undo history.
#[derive(Copy, Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// `-100..=100`, shifts every channel by up to a full 255.
    pub brightness: f32,
    /// `-100..=100`, zero is unchanged.
    pub contrast: f32,
    /// `-100..=100`, scales the hue matrix by `2^(saturation / 100)`.
    pub saturation: f32,
    /// Degrees, `-180..=180`.
    pub hue: f32,
}
impl Adjustments {
    pub const IDENTITY: Self = Self {
        brightness: 0.0,
        contrast: 0.0,
        saturation: 0.0,
        hue: 0.0,
    };
    /// Copy with every slider clamped to its range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.clamp(-100.0, 100.0),
            contrast: self.contrast.clamp(-100.0, 100.0),
            saturation: self.saturation.clamp(-100.0, 100.0),
            hue: self.hue.clamp(-180.0, 180.0),
        }
    }
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
    /// Apply brighten, then contrast, then the hue/saturation matrix, rounding to 8 bits
    /// between each stage. Alpha is untouched. Identity settings leave pixels untouched.
    pub fn apply(&self, image: &mut image::RgbaImage) {
        if self.is_identity() {
            return;
        }
        let pipeline = Pipeline::new(self.clamped());
        image
            .as_mut()
            .par_chunks_exact_mut(4)
            .for_each(|pixel| {
                let [r, g, b] = pipeline.run([pixel[0], pixel[1], pixel[2]]);
                pixel[0] = r;
                pixel[1] = g;
                pixel[2] = b;
            });
    }
}

/// Precomputed coefficients for a set of adjustments.
struct Pipeline {
    /// Added to each channel, in 0..255 units.
    brighten: Option<f32>,
    contrast: Option<f32>,
    /// Row-major 3x3 color matrix.
    hsl: Option<[[f32; 3]; 3]>,
}
impl Pipeline {
    fn new(adjustments: Adjustments) -> Self {
        let brighten =
            (adjustments.brightness != 0.0).then(|| adjustments.brightness / 100.0 * 255.0);
        let contrast = (adjustments.contrast != 0.0)
            .then(|| ((adjustments.contrast + 100.0) / 100.0).powi(2));
        let hsl = (adjustments.saturation != 0.0 || adjustments.hue != 0.0)
            .then(|| hsl_matrix(adjustments.saturation / 100.0, adjustments.hue));
        Self {
            brighten,
            contrast,
            hsl,
        }
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn run(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut rgb = rgb.map(f32::from);
        if let Some(amount) = self.brighten {
            rgb = rgb.map(|v| quantize(v + amount));
        }
        if let Some(adjust) = self.contrast {
            rgb = rgb.map(|v| quantize(((v / 255.0 - 0.5) * adjust + 0.5) * 255.0));
        }
        if let Some(matrix) = self.hsl {
            let [r, g, b] = rgb;
            rgb = matrix.map(|[mr, mg, mb]| quantize(mr * r + mg * g + mb * b));
        }
        rgb.map(|v| v as u8)
    }
}

/// Clamp and round to an 8-bit channel value, kept as float.
fn quantize(value: f32) -> f32 {
    value.clamp(0.0, 255.0).round()
}

/// Combined saturation scale (`2^saturation`) and hue rotation in YIQ-like space.
fn hsl_matrix(saturation: f32, hue_degrees: f32) -> [[f32; 3]; 3] {
    let v = 2.0f32.powf(saturation);
    let hue = (hue_degrees + 360.0).abs() % 360.0;
    let (sin, cos) = hue.to_radians().sin_cos();
    let vsu = v * cos;
    let vsw = v * sin;
    [
        [
            0.299 * v + 0.701 * vsu + 0.167 * vsw,
            0.587 * v - 0.587 * vsu + 0.330 * vsw,
            0.114 * v - 0.114 * vsu - 0.497 * vsw,
        ],
        [
            0.299 * v - 0.299 * vsu - 0.328 * vsw,
            0.587 * v + 0.413 * vsu + 0.035 * vsw,
            0.114 * v - 0.114 * vsu + 0.293 * vsw,
        ],
        [
            0.299 * v - 0.300 * vsu + 1.250 * vsw,
            0.587 * v - 0.586 * vsu - 1.050 * vsw,
            0.114 * v + 0.886 * vsu - 0.200 * vsw,
        ],
    ]
}
