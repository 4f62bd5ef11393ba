#[derive(
    strum::AsRefStr,
    PartialEq,
    Eq,
    strum::EnumIter,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Overlay,
}
impl BlendMode {
    /// Blend a source channel over a backdrop channel, both in `[0, 1]`.
    #[must_use]
    fn channel(self, backdrop: f32, source: f32) -> f32 {
        match self {
            Self::Normal => source,
            Self::Add => (backdrop + source).min(1.0),
            Self::Multiply => backdrop * source,
            Self::Overlay => {
                if backdrop <= 0.5 {
                    2.0 * backdrop * source
                } else {
                    1.0 - 2.0 * (1.0 - backdrop) * (1.0 - source)
                }
            }
        }
    }
}

/// How an object is laid over what is below it: a mode and an opacity modulate.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Blend {
    pub mode: BlendMode,
    pub opacity: f32,
}
impl Default for Blend {
    fn default() -> Self {
        Self {
            mode: BlendMode::default(),
            opacity: 1.0,
        }
    }
}
impl Blend {
    #[must_use]
    pub fn with_opacity(opacity: f32) -> Self {
        Self {
            opacity,
            ..Self::default()
        }
    }
    /// Composite straight-alpha `source` over straight-alpha `backdrop`, where `coverage` is
    /// the fraction of the pixel the source covers.
    #[must_use]
    pub fn over(&self, backdrop: [u8; 4], source: [u8; 4], coverage: f32) -> [u8; 4] {
        let source_alpha = unit(source[3]) * self.opacity.clamp(0.0, 1.0) * coverage;
        if source_alpha <= 0.0 {
            return backdrop;
        }
        let backdrop_alpha = unit(backdrop[3]);
        let out_alpha = source_alpha + backdrop_alpha * (1.0 - source_alpha);
        if out_alpha <= 0.0 {
            return [0; 4];
        }
        let mut out = [0u8; 4];
        for channel in 0..3 {
            let cb = unit(backdrop[channel]);
            let cs = unit(source[channel]);
            // Where the backdrop is transparent, the mode has nothing to act on.
            let mixed = (1.0 - backdrop_alpha) * cs + backdrop_alpha * self.mode.channel(cb, cs);
            let value =
                (source_alpha * mixed + backdrop_alpha * (1.0 - source_alpha) * cb) / out_alpha;
            out[channel] = from_unit(value);
        }
        out[3] = from_unit(out_alpha);
        out
    }
}

fn unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}
/// `as` saturates, and sends NaN to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn from_unit(value: f32) -> u8 {
    (value * 255.0).round() as u8
}
