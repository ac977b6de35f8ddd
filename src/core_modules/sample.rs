// THEORY (Sample):
// A `Sample` is the most fundamental unit of the estimator. It is a "dumb" data
// container for one pixel's colour channels, read as a point (r, g, b) in
// 3-space. Anything that needs more than one sample (counting, ratios) belongs in
// the estimator; anything that needs more than one image belongs in the ranker.
//
// Channel form:
// - Source pixels arrive as 8-bit sRGB bytes (0..255).
// - A sample stores the *normalized* form: each byte divided by 255.0, so every
//   component lands in the closed interval [0, 1]. No gamma linearization is
//   applied; the point cloud is the encoded colour cube, unchanged.
// - Components are kept as f64. A byte of 255 normalizes to exactly 1.0, which
//   matters for samples sitting on the unit sphere boundary.
//
// Samples built from raw floats (`Sample::new`) are not range checked here; the
// estimator owns the range policy and applies it once per sample.

pub mod sample {
    pub type Byte = u8;
    pub type Component = f64;

    const BYTE_MAX: Component = 255.0;

    /// One pixel's colour channels as a point in 3-space.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Sample {
        /// The red component (0.0-1.0).
        pub r: Component,
        /// The green component (0.0-1.0).
        pub g: Component,
        /// The blue component (0.0-1.0).
        pub b: Component,
    }

    impl Sample {
        pub fn new(r: Component, g: Component, b: Component) -> Self {
            Self { r, g, b }
        }

        /// Builds a sample from 8-bit channels, normalizing each to [0, 1].
        #[inline]
        pub fn from_bytes(red: Byte, green: Byte, blue: Byte) -> Self {
            Self {
                r: red as Component / BYTE_MAX,
                g: green as Component / BYTE_MAX,
                b: blue as Component / BYTE_MAX,
            }
        }

        /// Squared distance from the origin, `r² + g² + b²`.
        #[inline]
        pub fn squared_norm(&self) -> Component {
            self.r * self.r + self.g * self.g + self.b * self.b
        }

        /// The first component (named) that falls outside [0, 1], if any.
        ///
        /// NaN counts as out of range.
        pub fn out_of_range_component(&self) -> Option<(char, Component)> {
            [('r', self.r), ('g', self.g), ('b', self.b)]
                .into_iter()
                .find(|(_, value)| !(0.0..=1.0).contains(value))
        }

        /// Returns a copy with every component clamped into [0, 1].
        ///
        /// NaN components clamp to 0.0.
        pub fn clamped(&self) -> Self {
            let clamp = |value: Component| {
                if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
            };
            Self {
                r: clamp(self.r),
                g: clamp(self.g),
                b: clamp(self.b),
            }
        }
    }

    impl From<[Byte; 3]> for Sample {
        fn from(bytes: [Byte; 3]) -> Self {
            Sample::from_bytes(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<image::Rgb<Byte>> for Sample {
        fn from(pixel: image::Rgb<Byte>) -> Self {
            Sample::from(pixel.0)
        }
    }
}
