// THEORY:
// The `Estimator` is the numeric heart of the engine. It reads an `Image` as a
// cloud of points in the unit cube [0, 1]³ and asks how many of them fall inside
// the unit sphere centred on the origin. The sphere's octant occupies π/6 of the
// cube, so for a uniform cloud
//
//     π ≈ 6 × inside / total
//
// Photos are not uniform clouds, which is the whole point: every photo produces
// its own (usually poor) approximation, and the ranker sorts them by how close
// they land.
//
// Two settings shape the count, and both are explicit rather than guessed:
// 1.  **Boundary**: `Inclusive` counts r²+g²+b² ≤ 1 as inside (the usual
//     containment convention and the default). `Strict` counts only < 1. The two
//     differ only for samples exactly on the sphere, e.g. a pure 255 channel.
// 2.  **RangePolicy**: samples must lie in [0, 1]³. `Reject` (default) fails the
//     whole image with `InvalidInputError::ComponentOutOfRange` on the first bad
//     sample. `Clamp` pulls every bad component into range and logs one warning
//     per image with the number of clamped samples.
//
// The estimator is a pure function of (settings, image): no I/O, no state, so
// running it on many threads gives bit-identical results.

pub mod estimator {
    use crate::core_modules::image_cloud::image_cloud::Image;
    use crate::core_modules::sample::sample::Sample;
    use crate::error::{InvalidInputError, ParseSettingError};
    use log::{debug, warn};
    use std::f64::consts::PI;
    use std::str::FromStr;

    /// Ratio of the unit cube's volume to the unit sphere octant's volume, times π.
    const OCTANT_SCALE: f64 = 6.0;

    /// Where a sample lying exactly on the unit sphere is counted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Boundary {
        /// `r² + g² + b² ≤ 1` is inside.
        #[default]
        Inclusive,
        /// `r² + g² + b² < 1` is inside.
        Strict,
    }

    impl Boundary {
        #[inline]
        pub fn contains(self, squared_norm: f64) -> bool {
            match self {
                Boundary::Inclusive => squared_norm <= 1.0,
                Boundary::Strict => squared_norm < 1.0,
            }
        }
    }

    impl FromStr for Boundary {
        type Err = ParseSettingError;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            match value.trim().to_ascii_lowercase().as_str() {
                "inclusive" => Ok(Boundary::Inclusive),
                "strict" => Ok(Boundary::Strict),
                _ => Err(ParseSettingError {
                    setting: "boundary",
                    value: value.to_string(),
                }),
            }
        }
    }

    /// What to do with a sample whose components fall outside [0, 1].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum RangePolicy {
        /// Fail the image with `InvalidInputError::ComponentOutOfRange`.
        #[default]
        Reject,
        /// Clamp the component into [0, 1] and warn.
        Clamp,
    }

    impl FromStr for RangePolicy {
        type Err = ParseSettingError;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            match value.trim().to_ascii_lowercase().as_str() {
                "reject" => Ok(RangePolicy::Reject),
                "clamp" => Ok(RangePolicy::Clamp),
                _ => Err(ParseSettingError {
                    setting: "range policy",
                    value: value.to_string(),
                }),
            }
        }
    }

    /// A single image's approximation of pi.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Estimate {
        /// `6 × inside / total`, always within [0, 6].
        pub value: f64,
        /// `|value − π|`.
        pub error: f64,
    }

    impl Estimate {
        fn from_counts(inside: usize, total: usize) -> Self {
            let value = OCTANT_SCALE * inside as f64 / total as f64;
            Self {
                value,
                error: (value - PI).abs(),
            }
        }
    }

    /// Counts unit-sphere membership over an image's samples.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Estimator {
        pub boundary: Boundary,
        pub range_policy: RangePolicy,
    }

    impl Estimator {
        pub fn new(boundary: Boundary, range_policy: RangePolicy) -> Self {
            Self {
                boundary,
                range_policy,
            }
        }

        /// Estimates pi from `image`.
        ///
        /// # Errors
        ///
        /// - `InvalidInputError::EmptyImage` if the image has no samples.
        /// - `InvalidInputError::ComponentOutOfRange` if a sample leaves [0, 1]
        ///   and the range policy is `Reject`.
        pub fn estimate(&self, image: &Image) -> Result<Estimate, InvalidInputError> {
            if image.is_empty() {
                return Err(InvalidInputError::EmptyImage);
            }

            let inside = match self.range_policy {
                RangePolicy::Reject => self.count_checked(image.samples())?,
                RangePolicy::Clamp => self.count_clamped(image.samples()),
            };

            let estimate = Estimate::from_counts(inside, image.len());
            debug!(
                "{inside}/{} samples inside the unit sphere, estimate {:.6}",
                image.len(),
                estimate.value
            );
            Ok(estimate)
        }

        fn count_checked(&self, samples: &[Sample]) -> Result<usize, InvalidInputError> {
            let mut inside = 0usize;
            for (index, sample) in samples.iter().enumerate() {
                if let Some((component, value)) = sample.out_of_range_component() {
                    return Err(InvalidInputError::ComponentOutOfRange {
                        index,
                        component,
                        value,
                    });
                }
                if self.boundary.contains(sample.squared_norm()) {
                    inside += 1;
                }
            }
            Ok(inside)
        }

        fn count_clamped(&self, samples: &[Sample]) -> usize {
            let mut inside = 0usize;
            let mut clamped = 0usize;
            for sample in samples {
                let sample = if sample.out_of_range_component().is_some() {
                    clamped += 1;
                    sample.clamped()
                } else {
                    *sample
                };
                if self.boundary.contains(sample.squared_norm()) {
                    inside += 1;
                }
            }
            if clamped > 0 {
                warn!(
                    "clamped {clamped} of {} samples into [0, 1]",
                    samples.len()
                );
            }
            inside
        }
    }

    /// Estimates pi from `image` with the inclusive boundary and the reject policy.
    pub fn estimate(image: &Image) -> Result<Estimate, InvalidInputError> {
        Estimator::default().estimate(image)
    }
}
