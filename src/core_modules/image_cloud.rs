// THEORY:
// The `Image` module turns a photo into the point cloud the estimator consumes.
// Like `Sample`, an `Image` is a "dumb" data container: it holds a flat
// `Vec<Sample>`, one per pixel, and knows how to build itself from the common
// raw forms (packed RGB bytes, packed RGBA bytes, a decoded `image::RgbImage`).
// It does not know anything about spheres or pi.
//
// Pixel order is preserved from the source buffer, although nothing downstream
// depends on it: sphere membership is a per-sample test and the count is order
// independent. An `Image` is owned by whoever loaded it and is only borrowed by
// the estimator.

pub mod image_cloud {
    use crate::core_modules::sample::sample::Sample;
    use crate::error::InvalidInputError;

    const RGB_CHANNELS: usize = 3;
    const RGBA_CHANNELS: usize = 4;

    /// A flat collection of colour samples, one per pixel.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Image {
        samples: Vec<Sample>,
    }

    impl Image {
        pub fn new(samples: Vec<Sample>) -> Self {
            Self { samples }
        }

        /// Builds an image from a packed `RGBRGB...` byte buffer.
        pub fn from_rgb_bytes(buffer: &[u8]) -> Result<Self, InvalidInputError> {
            Self::from_packed(buffer, RGB_CHANNELS)
        }

        /// Builds an image from a packed `RGBARGBA...` byte buffer. Alpha is ignored.
        pub fn from_rgba_bytes(buffer: &[u8]) -> Result<Self, InvalidInputError> {
            Self::from_packed(buffer, RGBA_CHANNELS)
        }

        fn from_packed(buffer: &[u8], channels: usize) -> Result<Self, InvalidInputError> {
            if buffer.len() % channels != 0 {
                return Err(InvalidInputError::ChannelCount {
                    expected: channels,
                    actual: buffer.len(),
                });
            }
            let samples = buffer
                .chunks_exact(channels)
                .map(|pixel| Sample::from_bytes(pixel[0], pixel[1], pixel[2]))
                .collect();
            Ok(Self { samples })
        }

        pub fn samples(&self) -> &[Sample] {
            &self.samples
        }

        /// Number of samples (pixels).
        pub fn len(&self) -> usize {
            self.samples.len()
        }

        pub fn is_empty(&self) -> bool {
            self.samples.is_empty()
        }
    }

    impl From<&image::RgbImage> for Image {
        fn from(buffer: &image::RgbImage) -> Self {
            Self {
                samples: buffer.pixels().map(|pixel| Sample::from(*pixel)).collect(),
            }
        }
    }

    impl From<Vec<Sample>> for Image {
        fn from(samples: Vec<Sample>) -> Self {
            Self::new(samples)
        }
    }

    impl FromIterator<Sample> for Image {
        fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
            Self::new(iter.into_iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::image_cloud::Image;
    use crate::core_modules::sample::sample::Sample;
    use crate::error::InvalidInputError;

    #[test]
    fn rgba_buffer_drops_alpha() {
        let image = Image::from_rgba_bytes(&[255, 0, 0, 17, 0, 0, 255, 255]).unwrap();
        assert_eq!(
            image.samples(),
            &[Sample::new(1.0, 0.0, 0.0), Sample::new(0.0, 0.0, 1.0)]
        );
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let error = Image::from_rgb_bytes(&[1, 2, 3, 4]).unwrap_err();
        assert_eq!(
            error,
            InvalidInputError::ChannelCount {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn decoded_buffer_keeps_pixel_order() {
        let buffer = image::RgbImage::from_fn(2, 2, |x, y| {
            image::Rgb([(x * 255) as u8, (y * 255) as u8, 0])
        });
        let image = Image::from(&buffer);
        assert_eq!(image.len(), 4);
        assert_eq!(image.samples()[1], Sample::new(1.0, 0.0, 0.0));
        assert_eq!(image.samples()[2], Sample::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn empty_buffer_gives_empty_image() {
        assert!(Image::from_rgb_bytes(&[]).unwrap().is_empty());
    }
}
