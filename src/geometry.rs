//! Mapping between source images, the network input and the network output grid.

use crate::error::Error;
use num_traits::ToPrimitive;

/// Per-axis factor from network input space to source image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Ratio of `original` to `input`, each given as `(width, height)`.
    pub fn between(original: (usize, usize), input: (usize, usize)) -> Result<Self, Error> {
        let ratio = |numerator: usize, denominator: usize| -> Result<f32, Error> {
            Ok(numerator.to_f32().ok_or(Error::ConvertToF32)?
                / denominator.to_f32().ok_or(Error::ConvertToF32)?)
        };
        Ok(Self {
            x: ratio(original.0, input.0)?,
            y: ratio(original.1, input.1)?,
        })
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Sizes the network sees for a given source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputGeometry {
    pub image_width: usize,
    pub image_height: usize,
    pub input_width: usize,
    pub input_height: usize,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl InputGeometry {
    /// The input is the largest multiple of `output_stride` not exceeding the image, plus
    /// one, so that grid cells land exactly on input pixels.
    pub fn for_image(
        image_width: usize,
        image_height: usize,
        output_stride: u8,
    ) -> Result<Self, Error> {
        let stride = usize::from(output_stride);
        if stride == 0 {
            return Err(Error::InvalidConfig("output stride must be positive"));
        }
        if image_width < stride || image_height < stride {
            return Err(Error::ImageTooSmall {
                width: image_width,
                height: image_height,
                stride,
            });
        }
        let input_width = image_width / stride * stride + 1;
        let input_height = image_height / stride * stride + 1;
        Ok(Self {
            image_width,
            image_height,
            input_width,
            input_height,
            grid_width: 1 + (input_width - 1) / stride,
            grid_height: 1 + (input_height - 1) / stride,
        })
    }

    pub fn scale(&self) -> Result<Scale, Error> {
        Scale::between(
            (self.image_width, self.image_height),
            (self.input_width, self.input_height),
        )
    }
}
