//! Normalized image tensor
//!
//! The boundary representation exchanged with the host graph: `f32` samples in
//! `[0, 1]`, laid out `[batch, height, width, channels]` with a batch of one.

use crate::error::{Error, Result};

/// Batch size of every tensor crossing a node boundary
pub const BATCH_SIZE: usize = 1;

/// Dense normalized pixel data with an implicit batch dimension of one
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl ImageTensor {
    /// Create a tensor from channel-last samples
    ///
    /// `data.len()` must equal `height * width * channels`. Channels must be
    /// 1 (gray), 2 (gray + alpha), 3 (RGB) or 4 (RGBA).
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        let expected = sample_count(height, width, channels)?;
        if data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "Tensor data has {} samples, shape [1, {}, {}, {}] needs {}",
                data.len(),
                height,
                width,
                channels,
                expected
            )));
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Build a tensor by evaluating `f(y, x, c)` for every sample
    pub fn from_fn(
        height: usize,
        width: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> f32,
    ) -> Result<Self> {
        let mut data = Vec::with_capacity(sample_count(height, width, channels)?);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(y, x, c));
                }
            }
        }
        Self::new(height, width, channels, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Full shape including the batch dimension
    pub fn shape(&self) -> [usize; 4] {
        [BATCH_SIZE, self.height, self.width, self.channels]
    }

    /// Channel-last samples without the batch dimension
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sample at row `y`, column `x`, channel `c`
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= self.channels {
            return None;
        }
        self.data
            .get((y * self.width + x) * self.channels + c)
            .copied()
    }

    /// Quantize to 8-bit the way the encoder does: scale, clip, truncate
    pub fn to_u8(&self) -> Vec<u8> {
        self.data.iter().map(|&v| quantize(v)).collect()
    }
}

/// Map a normalized sample to a byte, clipping out-of-range and NaN values
pub(crate) fn quantize(value: f32) -> u8 {
    let scaled = 255.0 * value;
    if scaled.is_nan() {
        return 0;
    }
    // `as` truncates toward zero, matching a clip-then-cast
    scaled.clamp(0.0, 255.0) as u8
}

/// Number of samples a shape needs, rejecting empty, unsupported or overflowing shapes
fn sample_count(height: usize, width: usize, channels: usize) -> Result<usize> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidInput(format!(
            "Image tensor must not be empty (got {}x{})",
            width, height
        )));
    }
    if !(1..=4).contains(&channels) {
        return Err(Error::InvalidInput(format!(
            "Unsupported channel count {}. Use 1, 2, 3 or 4",
            channels
        )));
    }
    height
        .checked_mul(width)
        .and_then(|n| n.checked_mul(channels))
        .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f32>())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Tensor shape [1, {}, {}, {}] is too large",
                height, width, channels
            ))
        })
}
