//! Tensor <-> PNG/base64 conversion
//!
//! Encoding scales samples to bytes (clip, then truncate), drops the batch
//! dimension and writes a PNG. Decoding accepts any format the `image` crate
//! reads and normalizes back to `[0, 1]` with a batch of one.

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageBuffer, ImageFormat};
use thiserror::Error;

use crate::error::Error;

use super::tensor::ImageTensor;

/// Codec failures; every one of them is fatal for the current request
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("could not process image: {0}")]
    Image(#[from] image::ImageError),

    #[error("image dimensions {0}x{1} are out of range")]
    Dimensions(usize, usize),

    #[error("could not build a {channels}-channel image from tensor data")]
    Layout { channels: usize },
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Error::unexpected(err)
    }
}

/// Convert a tensor to an 8-bit image of the same channel layout
pub fn tensor_to_image(tensor: &ImageTensor) -> Result<DynamicImage, CodecError> {
    let (width, height) = (tensor.width(), tensor.height());
    let w = u32::try_from(width).map_err(|_| CodecError::Dimensions(width, height))?;
    let h = u32::try_from(height).map_err(|_| CodecError::Dimensions(width, height))?;
    let bytes = tensor.to_u8();
    let channels = tensor.channels();
    let layout = || CodecError::Layout { channels };

    let image = match channels {
        1 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, bytes).ok_or_else(layout)?),
        2 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(w, h, bytes).ok_or_else(layout)?),
        3 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, bytes).ok_or_else(layout)?),
        4 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, bytes).ok_or_else(layout)?),
        _ => return Err(layout()),
    };
    Ok(image)
}

/// Convert a decoded image into a normalized tensor
///
/// Wide or paletted color types are reduced to 8-bit gray, gray+alpha, RGB or
/// RGBA first, keeping whether the source had color and alpha.
pub fn image_to_tensor(image: DynamicImage) -> Result<ImageTensor, CodecError> {
    let color = image.color();
    let (width, height) = (image.width() as usize, image.height() as usize);
    let (channels, raw) = match (color.has_color(), color.has_alpha()) {
        (false, false) => (1, image.into_luma8().into_raw()),
        (false, true) => (2, image.into_luma_alpha8().into_raw()),
        (true, false) => (3, image.into_rgb8().into_raw()),
        (true, true) => (4, image.into_rgba8().into_raw()),
    };

    let data = raw.into_iter().map(|b| f32::from(b) / 255.0).collect();
    ImageTensor::new(height, width, channels, data)
        .map_err(|_| CodecError::Dimensions(width, height))
}

/// Encode a tensor as base64 PNG
pub fn encode_png_base64(tensor: &ImageTensor) -> Result<String, CodecError> {
    let image = tensor_to_image(tensor)?;
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(BASE64.encode(buffer.into_inner()))
}

/// Decode base64 image data (raw or `data:image/...;base64,` URL) into a tensor
pub fn decode_base64_image(data: &str) -> Result<ImageTensor, CodecError> {
    let payload = match data.split_once(',') {
        Some((header, body)) if header.starts_with("data:image") => body,
        _ => data,
    };
    let bytes = BASE64.decode(payload.trim())?;
    let image = image::load_from_memory(&bytes)?;
    image_to_tensor(image)
}

/// Wrap base64 PNG data as a data URL for vision requests
pub fn png_data_url(base64_png: &str) -> String {
    format!("data:image/png;base64,{}", base64_png)
}

/// Read an image file from disk into a tensor
pub fn read_image_file(path: &Path) -> Result<ImageTensor, CodecError> {
    let image = image::open(path)?;
    image_to_tensor(image)
}

/// Write a tensor to disk as PNG
pub fn write_png_file(tensor: &ImageTensor, path: &Path) -> Result<(), CodecError> {
    tensor_to_image(tensor)?.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic sample source covering the full [0, 1] range
    fn samples(seed: u32) -> impl FnMut(usize, usize, usize) -> f32 {
        let mut state = seed;
        move |_, _, _| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32
        }
    }

    #[test]
    fn test_round_trip_matches_quantized_input() {
        let shapes: [(usize, usize); 4] = [(1, 1), (7, 5), (3, 16), (11, 8)];
        for (i, &(h, w)) in shapes.iter().enumerate() {
            for c in 1..=4usize {
                let tensor = ImageTensor::from_fn(h, w, c, samples((i * 4 + c) as u32)).unwrap();
                let encoded = encode_png_base64(&tensor).unwrap();
                let decoded = decode_base64_image(&encoded).unwrap();

                assert_eq!(decoded.shape(), tensor.shape());
                for (got, quantized) in decoded.data().iter().zip(tensor.to_u8()) {
                    let expected = f32::from(quantized) / 255.0;
                    assert!((got - expected).abs() <= 1.0 / 255.0);
                }
            }
        }
    }

    #[test]
    fn test_encode_clips_out_of_range_values() {
        let tensor = ImageTensor::new(1, 3, 1, vec![-2.0, 0.5, 7.0]).unwrap();
        let decoded = decode_base64_image(&encode_png_base64(&tensor).unwrap()).unwrap();
        assert_eq!(decoded.data()[0], 0.0);
        assert_eq!(decoded.data()[1], 127.0 / 255.0);
        assert_eq!(decoded.data()[2], 1.0);
    }

    #[test]
    fn test_encoded_payload_is_png() {
        let tensor = ImageTensor::new(2, 2, 3, vec![0.25; 12]).unwrap();
        let bytes = BASE64.decode(encode_png_base64(&tensor).unwrap()).unwrap();
        assert!(bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_decode_accepts_data_url() {
        let tensor = ImageTensor::new(1, 1, 3, vec![1.0, 0.0, 0.0]).unwrap();
        let url = png_data_url(&encode_png_base64(&tensor).unwrap());
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = decode_base64_image(&url).unwrap();
        assert_eq!(decoded.data(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_decode_rejects_malformed_base64() {
        let err = decode_base64_image("not*base64!").unwrap_err();
        assert!(matches!(err, CodecError::Base64(_)));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        let err = decode_base64_image(&BASE64.encode(b"definitely not a png")).unwrap_err();
        assert!(matches!(err, CodecError::Image(_)));
    }

    #[test]
    fn test_codec_error_maps_to_unexpected() {
        let err: Error = decode_base64_image("%%%").unwrap_err().into();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unexpected);
        assert!(err.to_string().starts_with("An unexpected error occurred: "));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let tensor = ImageTensor::new(2, 1, 4, vec![0.0, 0.2, 0.4, 1.0, 1.0, 0.8, 0.6, 0.0])
            .unwrap();

        write_png_file(&tensor, &path).unwrap();
        let loaded = read_image_file(&path).unwrap();
        assert_eq!(loaded.shape(), [1, 2, 1, 4]);
        assert_eq!(loaded.to_u8(), tensor.to_u8());
    }
}
