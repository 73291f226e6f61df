//! Image handling for the OpenAI nodes
//!
//! Provides:
//! - The normalized tensor exchanged with the host graph
//! - PNG/base64 conversion in both directions
//! - Model, size, quality and style choices

pub mod codec;
mod models;
mod tensor;

pub use codec::{
    CodecError, decode_base64_image, encode_png_base64, image_to_tensor, png_data_url,
    read_image_file, tensor_to_image, write_png_file,
};
pub use models::{ImageModel, ImageQuality, ImageSize, ImageStyle, VisionModel};
pub use tensor::{BATCH_SIZE, ImageTensor};
