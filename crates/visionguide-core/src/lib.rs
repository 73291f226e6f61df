//! visionguide Core Library
//!
//! This crate provides the two OpenAI nodes for node-graph image tools:
//! - Image generation (DALL-E 3 / DALL-E 2), with optional prompt refinement
//!   from an input image through a vision model
//! - Image description through a vision model
//!
//! Supporting pieces:
//! - Normalized image tensors and PNG/base64 conversion
//! - An OpenAI HTTP client for the images and chat completions endpoints
//! - Node parameter schemas for host registration
//! - File-backed configuration

pub mod api;
pub mod config;
pub mod error;
pub mod image;
pub mod nodes;

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::image::{
        ImageModel, ImageQuality, ImageSize, ImageStyle, ImageTensor, VisionModel,
    };
    pub use crate::nodes::{
        DescribeImageInputs, DescribeImageNode, GenerateImageInputs, GenerateImageNode,
        NodeRegistry,
    };
}
