//! OpenAI API integration
//!
//! This module provides:
//! - An HTTP client for the images and chat completions endpoints
//! - Request/response types matching the OpenAI wire format

mod client;
mod types;

pub use client::{OPENAI_BASE_URL, OpenAiClient, OpenAiClientBuilder};
pub use types::{
    ApiErrorBody, ApiErrorDetail, ChatRequest, ChatResponse, Choice, ContentPart, IMAGE_DETAIL,
    ImageData, ImageGenerationRequest, ImageGenerationResponse, ImageUrl, Message, MessageRole,
    ResponseFormat, ResponseMessage, VISION_MAX_TOKENS,
};
