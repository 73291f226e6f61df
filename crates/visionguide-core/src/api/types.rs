//! Wire types for the OpenAI images and chat completions endpoints

use serde::{Deserialize, Serialize};

use crate::image::{ImageModel, ImageQuality, ImageSize, ImageStyle, VisionModel};

/// Token cap for vision responses
pub const VISION_MAX_TOKENS: u32 = 300;

/// Detail level requested for every attached image
pub const IMAGE_DETAIL: &str = "high";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// One part of a multi-part message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference inside a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image part at high detail
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: Some(IMAGE_DETAIL.to_string()),
            },
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentPart>,
}

impl Message {
    /// Create a user message from parts
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }
}

/// Request body for chat completions
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: VisionModel,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: VisionModel, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            max_tokens: None,
        }
    }

    /// Single user turn asking about one PNG image
    pub fn vision(model: VisionModel, text: impl Into<String>, image_data_url: String) -> Self {
        Self::new(
            model,
            vec![Message::user(vec![
                ContentPart::text(text),
                ContentPart::image_url(image_data_url),
            ])],
        )
        .with_max_tokens(VISION_MAX_TOKENS)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response body from chat completions
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Trimmed text of the first choice, if it has any
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// How generated images are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    B64Json,
}

/// Request body for image generation
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub model: ImageModel,
    pub prompt: String,
    pub size: ImageSize,
    pub response_format: ResponseFormat,
    /// Always one; the endpoint only returns single images for DALL-E 3
    pub n: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<ImageQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
}

impl ImageGenerationRequest {
    pub fn new(model: ImageModel, prompt: impl Into<String>, size: ImageSize) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            size,
            response_format: ResponseFormat::B64Json,
            n: 1,
            quality: None,
            style: None,
        }
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }
}

/// Response body from image generation
#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

impl ImageGenerationResponse {
    /// Base64 payload of the first image, if present and non-empty
    pub fn first_b64(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|image| image.b64_json.as_deref())
            .filter(|b64| !b64.is_empty())
    }

    /// Prompt the model actually used for the first image, when it rewrote ours
    pub fn revised_prompt(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|image| image.revised_prompt.as_deref())
    }
}

/// Error envelope returned by the API on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vision_request_shape() {
        let request = ChatRequest::vision(
            VisionModel::Gpt4o,
            "Describe the person in this image",
            "data:image/png;base64,AAAA".to_string(),
        );
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Describe the person in this image"},
                        {
                            "type": "image_url",
                            "image_url": {"url": "data:image/png;base64,AAAA", "detail": "high"}
                        }
                    ]
                }],
                "max_tokens": 300
            })
        );
    }

    #[test]
    fn test_generation_request_omits_unset_options() {
        let request = ImageGenerationRequest::new(ImageModel::DallE2, "a cat", ImageSize::Square512);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "dall-e-2",
                "prompt": "a cat",
                "size": "512x512",
                "response_format": "b64_json",
                "n": 1
            })
        );
    }

    #[test]
    fn test_generation_request_with_options() {
        let request = ImageGenerationRequest::new(ImageModel::DallE3, "a cat", ImageSize::Portrait)
            .with_quality(ImageQuality::Hd)
            .with_style(ImageStyle::Natural);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["quality"], "hd");
        assert_eq!(body["style"], "natural");
        assert_eq!(body["size"], "1024x1792");
    }

    #[test]
    fn test_chat_response_first_text() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "  a figure  \n"}}]
        }))
        .unwrap();
        assert_eq!(response.first_text(), Some("a figure"));

        let blank: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "   "}}]
        }))
        .unwrap();
        assert_eq!(blank.first_text(), None);

        let missing: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(missing.first_text(), None);
    }

    #[test]
    fn test_image_response_first_b64() {
        let response: ImageGenerationResponse =
            serde_json::from_value(json!({"created": 1, "data": [{"b64_json": "iVBOR"}]})).unwrap();
        assert_eq!(response.first_b64(), Some("iVBOR"));

        let url_only: ImageGenerationResponse =
            serde_json::from_value(json!({"data": [{"url": "https://example.com/a.png"}]})).unwrap();
        assert_eq!(url_only.first_b64(), None);

        let empty: ImageGenerationResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_b64(), None);
    }

    #[test]
    fn test_image_response_revised_prompt() {
        let response: ImageGenerationResponse = serde_json::from_value(json!({
            "data": [{"b64_json": "iVBOR", "revised_prompt": "A vinyl fox figure"}]
        }))
        .unwrap();
        assert_eq!(response.revised_prompt(), Some("A vinyl fox figure"));

        let plain: ImageGenerationResponse =
            serde_json::from_value(json!({"data": [{"b64_json": "iVBOR"}]})).unwrap();
        assert_eq!(plain.revised_prompt(), None);
    }

    #[test]
    fn test_error_body_ignores_extra_fields() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "error": {"message": "Billing hard limit has been reached", "type": "invalid_request_error", "code": "billing_hard_limit_reached"}
        }))
        .unwrap();
        assert_eq!(body.error.message, "Billing hard limit has been reached");
    }
}
