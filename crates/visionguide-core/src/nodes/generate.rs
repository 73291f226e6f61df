//! Image generation node

use tracing::{debug, info, warn};

use crate::api::ImageGenerationRequest;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::image::{
    ImageModel, ImageQuality, ImageSize, ImageStyle, ImageTensor, VisionModel,
    decode_base64_image, encode_png_base64,
};

use super::schema::{InputSpec, NodeInputs, NodeSchema, OutputKind, OutputSpec};
use super::{connect, refine_prompt, truncate_for_log};

/// Default text in the prompt field
pub const DEFAULT_PROMPT: &str = "A cute cat astronaut floating in space";

/// Inputs of one generation run
#[derive(Debug, Clone)]
pub struct GenerateImageInputs {
    pub api_key: String,
    pub prompt: String,
    pub model: ImageModel,
    pub quality: ImageQuality,
    pub size: ImageSize,
    pub input_image: Option<ImageTensor>,
    pub vision_model: VisionModel,
    pub style: ImageStyle,
}

impl GenerateImageInputs {
    /// Inputs with every choice at its default
    pub fn new(api_key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            prompt: prompt.into(),
            model: ImageModel::default(),
            quality: ImageQuality::default(),
            size: ImageSize::default(),
            input_image: None,
            vision_model: VisionModel::default(),
            style: ImageStyle::default(),
        }
    }

    pub fn with_model(mut self, model: ImageModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_input_image(mut self, image: ImageTensor) -> Self {
        self.input_image = Some(image);
        self
    }

    pub fn with_vision_model(mut self, model: VisionModel) -> Self {
        self.vision_model = model;
        self
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }
}

/// Size actually sent for `model`
///
/// The legacy model only takes square sizes; anything else is replaced by
/// 1024x1024 rather than rejected. DALL-E 3 sizes outside its presets are
/// rejected before any request is made.
pub fn resolve_size(model: ImageModel, size: ImageSize) -> Result<ImageSize> {
    if model.supports_size(size) {
        return Ok(size);
    }
    match model {
        ImageModel::DallE2 => {
            warn!(
                size = %size,
                "Size not standard for DALL-E 2, defaulting to 1024x1024"
            );
            Ok(ImageSize::Square1024)
        }
        ImageModel::DallE3 => Err(Error::InvalidInput(format!(
            "Size {} is not supported by {}. Use 1024x1024, 1792x1024 or 1024x1792",
            size, model
        ))),
    }
}

/// Request body for one generation call
pub fn build_generation_request(
    model: ImageModel,
    prompt: &str,
    size: ImageSize,
    quality: ImageQuality,
    style: ImageStyle,
) -> Result<ImageGenerationRequest> {
    let request = ImageGenerationRequest::new(model, prompt, resolve_size(model, size)?);
    Ok(if model.supports_quality_and_style() {
        request.with_quality(quality).with_style(style)
    } else {
        request
    })
}

/// "OpenAI DALL-E 3 Vision Guide" node
#[derive(Debug, Clone, Default)]
pub struct GenerateImageNode {
    config: ApiConfig,
}

impl GenerateImageNode {
    pub const CLASS_NAME: &'static str = "OpenAIDalle3Node";
    pub const DISPLAY_NAME: &'static str = "OpenAI DALL-E 3 Vision Guide";

    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Parameter schema shown by the host
    pub fn schema(default_api_key: &str) -> NodeSchema {
        NodeSchema {
            class_name: Self::CLASS_NAME,
            display_name: Self::DISPLAY_NAME,
            category: "OpenAI",
            function: "generate_image",
            inputs: NodeInputs {
                required: vec![
                    InputSpec::string("api_key", false, default_api_key),
                    InputSpec::string("prompt", true, DEFAULT_PROMPT),
                    InputSpec::choice(
                        "model",
                        ImageModel::ALL.map(|m| m.as_str()),
                        ImageModel::default().as_str(),
                    ),
                    InputSpec::choice(
                        "quality",
                        ImageQuality::ALL.map(|q| q.as_str()),
                        ImageQuality::default().as_str(),
                    ),
                    InputSpec::choice(
                        "size",
                        ImageSize::NODE_CHOICES.map(|s| s.as_str()),
                        ImageSize::default().as_str(),
                    ),
                ],
                optional: vec![
                    InputSpec::image("input_image"),
                    InputSpec::choice(
                        "vision_model",
                        VisionModel::ALL.map(|m| m.as_str()),
                        VisionModel::default().as_str(),
                    ),
                    InputSpec::choice(
                        "style",
                        ImageStyle::ALL.map(|s| s.as_str()),
                        ImageStyle::default().as_str(),
                    ),
                ],
            },
            outputs: vec![OutputSpec {
                name: "generated_image",
                kind: OutputKind::Image,
            }],
        }
    }

    /// Generate one image, refining the prompt from `input_image` when given
    pub async fn generate_image(&self, inputs: &GenerateImageInputs) -> Result<ImageTensor> {
        let client = connect(&self.config, &inputs.api_key)?;
        let size = resolve_size(inputs.model, inputs.size)?;

        let prompt = match &inputs.input_image {
            Some(image) => {
                let image_b64 = encode_png_base64(image)?;
                refine_prompt(&client, inputs.vision_model, &image_b64, &inputs.prompt).await?
            }
            None => inputs.prompt.clone(),
        };

        info!(
            model = %inputs.model,
            prompt = truncate_for_log(&prompt, 100),
            "Generating image"
        );

        let request = build_generation_request(
            inputs.model,
            &prompt,
            size,
            inputs.quality,
            inputs.style,
        )?;
        let response = client.generate_image(&request).await?;

        if let Some(revised) = response.revised_prompt() {
            debug!(
                prompt = truncate_for_log(revised, 100),
                "Model revised the prompt"
            );
        }

        let b64 = response
            .first_b64()
            .ok_or_else(|| Error::EmptyResult("OpenAI API did not return image data.".to_string()))?;

        let tensor = decode_base64_image(b64)?;
        let (width, height) = size.dimensions();
        if (tensor.width(), tensor.height()) != (width as usize, height as usize) {
            warn!(
                requested = %size,
                width = tensor.width(),
                height = tensor.height(),
                "Generated image size differs from the requested size"
            );
        }
        info!(
            width = tensor.width(),
            height = tensor.height(),
            "Image generated"
        );
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_model_coerces_unsupported_size() {
        assert_eq!(resolve_size(ImageModel::DallE2, ImageSize::Landscape).unwrap(), ImageSize::Square1024);
        assert_eq!(resolve_size(ImageModel::DallE2, ImageSize::Portrait).unwrap(), ImageSize::Square1024);
        assert_eq!(resolve_size(ImageModel::DallE2, ImageSize::Square512).unwrap(), ImageSize::Square512);
        assert_eq!(resolve_size(ImageModel::DallE3, ImageSize::Landscape).unwrap(), ImageSize::Landscape);
    }

    #[test]
    fn test_dalle3_rejects_legacy_sizes() {
        for size in [ImageSize::Square512, ImageSize::Square256] {
            let err = resolve_size(ImageModel::DallE3, size).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
            assert!(err.to_string().contains("not supported by dall-e-3"));
        }
        assert!(
            build_generation_request(
                ImageModel::DallE3,
                "a fox",
                ImageSize::Square256,
                ImageQuality::Standard,
                ImageStyle::Vivid,
            )
            .is_err()
        );
    }

    #[test]
    fn test_quality_and_style_only_for_dalle3() {
        let dalle3 = build_generation_request(
            ImageModel::DallE3,
            "a fox",
            ImageSize::Portrait,
            ImageQuality::Hd,
            ImageStyle::Natural,
        )
        .unwrap();
        assert_eq!(dalle3.quality, Some(ImageQuality::Hd));
        assert_eq!(dalle3.style, Some(ImageStyle::Natural));
        assert_eq!(dalle3.n, 1);

        let dalle2 = build_generation_request(
            ImageModel::DallE2,
            "a fox",
            ImageSize::Portrait,
            ImageQuality::Hd,
            ImageStyle::Natural,
        )
        .unwrap();
        assert_eq!(dalle2.quality, None);
        assert_eq!(dalle2.style, None);
        assert_eq!(dalle2.size, ImageSize::Square1024);
        assert_eq!(dalle2.n, 1);
    }

    #[test]
    fn test_inputs_defaults() {
        let inputs = GenerateImageInputs::new("sk-test", DEFAULT_PROMPT);
        assert_eq!(inputs.model, ImageModel::DallE3);
        assert_eq!(inputs.quality, ImageQuality::Standard);
        assert_eq!(inputs.size, ImageSize::Square1024);
        assert_eq!(inputs.vision_model, VisionModel::Gpt4o);
        assert_eq!(inputs.style, ImageStyle::Vivid);
        assert!(inputs.input_image.is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_refinement() {
        let node = GenerateImageNode::default();
        let image = ImageTensor::new(1, 1, 3, vec![0.5; 3]).unwrap();
        let inputs = GenerateImageInputs::new("", "a fox").with_input_image(image);

        let err = node.generate_image(&inputs).await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }

    #[tokio::test]
    async fn test_unsupported_size_fails_before_any_request() {
        let node = GenerateImageNode::new(ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        });
        let image = ImageTensor::new(1, 1, 3, vec![0.5; 3]).unwrap();
        let inputs = GenerateImageInputs::new("sk-test", "a fox")
            .with_size(ImageSize::Square512)
            .with_input_image(image);

        let err = node.generate_image(&inputs).await.unwrap_err();
        assert_eq!(err.code(), "E800");
    }
}
