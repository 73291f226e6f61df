//! Image description node

use tracing::info;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::image::{ImageTensor, VisionModel, encode_png_base64};

use super::schema::{InputSpec, NodeInputs, NodeSchema, OutputKind, OutputSpec};
use super::{ask_vision, connect};

/// Default text in the prompt field
pub const DEFAULT_PROMPT: &str = "Describe the person in this image";

/// Inputs of one description run
#[derive(Debug, Clone)]
pub struct DescribeImageInputs {
    pub api_key: String,
    pub image: ImageTensor,
    pub prompt: String,
    pub model: VisionModel,
}

impl DescribeImageInputs {
    pub fn new(api_key: impl Into<String>, image: ImageTensor) -> Self {
        Self {
            api_key: api_key.into(),
            image,
            prompt: DEFAULT_PROMPT.to_string(),
            model: VisionModel::default(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: VisionModel) -> Self {
        self.model = model;
        self
    }
}

/// "OpenAI Image Description" node
#[derive(Debug, Clone, Default)]
pub struct DescribeImageNode {
    config: ApiConfig,
}

impl DescribeImageNode {
    pub const CLASS_NAME: &'static str = "OpenAIImageDescriptionNode";
    pub const DISPLAY_NAME: &'static str = "OpenAI Image Description";

    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Parameter schema shown by the host
    pub fn schema(default_api_key: &str) -> NodeSchema {
        NodeSchema {
            class_name: Self::CLASS_NAME,
            display_name: Self::DISPLAY_NAME,
            category: "OpenAI",
            function: "describe_image",
            inputs: NodeInputs {
                required: vec![
                    InputSpec::string("api_key", false, default_api_key),
                    InputSpec::image("image"),
                    InputSpec::string("prompt", true, DEFAULT_PROMPT),
                    InputSpec::choice(
                        "model",
                        VisionModel::ALL.map(|m| m.as_str()),
                        VisionModel::default().as_str(),
                    ),
                ],
                optional: Vec::new(),
            },
            outputs: vec![OutputSpec {
                name: "description",
                kind: OutputKind::String,
            }],
        }
    }

    /// Describe the image, returning the model's trimmed answer
    pub async fn describe_image(&self, inputs: &DescribeImageInputs) -> Result<String> {
        let client = connect(&self.config, &inputs.api_key)?;
        let image_b64 = encode_png_base64(&inputs.image)?;

        info!(model = %inputs.model, "Describing image");

        ask_vision(&client, inputs.model, &inputs.prompt, &image_b64)
            .await?
            .ok_or_else(|| Error::EmptyResult("Vision model did not return a description.".to_string()))
    }
}
