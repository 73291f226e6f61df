//! Node handlers
//!
//! Each node turns one set of inputs into one output with a single round of
//! remote calls. The generation node optionally refines its prompt with the
//! vision model before generating; both nodes share the client setup and the
//! vision call defined here.

mod describe;
mod generate;
pub mod refine;
mod schema;

pub use describe::{DescribeImageInputs, DescribeImageNode};
pub use generate::{GenerateImageInputs, GenerateImageNode, build_generation_request, resolve_size};
pub use refine::{funko_meta_prompt, refine_prompt};
pub use schema::{InputKind, InputSpec, NodeInputs, NodeRegistry, NodeSchema, OutputKind, OutputSpec};

use crate::api::{ChatRequest, OpenAiClient};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::image::{VisionModel, png_data_url};

/// Build a client for one invocation, failing before any I/O if the key is blank
pub(crate) fn connect(config: &ApiConfig, api_key: &str) -> Result<OpenAiClient> {
    if api_key.trim().is_empty() {
        return Err(Error::MissingApiKey);
    }
    OpenAiClient::builder().config(config).api_key(api_key).build()
}

/// Ask the vision model about one PNG image; `None` when it answered with nothing
pub(crate) async fn ask_vision(
    client: &OpenAiClient,
    model: VisionModel,
    text: &str,
    image_b64: &str,
) -> Result<Option<String>> {
    let request = ChatRequest::vision(model, text, png_data_url(image_b64));
    let response = client.chat_completion(&request).await?;
    Ok(response.first_text().map(str::to_string))
}

/// First `max` characters of a prompt, for log lines
pub(crate) fn truncate_for_log(prompt: &str, max: usize) -> &str {
    match prompt.char_indices().nth(max) {
        Some((idx, _)) => &prompt[..idx],
        None => prompt,
    }
}
