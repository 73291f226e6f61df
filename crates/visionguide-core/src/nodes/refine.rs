//! Prompt refinement with a vision model
//!
//! Rewrites the user's hint into a generation prompt describing the input
//! image's subject as a vinyl collectible figure. Only a rejected credential
//! stops the request; every other failure keeps the original prompt.

use tracing::{info, warn};

use crate::api::OpenAiClient;
use crate::error::{Error, Result};
use crate::image::VisionModel;

use super::{ask_vision, truncate_for_log};

/// Meta-prompt sent to the vision model alongside the input image
pub fn funko_meta_prompt(hint: &str) -> String {
    format!(
        "Analyze the provided image and the user's text hint ('{hint}'). \
         Based *primarily* on the visual content of the image, create a detailed DALL-E prompt \
         describing a stylized Funko Pop vinyl figure version of the main subject in the image. \
         The figure should have Funko Pop characteristics: large oversized head, small body, \
         matte plastic texture, black beady eyes, simplified cartoon-like features, and typically no mouth. \
         Describe the figure's pose, clothing, and key features based on the image. \
         The final prompt should focus on the figure itself and suggest a simple background like a product shot \
         (e.g., plain white background)."
    )
}

/// Produce the generation prompt for an already-encoded input image
///
/// Returns the vision model's trimmed answer, or `hint` unchanged when the
/// call fails or comes back empty. Fails only with [`Error::Authentication`].
pub async fn refine_prompt(
    client: &OpenAiClient,
    model: VisionModel,
    image_b64: &str,
    hint: &str,
) -> Result<String> {
    info!(vision_model = %model, "Input image provided, refining prompt with vision model");

    match ask_vision(client, model, &funko_meta_prompt(hint), image_b64).await {
        Ok(Some(refined)) => {
            info!(
                vision_model = %model,
                prompt = truncate_for_log(&refined, 100),
                "Refined prompt from vision model"
            );
            Ok(refined)
        }
        Ok(None) => {
            warn!(
                vision_model = %model,
                "Vision model did not return a refined prompt, using original prompt"
            );
            Ok(hint.to_string())
        }
        Err(err @ Error::Authentication(_)) => Err(err),
        Err(err) => {
            warn!(
                vision_model = %model,
                error = %err,
                "Vision call failed, falling back to original prompt"
            );
            Ok(hint.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_prompt_embeds_hint() {
        let prompt = funko_meta_prompt("make it a wizard");
        assert!(prompt.contains("user's text hint ('make it a wizard')"));
        assert!(prompt.contains("Funko Pop vinyl figure"));
        assert!(prompt.contains("typically no mouth"));
        assert!(prompt.contains("plain white background"));
    }

    #[test]
    fn test_meta_prompt_is_single_paragraph() {
        let prompt = funko_meta_prompt("hint");
        assert!(!prompt.contains('\n'));
        assert!(!prompt.contains("  "));
    }
}
