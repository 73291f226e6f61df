//! Model and parameter choices
//!
//! Every user-facing choice is a closed enum with a wire string, a parser and
//! the option list the node schema advertises.

use serde::{Deserialize, Serialize};

/// Image generation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageModel {
    /// DALL-E 3, supports quality and style
    #[default]
    #[serde(rename = "dall-e-3")]
    DallE3,
    /// DALL-E 2, the legacy model
    #[serde(rename = "dall-e-2")]
    DallE2,
}

impl ImageModel {
    /// Choices in the order the node schema lists them
    pub const ALL: [Self; 2] = [Self::DallE3, Self::DallE2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DallE3 => "dall-e-3",
            Self::DallE2 => "dall-e-2",
        }
    }

    /// Parse from string (e.g., "dall-e-3", "dalle2")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dall-e-3" | "dalle-3" | "dalle3" => Some(Self::DallE3),
            "dall-e-2" | "dalle-2" | "dalle2" => Some(Self::DallE2),
            _ => None,
        }
    }

    /// Whether `quality` and `style` are sent for this model
    pub fn supports_quality_and_style(&self) -> bool {
        matches!(self, Self::DallE3)
    }

    /// Whether the API accepts `size` for this model
    pub fn supports_size(&self, size: ImageSize) -> bool {
        match self {
            Self::DallE3 => matches!(
                size,
                ImageSize::Square1024 | ImageSize::Landscape | ImageSize::Portrait
            ),
            Self::DallE2 => matches!(
                size,
                ImageSize::Square1024 | ImageSize::Square512 | ImageSize::Square256
            ),
        }
    }
}

impl std::fmt::Display for ImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vision-capable chat model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VisionModel {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
}

impl VisionModel {
    pub const ALL: [Self; 2] = [Self::Gpt4o, Self::Gpt4Turbo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4Turbo => "gpt-4-turbo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gpt-4o" | "gpt4o" => Some(Self::Gpt4o),
            "gpt-4-turbo" | "gpt4-turbo" => Some(Self::Gpt4Turbo),
            _ => None,
        }
    }
}

impl std::fmt::Display for VisionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering quality (DALL-E 3 only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Standard,
    Hd,
}

impl ImageQuality {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Hd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "hd" => Some(Self::Hd),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image style presets (DALL-E 3 only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    /// Hyper-real, dramatic images
    #[default]
    Vivid,
    /// More natural, less hyper-real images
    Natural,
}

impl ImageStyle {
    pub const ALL: [Self; 2] = [Self::Vivid, Self::Natural];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vivid => "vivid",
            Self::Natural => "natural",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vivid" => Some(Self::Vivid),
            "natural" => Some(Self::Natural),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageSize {
    /// 1024x1024 square image
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    /// 1792x1024 landscape image
    #[serde(rename = "1792x1024")]
    Landscape,
    /// 1024x1792 portrait image
    #[serde(rename = "1024x1792")]
    Portrait,
    /// 512x512 square image (DALL-E 2)
    #[serde(rename = "512x512")]
    Square512,
    /// 256x256 square image (DALL-E 2)
    #[serde(rename = "256x256")]
    Square256,
}

impl ImageSize {
    /// Sizes offered by the generation node
    pub const NODE_CHOICES: [Self; 3] = [Self::Square1024, Self::Landscape, Self::Portrait];

    /// Get width and height as a tuple
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Square1024 => (1024, 1024),
            Self::Landscape => (1792, 1024),
            Self::Portrait => (1024, 1792),
            Self::Square512 => (512, 512),
            Self::Square256 => (256, 256),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square1024 => "1024x1024",
            Self::Landscape => "1792x1024",
            Self::Portrait => "1024x1792",
            Self::Square512 => "512x512",
            Self::Square256 => "256x256",
        }
    }

    /// Parse from string (e.g., "square", "landscape", "1024x1792")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "square" | "1024x1024" => Some(Self::Square1024),
            "landscape" | "1792x1024" => Some(Self::Landscape),
            "portrait" | "1024x1792" => Some(Self::Portrait),
            "512x512" => Some(Self::Square512),
            "256x256" => Some(Self::Square256),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches_wire_names() {
        for model in ImageModel::ALL {
            assert_eq!(ImageModel::parse(model.as_str()), Some(model));
        }
        for model in VisionModel::ALL {
            assert_eq!(VisionModel::parse(model.as_str()), Some(model));
        }
        for quality in ImageQuality::ALL {
            assert_eq!(ImageQuality::parse(quality.as_str()), Some(quality));
        }
        for style in ImageStyle::ALL {
            assert_eq!(ImageStyle::parse(style.as_str()), Some(style));
        }
        assert_eq!(ImageSize::parse("PORTRAIT"), Some(ImageSize::Portrait));
        assert_eq!(ImageSize::parse("640x480"), None);
    }

    #[test]
    fn test_serde_uses_api_strings() {
        assert_eq!(serde_json::to_string(&ImageModel::DallE2).unwrap(), "\"dall-e-2\"");
        assert_eq!(serde_json::to_string(&VisionModel::Gpt4Turbo).unwrap(), "\"gpt-4-turbo\"");
        assert_eq!(serde_json::to_string(&ImageQuality::Hd).unwrap(), "\"hd\"");
        assert_eq!(serde_json::to_string(&ImageSize::Landscape).unwrap(), "\"1792x1024\"");
    }

    #[test]
    fn test_legacy_model_size_support() {
        assert!(ImageModel::DallE2.supports_size(ImageSize::Square1024));
        assert!(ImageModel::DallE2.supports_size(ImageSize::Square256));
        assert!(!ImageModel::DallE2.supports_size(ImageSize::Landscape));
        assert!(!ImageModel::DallE2.supports_size(ImageSize::Portrait));
        assert!(ImageModel::DallE3.supports_size(ImageSize::Portrait));
        assert!(!ImageModel::DallE2.supports_quality_and_style());
    }

    #[test]
    fn test_dimensions_match_display() {
        for size in ImageSize::NODE_CHOICES {
            let (w, h) = size.dimensions();
            assert_eq!(size.to_string(), format!("{}x{}", w, h));
        }
    }
}
