//! Node parameter schemas and the registry handed to the host
//!
//! The host renders one control per input and passes values back by name.
//! Schemas serialize to JSON so a host written in any language can read them.

use serde::Serialize;

use crate::config::API_KEY_ENV;

use super::{DescribeImageNode, GenerateImageNode};

/// Control type of one input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum InputKind {
    #[serde(rename = "STRING")]
    String { multiline: bool, default: String },
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "CHOICE")]
    Choice {
        options: Vec<&'static str>,
        default: &'static str,
    },
}

/// One named input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputSpec {
    pub fn string(name: &'static str, multiline: bool, default: &str) -> Self {
        Self {
            name,
            kind: InputKind::String {
                multiline,
                default: default.to_string(),
            },
        }
    }

    pub fn image(name: &'static str) -> Self {
        Self {
            name,
            kind: InputKind::Image,
        }
    }

    pub fn choice(
        name: &'static str,
        options: impl IntoIterator<Item = &'static str>,
        default: &'static str,
    ) -> Self {
        Self {
            name,
            kind: InputKind::Choice {
                options: options.into_iter().collect(),
                default,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInputs {
    pub required: Vec<InputSpec>,
    pub optional: Vec<InputSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputKind {
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "STRING")]
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: OutputKind,
}

/// Everything the host needs to register and render one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSchema {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub function: &'static str,
    pub inputs: NodeInputs,
    pub outputs: Vec<OutputSpec>,
}

impl NodeSchema {
    /// Look up an input by name, required first
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs
            .required
            .iter()
            .chain(&self.inputs.optional)
            .find(|input| input.name == name)
    }
}

/// Schemas of all nodes this crate provides
#[derive(Debug, Clone, Serialize)]
pub struct NodeRegistry {
    nodes: Vec<NodeSchema>,
}

impl NodeRegistry {
    /// Registry whose `api_key` fields default to `default_api_key`
    pub fn new(default_api_key: &str) -> Self {
        Self {
            nodes: vec![
                GenerateImageNode::schema(default_api_key),
                DescribeImageNode::schema(default_api_key),
            ],
        }
    }

    /// Registry with the `api_key` default taken from the environment
    pub fn from_env() -> Self {
        let key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::new(&key)
    }

    pub fn nodes(&self) -> &[NodeSchema] {
        &self.nodes
    }

    pub fn get(&self, class_name: &str) -> Option<&NodeSchema> {
        self.nodes.iter().find(|node| node.class_name == class_name)
    }

    /// Class name to display name pairs
    pub fn display_names(&self) -> Vec<(&'static str, &'static str)> {
        self.nodes
            .iter()
            .map(|node| (node.class_name, node.display_name))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
