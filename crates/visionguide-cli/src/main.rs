//! visionguide CLI - run the OpenAI image nodes from a terminal

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use visionguide_core::config::{API_KEY_ENV, Config};
use visionguide_core::image::{
    ImageModel, ImageQuality, ImageSize, ImageStyle, VisionModel, read_image_file, write_png_file,
};
use visionguide_core::nodes::{
    DescribeImageInputs, DescribeImageNode, GenerateImageInputs, GenerateImageNode, NodeRegistry,
};

#[derive(Parser)]
#[command(name = "visionguide")]
#[command(author, version, about = "OpenAI image generation and description nodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image, optionally guided by an input image
    Generate {
        /// Text prompt (used as a hint when --input-image is given)
        #[arg(short, long, default_value = "A cute cat astronaut floating in space")]
        prompt: String,
        /// Where to write the generated PNG
        #[arg(short, long, default_value = "generated.png")]
        output: PathBuf,
        /// Image model (dall-e-3, dall-e-2)
        #[arg(short, long, value_parser = parse_image_model)]
        model: Option<ImageModel>,
        /// Quality (standard, hd)
        #[arg(long, value_parser = parse_quality)]
        quality: Option<ImageQuality>,
        /// Size (1024x1024, 1792x1024, 1024x1792)
        #[arg(short, long, value_parser = parse_size)]
        size: Option<ImageSize>,
        /// Style (vivid, natural)
        #[arg(long, value_parser = parse_style)]
        style: Option<ImageStyle>,
        /// Image whose subject guides the prompt
        #[arg(short, long)]
        input_image: Option<PathBuf>,
        /// Vision model used to refine the prompt (gpt-4o, gpt-4-turbo)
        #[arg(long, value_parser = parse_vision_model)]
        vision_model: Option<VisionModel>,
        /// OpenAI API key (defaults to OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Describe an image with a vision model
    Describe {
        /// Image file to describe
        image: PathBuf,
        /// Question or instruction for the vision model
        #[arg(short, long, default_value = "Describe the person in this image")]
        prompt: String,
        /// Vision model (gpt-4o, gpt-4-turbo)
        #[arg(short, long, value_parser = parse_vision_model)]
        model: Option<VisionModel>,
        /// OpenAI API key (defaults to OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Print the node schemas as JSON
    Nodes,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

fn parse_image_model(s: &str) -> Result<ImageModel, String> {
    ImageModel::parse(s).ok_or_else(|| format!("unknown image model '{s}'"))
}

fn parse_vision_model(s: &str) -> Result<VisionModel, String> {
    VisionModel::parse(s).ok_or_else(|| format!("unknown vision model '{s}'"))
}

fn parse_quality(s: &str) -> Result<ImageQuality, String> {
    ImageQuality::parse(s).ok_or_else(|| format!("unknown quality '{s}'"))
}

fn parse_size(s: &str) -> Result<ImageSize, String> {
    ImageSize::parse(s).ok_or_else(|| format!("unknown size '{s}'"))
}

fn parse_style(s: &str) -> Result<ImageStyle, String> {
    ImageStyle::parse(s).ok_or_else(|| format!("unknown style '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing on stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("visionguide=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prompt,
            output,
            model,
            quality,
            size,
            style,
            input_image,
            vision_model,
            api_key,
        } => {
            let config = Config::load()?;
            let defaults = &config.defaults;
            let mut inputs = GenerateImageInputs::new(resolve_api_key(api_key), prompt)
                .with_model(model.unwrap_or(defaults.image_model))
                .with_quality(quality.unwrap_or(defaults.quality))
                .with_size(size.unwrap_or(defaults.size))
                .with_style(style.unwrap_or(defaults.style))
                .with_vision_model(vision_model.unwrap_or(defaults.vision_model));
            if let Some(path) = input_image {
                inputs = inputs.with_input_image(load_image(&path)?);
            }
            cmd_generate(&config, &inputs, &output, cli.quiet).await
        }

        Commands::Describe {
            image,
            prompt,
            model,
            api_key,
        } => {
            let config = Config::load()?;
            let inputs = DescribeImageInputs::new(resolve_api_key(api_key), load_image(&image)?)
                .with_prompt(prompt)
                .with_model(model.unwrap_or(config.defaults.vision_model));
            cmd_describe(&config, &inputs).await
        }

        Commands::Nodes => cmd_nodes(),

        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

/// Key from the flag, then the environment; empty when neither is set
fn resolve_api_key(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var(API_KEY_ENV).ok())
        .unwrap_or_default()
}

fn load_image(path: &Path) -> anyhow::Result<visionguide_core::image::ImageTensor> {
    let tensor = read_image_file(path)
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    debug!(
        path = %path.display(),
        width = tensor.width(),
        height = tensor.height(),
        channels = tensor.channels(),
        "Loaded input image"
    );
    Ok(tensor)
}

/// Print the error code and suggestion along with the message
fn report(err: visionguide_core::Error) -> anyhow::Error {
    match err.suggestion() {
        Some(hint) => anyhow!("[{}] {}\n  hint: {}", err.code(), err, hint),
        None => anyhow!("[{}] {}", err.code(), err),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_generate(
    config: &Config,
    inputs: &GenerateImageInputs,
    output: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let node = GenerateImageNode::new(config.api.clone());
    let tensor = node.generate_image(inputs).await.map_err(report)?;

    write_png_file(&tensor, output)
        .with_context(|| format!("Failed to write image: {}", output.display()))?;
    info!(path = %output.display(), "Saved generated image");

    if !quiet {
        println!(
            "Saved {}x{} image to {}",
            tensor.width(),
            tensor.height(),
            output.display()
        );
    }
    Ok(())
}

async fn cmd_describe(config: &Config, inputs: &DescribeImageInputs) -> anyhow::Result<()> {
    let node = DescribeImageNode::new(config.api.clone());
    let description = node.describe_image(inputs).await.map_err(report)?;
    println!("{}", description);
    Ok(())
}

fn cmd_nodes() -> anyhow::Result<()> {
    let registry = NodeRegistry::from_env();
    let json = serde_json::to_string_pretty(&registry.to_json()?)?;
    println!("{}", json);
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
