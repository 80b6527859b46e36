use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pixelsmith::api;
use pixelsmith::models::{accelerator, AppConfig, Device, DevicePreference, DType};
use pixelsmith::rendering::{encode_indexed_png, encode_png, read_image};
use pixelsmith::server;
use pixelsmith::services::{
    downscale, quantize_palette_indexed, validate_size, CacheStatus, GenerateOptions,
    PaletteChoice, Pixelsmith, DEFAULT_NEGATIVE_PROMPT,
};

#[derive(Parser)]
#[command(name = "pixelsmith")]
#[command(about = "Pixelsmith - retro pixel art from text prompts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Generate a pixel art image from a prompt
    Generate {
        /// What to draw
        prompt: String,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output edge length in pixels (default: from config, 64)
        #[arg(short, long)]
        size: Option<u32>,

        /// Palette name: nes, gameboy, pico8 or c64
        #[arg(short, long)]
        palette: Option<String>,

        /// Seed for reproducible output (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Things the image should not look like
        #[arg(long, default_value = DEFAULT_NEGATIVE_PROMPT)]
        negative_prompt: String,
    },
    /// Quantize an existing PNG to a palette
    Quantize {
        /// Input PNG file path
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Palette name: nes, gameboy, pico8 or c64
        #[arg(short, long)]
        palette: String,

        /// Downscale to this edge length first
        #[arg(short, long)]
        size: Option<u32>,
    },
    /// List built-in palettes
    Palettes,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pixelsmith API",
        description = "Retro pixel art generation and palette quantization",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_generate,
        api::handle_quantize,
        api::handle_palettes,
        api::handle_unload,
        api::handle_status,
    ),
    components(schemas(
        api::GenerateRequest,
        api::QuantizeRequest,
        api::PaletteParam,
        api::PaletteInfo,
        api::PalettesResponse,
        api::UnloadResponse,
        api::StatusResponse,
        Device,
        DevicePreference,
        DType,
        CacheStatus,
    )),
    tags(
        (name = "Generation", description = "Image generation and quantization"),
        (name = "Palettes", description = "Built-in palettes"),
        (name = "Pipeline", description = "Loaded pipeline management")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Generate {
            prompt,
            output,
            size,
            palette,
            seed,
            negative_prompt,
        }) => {
            init_cli_logging();
            // The runtime client blocks, keep it off the async workers
            tokio::task::spawn_blocking(move || {
                run_generate_command(prompt, &output, size, palette, seed, negative_prompt)
            })
            .await?
        }
        Some(Commands::Quantize {
            input,
            output,
            palette,
            size,
        }) => {
            init_cli_logging();
            run_quantize_command(&input, &output, &palette, size)
        }
        Some(Commands::Palettes) => {
            run_palettes_command();
            Ok(())
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for one-shot commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelsmith=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Generate an image through the runtime and write it as PNG
fn run_generate_command(
    prompt: String,
    output: &Path,
    size: Option<u32>,
    palette: Option<String>,
    seed: Option<u64>,
    negative_prompt: String,
) -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Always pin a seed so the run can be repeated
    let seed = seed.unwrap_or_else(rand::random);
    let palette = palette
        .or_else(|| config.default_palette.clone())
        .map(PaletteChoice::Named);
    let size = size.unwrap_or(config.default_size);
    validate_size(size)?;

    let options = GenerateOptions::new(prompt)
        .size(size)
        .negative_prompt(negative_prompt)
        .palette(palette)
        .seed(Some(seed));

    let smith = Pixelsmith::with_remote_runtime(config.generation);
    println!("Generating on {} (seed {seed})...", smith.accelerator());

    let result = smith.generate(&options);
    smith.unload();
    let image = result?;

    let png_bytes = encode_png(&image)?;
    std::fs::write(output, &png_bytes)?;
    println!(
        "Generated {} ({}x{}, {} bytes)",
        output.display(),
        image.width(),
        image.height(),
        png_bytes.len()
    );

    Ok(())
}

/// Quantize a PNG file to a palette (no runtime needed)
fn run_quantize_command(
    input: &Path,
    output: &Path,
    palette: &str,
    size: Option<u32>,
) -> anyhow::Result<()> {
    if let Some(size) = size {
        validate_size(size)?;
    }
    let mut image = read_image(input)?;
    if let Some(size) = size {
        image = downscale(&image, size)?;
    }
    let indexed = quantize_palette_indexed(&image, Some(palette.into()))?;
    let png_bytes = encode_indexed_png(&indexed)?;

    std::fs::write(output, &png_bytes)?;
    println!(
        "Quantized {} to {} ({} of {} colors used, {} bytes)",
        input.display(),
        output.display(),
        indexed.used_indices().len(),
        indexed.palette().len(),
        png_bytes.len()
    );

    Ok(())
}

fn run_palettes_command() {
    for palette in retro_palette::palette::builtins() {
        let preview: Vec<String> = palette.colors().iter().take(4).map(|c| c.to_hex()).collect();
        println!(
            "  {:<8} {:>2} colors  {} ...",
            palette.name(),
            palette.len(),
            preview.join(" ")
        );
    }
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let rust_log = std::env::var("RUST_LOG").ok();

    println!("Pixelsmith v{VERSION}");
    println!("Retro pixel art from text prompts\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("127.0.0.1:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  RUST_LOG    = {}",
        rust_log.as_deref().unwrap_or("(not set)")
    );

    let config = AppConfig::load(config_file.as_deref().map(Path::new));
    let probed = accelerator::probe();
    let generation = &config.generation;
    let device = generation.resolved_device(probed);

    println!("\nConfiguration:");
    println!("  Runtime:      {}", generation.runtime_url);
    println!("  Base model:   {}", generation.base_model);
    println!(
        "  LoRA:         {} (weight {})",
        generation.lora_repo, generation.lora_weight
    );
    println!(
        "  Render:       {0}x{0}, {1} steps, guidance {2}",
        generation.render_size, generation.num_inference_steps, generation.guidance_scale
    );
    println!("  Cache dir:    {}", generation.cache_dir.display());
    println!("  Default size: {}", config.default_size);
    println!(
        "  Palette:      {}",
        config.default_palette.as_deref().unwrap_or("(none)")
    );

    println!("\nAccelerator:");
    println!("  Probed: {probed}");
    println!(
        "  Using:  {device}{}",
        if generation.cpu_offload_for(device) {
            " (with CPU offload)"
        } else {
            ""
        }
    );

    println!("\nCommands:");
    println!("  pixelsmith serve      Start the HTTP server");
    println!("  pixelsmith generate   Generate an image from a prompt");
    println!("  pixelsmith quantize   Quantize a PNG to a palette");
    println!("  pixelsmith palettes   List built-in palettes");
    println!("\nRun 'pixelsmith --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelsmith=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let config = AppConfig::from_env();

    let state = server::create_app_state(config);

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Pixelsmith server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
