mod cli;

use stickerforge::compose::FontTypeface;
use stickerforge::config;
use stickerforge::messaging::{DirectoryMessenger, FileMedia};
use stickerforge::pipeline::{Invocation, StickerPipeline};
use stickerforge_av::ScratchDir;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "stickerforge=trace,stickerforge_av=trace".to_string()
        } else {
            "stickerforge=debug,stickerforge_av=debug".to_string()
        }
    });

    // Logs go to stderr; stdout carries status replies.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Make {
            attach,
            quote,
            out,
            tail,
        } => {
            let request = MakeRequest {
                attach,
                quote,
                out,
                tail: tail.join(" "),
            };
            let rt = tokio::runtime::Runtime::new()?;
            let succeeded = rt.block_on(make_sticker(request, cli.config.as_deref()))?;
            if !succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Sweep => sweep(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("stickerforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct MakeRequest {
    attach: Option<PathBuf>,
    quote: Option<PathBuf>,
    out: PathBuf,
    tail: String,
}

/// Returns whether a sticker was delivered.
async fn make_sticker(request: MakeRequest, config_path: Option<&Path>) -> Result<bool> {
    let config = config::load_config_or_default(config_path)?;
    let pipeline = StickerPipeline::from_config(&config);

    if config.scratch.sweep_on_startup {
        pipeline.sweep_scratch(&config.scratch.extensions);
    }

    let mut invocation = Invocation::new(request.tail);
    if let Some(path) = request.attach {
        invocation = invocation.with_attachment(FileMedia::new(path));
    }
    if let Some(path) = request.quote {
        invocation = invocation.with_quoted(FileMedia::new(path));
    }

    tracing::debug!("Handling {:?}", invocation);

    let messenger = DirectoryMessenger::new(request.out);
    let result = pipeline.handle(&invocation, &messenger).await;

    Ok(result.outcome.is_success())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = stickerforge_av::check_tools(config.tools.ffmpeg_path.as_deref());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    match FontTypeface::discover(config.compose.font_path.as_deref()) {
        Ok(face) => println!("✓ font - {}", face.source()),
        Err(e) => {
            all_ok = false;
            println!("✗ font ({})", e);
        }
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Animated stickers need ffmpeg; captions need a font.");
    }

    Ok(())
}

fn sweep(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let scratch = ScratchDir::new(&config.scratch.dir);

    let removed = scratch.sweep(&config.scratch.extensions)?;
    println!(
        "Removed {} stale file(s) from {}",
        removed,
        scratch.path().display()
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Author: {}", config.sticker.author);
    println!("  Pack: {}", config.sticker.pack_name);
    println!("  Scratch dir: {}", config.scratch.dir.display());
    println!("  Encoder timeout: {}s", config.tools.encoder_timeout_secs);
    println!(
        "  Fetch: {}s timeout, {} byte limit",
        config.fetch.timeout_secs, config.fetch.max_bytes
    );

    Ok(())
}
