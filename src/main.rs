use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use millkit::{
    default_config_path, estimate_duration, init_logging, load_stl, parse_program, plan_toolpaths,
    progress_fn, JobContext, MillkitConfig, MotionInterpreter, PlaybackCommand, PlaybackDriver,
    PlaybackEvent, PlaybackSession, PlaybackSettings, SlicerService, BUILD_DATE, VERSION,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "millkit", version)]
#[command(about = "STL to G-code milling toolpaths and G-code motion simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a milling program from an STL file
    Slice {
        /// Input STL file (binary or ASCII)
        input: PathBuf,
        /// Output G-code file
        output: PathBuf,
        /// Config file (.toml or .json); defaults to the user config
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Delegate to this external slicer executable
        #[arg(long)]
        external: Option<PathBuf>,
        /// Also write the planned toolpaths as JSON
        #[arg(long)]
        toolpaths: Option<PathBuf>,
    },
    /// Interpret a G-code program and report its moves
    Simulate {
        /// G-code file
        input: PathBuf,
        /// Animate the program on the playback timer
        #[arg(long)]
        realtime: bool,
        /// Config file (.toml or .json); defaults to the user config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Destination; defaults to the user config
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show {
        /// Config file; defaults to the user config
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    info!("millkit {} (built {})", VERSION, BUILD_DATE);

    let cli = Cli::parse();
    match cli.command {
        Commands::Slice {
            input,
            output,
            config,
            external,
            toolpaths,
        } => slice(&input, &output, config.as_deref(), external, toolpaths.as_deref()).await?,
        Commands::Simulate {
            input,
            realtime,
            config,
        } => simulate(&input, realtime, config.as_deref()).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => init_config(path, force)?,
            ConfigAction::Show { path } => {
                let config = load_config(path.as_deref())?;
                print!("{}", config.to_toml_string()?);
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<MillkitConfig> {
    match path {
        Some(path) => MillkitConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match default_config_path() {
            Ok(path) => MillkitConfig::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            Err(e) => {
                warn!("{}, using defaults", e);
                Ok(MillkitConfig::default())
            }
        },
    }
}

async fn slice(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    external: Option<PathBuf>,
    toolpaths: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;

    let mut slicer_settings = config.external_slicer.clone();
    let requested_external = external.is_some();
    if let Some(exe) = external {
        slicer_settings.executable = Some(exe);
    }
    let service = SlicerService::from_settings(&slicer_settings);
    if requested_external && !service.uses_external_slicer() {
        warn!("External slicer executable not found, using the internal engine");
    }

    let progress = progress_fn(|message| println!("{}", message));
    let result = service
        .slice_with_settings(input, output, &config.machining, Some(progress))
        .await;

    if !result.success {
        if !result.error_output.is_empty() {
            eprintln!("{}", result.error_output);
        }
        bail!(
            "Slicing failed: {}",
            result.error_message.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!(
        "Wrote {} ({} bytes) in {:.2?}",
        output.display(),
        result.file_size,
        result.processing_time
    );

    if let Some(json_path) = toolpaths {
        let mesh = load_stl(input)?;
        let planned = plan_toolpaths(&mesh, &config.machining, &JobContext::default())?;
        std::fs::write(json_path, millkit_camtools::toolpaths_to_json(&planned)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        println!("Wrote {} toolpaths to {}", planned.len(), json_path.display());
    }

    Ok(())
}

async fn simulate(input: &Path, realtime: bool, config: Option<&Path>) -> Result<()> {
    let program = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let commands = parse_program(&program);
    let results = MotionInterpreter::new().execute_program(&commands);
    let moves = results.iter().filter(|r| r.requires_movement).count();

    if realtime {
        let config = load_config(config)?;
        play_realtime(&program, &config.playback).await?;
    } else {
        for r in results.iter().filter(|r| r.requires_movement) {
            println!(
                "line {:>6}: {} ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3}) {:.3}s",
                r.line_number,
                if r.is_rapid { "rapid " } else { "linear" },
                r.start.x,
                r.start.y,
                r.start.z,
                r.end.x,
                r.end.y,
                r.end.z,
                r.duration_secs
            );
        }
    }

    println!(
        "{} commands, {} moves, estimated time {:.1?}",
        commands.len(),
        moves,
        estimate_duration(&results)
    );
    Ok(())
}

async fn play_realtime(program: &str, settings: &PlaybackSettings) -> Result<()> {
    let mut driver = PlaybackDriver::new(settings.rapid_speedup);
    driver.load(program);

    let mut session =
        PlaybackSession::spawn(driver, Duration::from_millis(settings.tick_interval_ms));
    session.send(PlaybackCommand::Play).await?;

    loop {
        tokio::select! {
            event = session.next_event() => match event {
                Some(PlaybackEvent::Position { position, line_number }) => println!(
                    "line {:>6}: X{:.3} Y{:.3} Z{:.3}",
                    line_number, position.x, position.y, position.z
                ),
                Some(PlaybackEvent::Finished) | None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted");
                break;
            }
        }
    }

    session.shutdown().await?;
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    MillkitConfig::default().save_to_file(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
