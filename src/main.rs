//! Myo-Angle Merge CLI
//!
//! Pairs muscle-displacement and joint-angle recordings and writes one
//! time-aligned table per trial.

use clap::{Parser, Subcommand};
use myo_angle_merge::{
    config::{Config, ResolvedPaths},
    core::{find_matching_files, merge_files, TrialFile},
    io::find_csv_files,
    pipeline::{parse_index_pair, ConsolePairing, IndexPairs, Pipeline, PipelineError},
    VERSION,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "myo-merge")]
#[command(version = VERSION)]
#[command(about = "Pair and time-align muscle displacement and joint angle recordings", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Default)]
struct PathArgs {
    /// Base directory (skips probing the configured candidates)
    #[arg(long)]
    base: Option<PathBuf>,

    /// Muscle data folder
    #[arg(long)]
    muscle: Option<PathBuf>,

    /// Angle data folder
    #[arg(long)]
    angle: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match and merge every trial pair (the default)
    Run {
        #[command(flatten)]
        paths: PathArgs,

        /// Output folder for merged files
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Manual pair "MUSCLE:ANGLE" by index, used when nothing matches automatically
        #[arg(long = "pair", value_parser = parse_index_pair)]
        pairs: Vec<(usize, usize)>,

        /// Ask for manual pairs on the console when nothing matches automatically
        #[arg(long, conflicts_with = "pairs")]
        interactive: bool,
    },

    /// List discovered files, their tags and the automatic pairing
    List {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Merge one muscle file with one angle file
    Merge {
        /// Muscle displacement CSV
        muscle: PathBuf,

        /// Joint angle CSV
        angle: PathBuf,

        /// Output file (defaults to "<muscle>_merged_with_<angle>.csv" beside the muscle file)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show configuration and resolved paths
    Config {
        /// Write the current settings to the config file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing config file when initializing
        #[arg(long, requires = "init")]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config, using defaults: {e}");
            Config::default()
        }),
    };

    match cli.command.unwrap_or(Commands::Run {
        paths: PathArgs::default(),
        output: None,
        pairs: Vec::new(),
        interactive: false,
    }) {
        Commands::Run {
            paths,
            output,
            pairs,
            interactive,
        } => cmd_run(&config, paths, output, pairs, interactive),
        Commands::List { paths } => {
            cmd_list(&config, paths);
            Ok(())
        }
        Commands::Merge {
            muscle,
            angle,
            output,
        } => cmd_merge(&config, muscle, angle, output),
        Commands::Config { init, force } => {
            let path = cli.config.unwrap_or_else(Config::config_path);
            cmd_config(&config, &path, init, force)
        }
    }
}

fn resolve_paths(config: &Config, args: PathArgs) -> ResolvedPaths {
    let mut resolved = match args.base {
        Some(base) => config.resolve_under(&base),
        None => config.resolve(),
    };
    if let Some(muscle) = args.muscle {
        resolved.muscle = muscle;
    }
    if let Some(angle) = args.angle {
        resolved.angle = angle;
    }
    resolved
}

fn print_paths(paths: &ResolvedPaths) {
    println!("Base directory: {}", paths.base.display());
    println!("Muscle folder:  {}", paths.muscle.display());
    println!("Angle folder:   {}", paths.angle.display());
    println!("Output folder:  {}", paths.output.display());
}

fn cmd_run(
    config: &Config,
    path_args: PathArgs,
    output: Option<PathBuf>,
    pairs: Vec<(usize, usize)>,
    interactive: bool,
) -> anyhow::Result<()> {
    println!("Myo-Angle Merge v{VERSION}");
    println!();

    let mut paths = resolve_paths(config, path_args);
    if let Some(output) = output {
        paths.output = output;
    }
    let mut pipeline =
        Pipeline::new(paths, config.merge_settings()).with_report(config.write_report);
    print_paths(pipeline.paths());
    println!();

    if interactive {
        let stdin = std::io::stdin().lock();
        pipeline = pipeline.with_override(ConsolePairing::new(stdin, std::io::stdout()));
    } else if !pairs.is_empty() {
        pipeline = pipeline.with_override(IndexPairs(pairs));
    }

    match pipeline.run() {
        Ok(log) => {
            println!();
            println!("{}", log.summary());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            match e {
                PipelineError::NoMuscleFiles(_) | PipelineError::NoAngleFiles(_) => {
                    eprintln!("Check the folder paths (see `myo-merge config`).");
                    if let Ok(cwd) = std::env::current_dir() {
                        eprintln!("Current directory: {}", cwd.display());
                    }
                }
                PipelineError::NoPairs { .. } => {
                    eprintln!("Run `myo-merge list` to see file indices, then pair them with");
                    eprintln!("`myo-merge run --pair <muscle>:<angle>` or `myo-merge run --interactive`.");
                }
            }
            std::process::exit(1);
        }
    }
}

fn print_files(label: &str, files: &[TrialFile]) {
    println!("{label} ({}):", files.len());
    for (i, f) in files.iter().enumerate() {
        println!("  [{i}] {} -> {}", f.file_name(), f.tag);
    }
}

fn cmd_list(config: &Config, path_args: PathArgs) {
    let paths = resolve_paths(config, path_args);
    print_paths(&paths);
    println!();

    let muscles: Vec<TrialFile> = find_csv_files(&paths.muscle)
        .into_iter()
        .map(TrialFile::new)
        .collect();
    let angles: Vec<TrialFile> = find_csv_files(&paths.angle)
        .into_iter()
        .map(TrialFile::new)
        .collect();

    print_files("Muscle files", &muscles);
    print_files("Angle files", &angles);
    println!();

    let outcome = find_matching_files(&muscles, &angles);
    println!("Automatic pairs ({}):", outcome.pairs.len());
    for pair in &outcome.pairs {
        println!(
            "  {} + {} [{}]",
            pair.muscle.file_name(),
            pair.angle.file_name(),
            pair.rule
        );
    }
    if !outcome.unmatched.is_empty() {
        println!("Unmatched muscle files ({}):", outcome.unmatched.len());
        for file in &outcome.unmatched {
            println!("  {}", file.file_name());
        }
    }
}

fn cmd_merge(
    config: &Config,
    muscle: PathBuf,
    angle: PathBuf,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| {
        let name = format!(
            "{}_merged_with_{}.csv",
            TrialFile::new(&muscle).stem(),
            TrialFile::new(&angle).stem()
        );
        muscle.with_file_name(name)
    });

    match merge_files(&muscle, &angle, Some(&output), &config.merge_settings()) {
        Ok(merged) => {
            println!("Merged {} rows into {}", merged.table.len(), output.display());
            println!(
                "  Offset: {:.3}s ({:?})",
                merged.alignment.offset_secs, merged.alignment.shift
            );
            println!(
                "  Nearest distance: mean {:.1}ms, max {:.1}ms",
                merged.distance.mean_ms, merged.distance.max_ms
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config(config: &Config, path: &Path, init: bool, force: bool) -> anyhow::Result<()> {
    if init {
        if path.exists() && !force {
            anyhow::bail!(
                "config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }
        config.save_to(path)?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", path.display());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    println!();
    print_paths(&config.resolve());
    Ok(())
}
