//! xmake-bridge - query xmake projects from the command line.
//!
//! Every subcommand runs one Lua script through `xmake l` and prints the
//! decoded result, as text or JSON.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xmake_bridge::xmake::{ExplorerInformations, TargetEnv, TargetInformations, XmakeConfig};
use xmake_bridge::{BridgeConfig, ScriptOutput, Xmake, APP_NAME};

/// Query xmake projects through Lua scripts
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// xmake executable to run
    #[arg(long, global = true, env = "XMAKE_BRIDGE_EXECUTABLE")]
    executable: Option<PathBuf>,

    /// Project directory xmake runs in
    #[arg(long, global = true, env = "XMAKE_BRIDGE_WORKDIR")]
    working_dir: Option<PathBuf>,

    /// Directory containing the Lua script assets
    #[arg(long, global = true, env = "XMAKE_BRIDGE_ASSETS")]
    assets: Option<PathBuf>,

    /// Configuration file (defaults to .xmake-bridge.toml, then the global config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current platform, architecture and mode
    Config,

    /// List files added to the project
    NewFiles,

    /// Show the path of the GNU debugger
    GdbPath,

    /// List architectures
    Archs,

    /// List languages available to `xmake create`
    Languages,

    /// List project templates
    Templates,

    /// List toolchains
    Toolchains,

    /// List build modes
    Modes,

    /// List targets
    Targets,

    /// Show the default target
    DefaultTarget,

    /// Show run directory, path and environment of a target
    TargetInfo {
        /// Target name
        target: String,
    },

    /// Show the run directory of a target
    TargetRundir {
        /// Target name
        target: String,
    },

    /// Show the run environment of a target
    TargetEnvs {
        /// Target name
        target: String,
    },

    /// Show the artifact path of a target
    TargetPath {
        /// Target name
        target: String,
    },

    /// Show options and targets for a project explorer
    Explorer,

    /// Regenerate compile_commands.json
    UpdateIntellisense,

    /// Run any script asset by name
    Run {
        /// Script name, without the .lua extension
        script: String,

        /// Arguments passed to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List available script assets
    Scripts,

    /// Show the effective configuration
    ShowConfig {
        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write the effective configuration to the global config file
        #[arg(long, conflicts_with = "path")]
        save: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries results only
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return ExitCode::SUCCESS;
    }

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(Xmake::new(config), cli.command, cli.format))
}

/// Resolve the configuration file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = match cli.config {
        Some(ref path) => BridgeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BridgeConfig::load().context("Failed to load configuration")?,
    };

    if let Some(ref executable) = cli.executable {
        config.executable = executable.clone();
    }
    if let Some(ref dir) = cli.working_dir {
        config.working_dir = dir.clone();
    }
    if let Some(ref dir) = cli.assets {
        config.assets_dir = dir.clone();
    }

    Ok(config)
}

async fn run(xmake: Xmake, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Config => print_config(&xmake.config().await?, format),
        Commands::NewFiles => print_lines(&xmake.new_files().await?, format),
        Commands::GdbPath => print_text(&xmake.gdb_path().await?, format),
        Commands::Archs => print_lines(&xmake.archs().await?, format),
        Commands::Languages => print_lines(&xmake.languages().await?, format),
        Commands::Templates => print_lines(&xmake.templates().await?, format),
        Commands::Toolchains => print_lines(&xmake.toolchains().await?, format),
        Commands::Modes => print_lines(&xmake.modes().await?, format),
        Commands::Targets => print_lines(&xmake.targets().await?, format),
        Commands::DefaultTarget => print_text(&xmake.default_target().await?, format),
        Commands::TargetInfo { target } => {
            print_target_info(&xmake.target_informations(&target).await?, format)
        }
        Commands::TargetRundir { target } => {
            print_text(&xmake.target_rundir(&target).await?, format)
        }
        Commands::TargetEnvs { target } => {
            print_envs(&xmake.target_run_envs(&target).await?, format)
        }
        Commands::TargetPath { target } => print_text(&xmake.target_path(&target).await?, format),
        Commands::Explorer => print_explorer(&xmake.explorer().await?, format),
        Commands::UpdateIntellisense => {
            xmake.update_intellisense().await?;
            Ok(())
        }
        Commands::Run { script, args } => cmd_run(&xmake, &script, &args, format).await,
        Commands::Scripts => {
            let scripts =
                xmake.bridge().list_scripts().context("Failed to list script assets")?;
            print_lines(&scripts, format)
        }
        Commands::ShowConfig { path, save } => {
            cmd_show_config(xmake.bridge().config(), path, save, format)
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

async fn cmd_run(xmake: &Xmake, script: &str, args: &[String], format: OutputFormat) -> Result<()> {
    // A missing asset is a silent skip here; the bridge already logged it
    let Some(output) = xmake.bridge().run_script(script, args).await? else {
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Text => match output {
            ScriptOutput::Text(text) => print_text(&text, format),
            ScriptOutput::Structured { value, .. } => {
                let text = serde_json::to_string_pretty(&value)?;
                print_text(&text, format)
            }
        },
    }
}

fn cmd_show_config(
    config: &BridgeConfig,
    show_path: bool,
    save: bool,
    format: OutputFormat,
) -> Result<()> {
    if save {
        let path = config.save().context("Failed to save configuration")?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    if show_path {
        if let Some(dir) = BridgeConfig::config_dir() {
            println!("{}", dir.join("config.toml").display());
        } else {
            println!("Could not determine config directory");
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Text => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(io::stdout(), "{json}")?;
    Ok(())
}

fn print_text(text: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(text),
        OutputFormat::Text => {
            writeln!(io::stdout(), "{text}")?;
            Ok(())
        }
    }
}

fn print_lines(lines: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(lines),
        OutputFormat::Text => {
            let mut stdout = io::stdout().lock();
            for line in lines {
                writeln!(stdout, "{line}")?;
            }
            Ok(())
        }
    }
}

fn print_config(config: &XmakeConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Text => {
            println!("plat: {}", config.plat);
            println!("arch: {}", config.arch);
            println!("mode: {}", config.mode);
            Ok(())
        }
    }
}

fn print_envs(envs: &[TargetEnv], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(envs),
        OutputFormat::Text => {
            for env in envs {
                println!("{}={}", env.name, env.value);
            }
            Ok(())
        }
    }
}

fn print_target_info(info: &TargetInformations, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(info),
        OutputFormat::Text => {
            println!("name:   {}", info.name);
            println!("path:   {}", info.path);
            println!("rundir: {}", info.rundir);
            if !info.envs.is_empty() {
                println!("envs:");
                for env in &info.envs {
                    println!("  {}={}", env.name, env.value);
                }
            }
            Ok(())
        }
    }
}

fn print_explorer(explorer: &ExplorerInformations, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(explorer),
        OutputFormat::Text => {
            for (group, targets) in explorer.groups() {
                let indent = if group.is_empty() {
                    ""
                } else {
                    println!("{group}/");
                    "  "
                };
                for target in targets {
                    println!("{indent}{} ({}, {} files)", target.name, target.kind, target.files.len());
                }
            }
            Ok(())
        }
    }
}
