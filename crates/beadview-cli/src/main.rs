#![forbid(unsafe_code)]

mod cmd;
mod input;
mod layout;
mod output;

use beadview_core::config::resolve_config;
use beadview_core::error::ErrorCode;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "bv",
    author,
    version,
    about = "beadview: dependency-graph analysis for bead trackers",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Summarize a graph snapshot",
        long_about = "Run cycle detection, critical-path extraction and subtree collapsing on a snapshot and report all of it.",
        after_help = "EXAMPLES:\n    # Full summary\n    bv analyze graph.json\n\n    # Read the snapshot from stdin, collapse every epic\n    curl -s $DASHBOARD/api/graph | bv analyze - --collapse-all\n\n    # Emit machine-readable output\n    bv analyze graph.json --format json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "List dependency cycles",
        long_about = "Report one cycle per back edge found by a depth-first walk of the dependency graph.",
        after_help = "EXAMPLES:\n    # Show cycles\n    bv cycles graph.json\n\n    # Emit machine-readable output\n    bv cycles graph.json --json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Show the longest dependency chain",
        long_about = "Show the longest dependency chain, ignoring edges that take part in a cycle.",
        after_help = "EXAMPLES:\n    # Show the critical path\n    bv critical-path graph.json"
    )]
    CriticalPath(cmd::critical_path::CriticalPathArgs),

    #[command(
        next_help_heading = "View",
        about = "Compute the visible subgraph",
        long_about = "Hide everything that depends on the collapsed roots and report the remaining nodes and edges.",
        after_help = "EXAMPLES:\n    # Collapse one epic\n    bv collapse graph.json --collapse bd-epic1\n\n    # Collapse every epic\n    bv collapse graph.json --collapse-all"
    )]
    Collapse(cmd::collapse::CollapseArgs),

    #[command(
        next_help_heading = "View",
        about = "Position the visible subgraph",
        long_about = "Collapse the graph, then place the visible nodes with the layered layout engine using [layout] size hints.",
        after_help = "EXAMPLES:\n    # Layout with default size hints\n    bv layout graph.json\n\n    # Emit machine-readable positions\n    bv layout graph.json --collapse-all --json"
    )]
    Layout(cmd::layout::LayoutArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Check whether a new dependency would create a cycle",
        long_about = "Exit non-zero with E2003 if ISSUE depending on DEPENDS_ON would close a dependency cycle.",
        after_help = "EXAMPLES:\n    # Can bd-2 depend on bd-1?\n    bv check-dep graph.json bd-2 bd-1"
    )]
    CheckDep(cmd::check_dep::CheckDepArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    bv completions bash\n\n    # Generate zsh completions\n    bv completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BEADVIEW_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "beadview=debug,info"
        } else {
            "beadview=info,warn"
        })
    });

    let format = env::var("BEADVIEW_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let config = match resolve_config(&project_root) {
        Ok(config) => config,
        Err(err) => {
            let output = resolve_output_mode(cli.format, cli.json, None);
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };

    let output = resolve_output_mode(cli.format, cli.json, config.user.output.as_deref());
    debug!(?output, "output mode resolved");

    match cli.command {
        Commands::Analyze(ref args) => {
            cmd::analyze::run_analyze(args, output, &config.project.view)
        }
        Commands::Cycles(ref args) => cmd::cycles::run_cycles(args, output),
        Commands::CriticalPath(ref args) => cmd::critical_path::run_critical_path(args, output),
        Commands::Collapse(ref args) => {
            cmd::collapse::run_collapse(args, output, &config.project.view)
        }
        Commands::Layout(ref args) => cmd::layout::run_layout_cmd(args, output, &config.project),
        Commands::CheckDep(ref args) => cmd::check_dep::run_check_dep(args, output),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
