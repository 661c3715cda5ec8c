mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::prepare::PrepareArgs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "respack",
    version,
    about = "Incremental Android resource preparation: merge, R.txt, R.java."
)]
struct Cli {
    /// Output results as JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare one resource target: identifier table, R.java sources and
    /// resource archive, skipped when no input changed.
    Prepare(Box<PrepareArgs>),
    /// Check that a declared-sources list covers its resource directories.
    CheckSources {
        /// Newline-delimited list of resource files.
        sources: PathBuf,
    },
    /// Check that the resource compiler can run.
    Doctor {
        #[arg(long, default_value = "aapt")]
        compiler: String,
        #[arg(long)]
        aapt_path: Option<PathBuf>,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") || msg.contains("failed printing to stdout") {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RESPACK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let result = match cli.command {
        Commands::Prepare(args) => commands::prepare::run(*args, json_output),
        Commands::CheckSources { sources } => commands::check_sources::run(&sources, json_output),
        Commands::Doctor {
            compiler,
            aapt_path,
        } => commands::doctor::run(&compiler, aapt_path.as_deref(), json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code)
        }
    }
}
