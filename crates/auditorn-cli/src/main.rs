use anyhow::Result;
use auditorn_cli::commands;
use auditorn_cli::commands::run::RunArgs;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "auditorn")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Run repeated Lighthouse audits against web services and summarize the scores",
    long_about = "Auditorn audits every resource of a service definition with Lighthouse, \
                  repeats each audit a configurable number of times, and prints per-trial \
                  scores and Core Web Vitals together with min, max, mean and median rows."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit the resources of a service and print summary statistics
    Run(RunArgs),

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for auditorn.

SUPPORTED SHELLS:
    bash, zsh, fish, elvish, powershell

INSTALLATION:
    bash:  auditorn completion --shell bash >> ~/.bashrc
    zsh:   auditorn completion --shell zsh > \"${fpath[1]}/_auditorn\"
    fish:  auditorn completion --shell fish > ~/.config/fish/completions/auditorn.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("auditorn=debug,auditorn_cli=debug,auditorn_core=debug,auditorn_lighthouse=debug")
    } else {
        EnvFilter::new("auditorn=info,auditorn_cli=info,auditorn_core=warn,auditorn_lighthouse=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
