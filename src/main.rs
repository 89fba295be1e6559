use clap::Parser;
use keystash::cli::{output, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays clean for secret values.
    let filter = EnvFilter::try_from_env("KEYSTASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Set {
            ref account,
            ref value,
            base64,
        } => keystash::cli::commands::set::execute(&cli, account, value.as_deref(), base64),
        Commands::Get {
            ref account,
            base64,
        } => keystash::cli::commands::get::execute(&cli, account, base64),
        Commands::Delete {
            ref account,
            force,
            ignore_missing,
        } => keystash::cli::commands::delete::execute(&cli, account, force, ignore_missing),
        Commands::Completions { shell } => keystash::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
