pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod format;
pub mod io;

pub use cli::{Cli, Command, OutputFormat};

use clap::Parser;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    let cli = Cli::parse();
    install_tracing(cli.verbose);

    if let Err(e) = dispatch(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Installs a `tracing-subscriber` `fmt` subscriber: debug level under
/// `-v`/`--verbose`, warnings only otherwise.
fn install_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the parsed CLI arguments to the appropriate command handler.
///
/// Returns `Ok(())` on success or a [`error::CliError`] on failure. The
/// caller is responsible for printing the error message and exiting with the
/// appropriate exit code.
fn dispatch(cli: &Cli) -> Result<(), error::CliError> {
    match &cli.command {
        Command::Init => cmd::init::run(&cli.store),

        Command::Ingest { file, no_union } => {
            let config = cli.resolve_config()?;
            cmd::ingest::run(&cli.store, file, *no_union, &config)
        }

        Command::AddEdge {
            ids,
            strength,
            evidence,
        } => {
            let config = cli.resolve_config()?;
            cmd::add_edge::run(&cli.store, ids, *strength, evidence.clone(), &config)
        }

        Command::Query { selector } => {
            let config = cli.resolve_config()?;
            cmd::query::run(&cli.store, selector, &config, cli.format)
        }

        Command::Inspect => cmd::inspect::run(&cli.store, cli.format),

        Command::Analyze {
            limit,
            candidates_limit,
        } => {
            let config = cli.resolve_config()?;
            cmd::analyze::run(&cli.store, *limit, *candidates_limit, &config, cli.format)
        }

        Command::Reset => cmd::reset::run(&cli.store),
    }
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`).
///
/// Rust's runtime ignores `SIGPIPE` by default, which causes programs that
/// write to a closed pipe (e.g. `aka-graph query x | head`) to receive an
/// `Err(BrokenPipe)` from a write call rather than being terminated
/// silently. Restoring the default disposition makes the kernel terminate
/// the process with exit code 0 when a write to a closed pipe occurs,
/// matching standard Unix tool behavior.
///
/// This function uses `libc::signal`, which requires the `libc` crate. It
/// is only compiled on Unix targets via `#[cfg(unix)]` at the call site.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: signal() is safe to call during single-threaded program
    // initialization before any other threads are spawned. SIG_DFL is a
    // valid handler for SIGPIPE. The return value (previous handler) is
    // discarded.
    //
    // The workspace denies `unsafe_code` globally; this narrow `#[allow]`
    // keeps the exception scoped to the one unavoidable libc call.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}
