use clap::Parser;
use polcfg::cli::{exit_codes, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    // handle broken pipe gracefully (e.g., when piping to `head` or `jq` that exits early)
    reset_sigpipe();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also end up here, on stdout
            let _ = e.print();
            let code = if e.use_stderr() {
                exit_codes::INVALID_ARGS
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };
    init_logging(cli.verbose);

    if let Err(e) = polcfg::cli::run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_codes::ERROR);
    }
}

/// log to stderr; RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("polcfg={}", level))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// reset SIGPIPE to default behavior (terminate process) instead of panicking
/// this is the standard Unix behavior for CLI tools
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
