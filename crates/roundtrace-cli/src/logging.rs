use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout stays machine-readable.
///
/// `RUST_LOG` wins when set; otherwise `-v` enables debug and `-vv` trace.
pub fn init_logging(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}
