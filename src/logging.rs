/// Installs the global `tracing` subscriber.
///
/// Output goes to stderr; stdout carries the protocol. `RUST_LOG` overrides
/// `level`. Calling this twice is harmless.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}
