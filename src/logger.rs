use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable checked before `RUST_LOG`.
const LOG_ENV: &str = "CHEF_LOAD_LOG";

/// Installs the global compact subscriber. Targets are left out; agent events
/// are told apart by their `node` and `step` fields.
pub fn init_logging(verbose: bool) {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(directives.as_deref(), verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// Explicit directives win; malformed ones fall back to `info` so a typo in
/// the environment never silences warnings.
fn build_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    directives.map_or_else(
        || EnvFilter::new(fallback),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
    )
}
