use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a stderr `fmt` subscriber.
///
/// `directives` (e.g. `"polypay=debug"`) take precedence over `RUST_LOG`;
/// with neither set, `INFO` and above are shown.
pub fn init(directives: Option<&str>) -> miette::Result<()> {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let env_filter = match directives {
        Some(directives) => builder.parse(directives),
        None => builder.parse(std::env::var("RUST_LOG").unwrap_or_default()),
    }
    .map_err(|e| miette::miette!("could not parse log filter: {e}"))?;

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .try_init()
        .map_err(|e| miette::miette!("unable to set up tracing: {e}"))?;

    Ok(())
}
