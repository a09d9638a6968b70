use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "csd_ingest=info,sqlx=warn";

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_FILTER`].
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(filter_from(rust_log.as_deref()))
        .with_target(false)
        .init();
}
