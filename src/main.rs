//! Arena character controller
//!
//! Main entry point that delegates to the app module.

mod app;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting arena controller...");
    if let Err(e) = app::run() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
