use haven::prelude::*;

#[tokio::main]
async fn main() -> Result<(), HavenError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(bind = %config.bind, "starting Haven");

    let server = HavenServer::<JsonCodec>::builder().config(config).build().await?;
    server.run().await
}
