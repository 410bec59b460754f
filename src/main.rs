use anyhow::Context;
use libris_app::App;
use libris_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load LIBRIS settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.connection_key,
        "libris-app bootstrap starting"
    );

    let app = App::build(&settings).await?;
    app.serve(&settings).await
}
