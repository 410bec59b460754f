use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_app::App;
use libris_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about = "Operate the LIBRIS books service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate and serve the HTTP API until shutdown
    Serve,
    /// Apply pending schema migrations
    Migrate {
        /// Also load the sample catalogue
        #[arg(long)]
        seed: bool,
    },
    /// Print the resolved configuration and exit
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load LIBRIS settings")?;

    match cli.command {
        Command::Config => print_config(&settings),
        Command::Migrate { seed } => {
            libris_telemetry::init(&settings.telemetry)?;
            let app = App::build(&settings).await?;
            app.migrate(seed || settings.database.seed).await?;
            app.pool.close().await;
            Ok(())
        }
        Command::Serve => {
            libris_telemetry::init(&settings.telemetry)?;
            let app = App::build(&settings).await?;
            app.serve(&settings).await
        }
    }
}

fn print_config(settings: &Settings) -> anyhow::Result<()> {
    let connection = settings.database.connection_string()?;

    println!("environment     = {:?}", settings.environment);
    println!("bind_address    = {}", settings.server.bind_address());
    println!("request_timeout = {}ms", settings.server.request_timeout_ms);
    println!("connection_key  = {}", settings.database.connection_key);
    println!("connection      = {connection}");
    println!("max_connections = {}", settings.database.max_connections);
    println!("seed            = {}", settings.database.seed);
    println!("log_format      = {:?}", settings.telemetry.log_format);

    Ok(())
}
