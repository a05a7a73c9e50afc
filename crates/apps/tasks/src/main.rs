use app_state::load_app_settings;
use clap::{Parser, Subcommand};
use color_eyre::Result;
use common_services::collaborators::Collaborators;
use tasks::task_runner::{confirm_cleanup, run_cleanup, run_setup};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Operator tasks for the recall backend", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the face collection, the storage root and the person table.
    Setup,
    /// Delete every stored photo, person record and indexed face.
    Cleanup {
        /// Skip the confirmation prompt.
        #[clap(long, default_value_t = false, action)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = load_app_settings()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    let args = Args::parse();
    let collaborators = Collaborators::from_settings(&settings).await?;

    match args.command {
        Command::Setup => run_setup(&collaborators).await?,
        Command::Cleanup { yes } => {
            if !yes && !confirm_cleanup().await? {
                info!("Cleanup cancelled.");
                return Ok(());
            }
            run_cleanup(&collaborators).await?;
        }
    }

    Ok(())
}
