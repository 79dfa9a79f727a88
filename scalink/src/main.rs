//! Scalink - link a Veracode SCA project to an application profile
use clap::Parser;
use log::{error, info};
use scalink::{LinkError, LinkWorkflow, cli::Cli};
use veracode_sca_api::VeracodeClient;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        error!("❌ {e}");
        std::process::exit(1);
    }

    println!("SCA Project linked to Application Profile");
}

async fn run(cli: &Cli) -> scalink::Result<()> {
    let client = VeracodeClient::new(cli.veracode_config()).map_err(LinkError::Client)?;

    let outcome = LinkWorkflow::new(client).execute(&cli.link_request()).await?;
    info!(
        "Linked project {} (workspace {}) to application {}",
        outcome.project_guid, outcome.workspace_guid, outcome.application_guid
    );

    Ok(())
}
