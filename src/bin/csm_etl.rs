use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing::info;
use tracing_subscriber::EnvFilter;

use csm_twingraph_etl::app::App;
use csm_twingraph_etl::auth;
use csm_twingraph_etl::config::ConfigLoader;
use csm_twingraph_etl::error::EtlError;
use csm_twingraph_etl::platform::PlatformHttpClient;

#[derive(Parser)]
#[command(name = "csm-etl")]
#[command(about = "Load a runner's brewery instance into its twin-graph dataset")]
#[command(version)]
struct Cli {}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(etl) = report.downcast_ref::<EtlError>() {
            return ExitCode::from(map_exit_code(etl));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EtlError) -> u8 {
    match error {
        EtlError::MissingEnv(_)
        | EtlError::InvalidConfig(_)
        | EtlError::AuthHttp(_)
        | EtlError::AuthStatus { .. } => 2,
        EtlError::ApiHttp(_) | EtlError::ApiStatus { .. } | EtlError::ApiDecode(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    let config = ConfigLoader::from_env()?;
    let token = auth::provider_from_env(&config)?.access_token()?;
    let client = PlatformHttpClient::new(&config, &token)?;
    let app = App::new(config, client.clone(), client);

    let summary = app.run()?;
    info!(
        summary = %serde_json::to_string(&summary).into_diagnostic()?,
        "run summary"
    );
    Ok(())
}
