//! `wizflow` binary

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = wizflow_cli::command().get_matches();

    let config = match wizflow_cli::load_config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let explicit_filter = matches.get_one::<String>("log").is_some();
    if let Err(err) = wizflow_cli::init_tracing(&config.log, explicit_filter) {
        eprintln!("warning: {err:#}");
    }

    match wizflow_cli::execute(&matches, &config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
