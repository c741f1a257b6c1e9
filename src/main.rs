use std::process::ExitCode;

use clap::Parser;
use log::debug;

use discoteca::{App, AppError, ApiClient, cli::Cli, config::Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_retryable() {
                eprintln!("Run the command again to retry.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = Settings::load()?;
    settings.apply_cli(cli.api_url);
    settings.validate().map_err(AppError::Settings)?;
    debug!("Using backend at {}", settings.api.base_url);

    let app = App::new(&settings, ApiClient::from_settings(&settings.api));
    app.run(cli.command, &mut std::io::stdout().lock())
}

/// `-v` info, `-vv` debug, `-vvv` trace; `RUST_LOG` wins when set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
