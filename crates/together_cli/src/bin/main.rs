//! `llm-together` entry point.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use together_cli::App;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let app = App::parse();
    app.init_logging();

    let mut stdout = std::io::stdout().lock();
    match app.run(&mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            let _ = writeln!(std::io::stderr(), "Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
