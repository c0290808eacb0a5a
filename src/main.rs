use macosrec::commands::Backends;
use macosrec::config::Settings;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    macosrec::init_tracing();
    tracing::debug!("Starting macosrec v{}", env!("CARGO_PKG_VERSION"));

    let backends = Backends::system(Settings::from_env());
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let status = macosrec::run(std::env::args_os(), &backends, &mut stdout, &mut stderr).await;
    ExitCode::from(status)
}
