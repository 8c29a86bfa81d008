use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    ipp_cli::run().await
}
