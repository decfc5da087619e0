use anyhow::Result;

use apexec::cli::Cli;
use apexec::handlers;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if !handlers::execute::run(args).await? {
        std::process::exit(1);
    }
    Ok(())
}
