use anyhow::Result;

use action_gateway::run_cli;

#[tokio::main]
async fn main() -> Result<()> {
    run_cli().await
}
