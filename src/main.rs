use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    scry_cli::run().await
}
