#[tokio::main]
async fn main() -> anyhow::Result<()> {
    summary_gateway::run().await
}
