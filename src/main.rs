#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dish_footprint_lib::run().await
}
