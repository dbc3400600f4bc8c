#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bible_quiz_lib::run().await
}
