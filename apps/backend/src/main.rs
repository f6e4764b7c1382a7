#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hsk_flashcards_backend::run().await
}
