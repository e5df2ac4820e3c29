#[tokio::main]
async fn main() {
    if let Err(e) = labcompare::run().await {
        tracing::error!("{e}");
        eprintln!("labcompare: {e}");
        std::process::exit(1);
    }
}
