#[tokio::main]
async fn main() {
    if let Err(e) = reelnotes_be::start_server().await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
