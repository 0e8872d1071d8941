#[tokio::main]
async fn main() {
    if let Err(e) = roster::start_server().await {
        eprintln!("Startup failed: {e}");
        std::process::exit(1);
    }
}
