use clap::Parser;
use pong_server::network::WebsocketServer;

/// Authoritative pong server: pairs websocket clients into two-player rooms
/// and runs the match simulation at a fixed tick rate.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on
    #[clap(short, long, default_value = "4000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let server = WebsocketServer::new(&format!("{}:{}", args.host, args.port));
    server.run().await?;
    Ok(())
}
