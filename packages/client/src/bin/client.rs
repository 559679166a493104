//! Renraku chat client binary.
//!
//! Joins one order's conversation, shows incoming messages and
//! notifications, and reconnects with backoff when the gateway drops.
//! Type a line to send it, `/image <url>` for an image message,
//! `/read` to mark the conversation read, `/quit` to exit.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin renraku-client -- --order-id order-1 --token customer:alice
//! cargo run --bin renraku-client -- -o order-1 -t admin:carol --desktop-notifications
//! ```

use clap::Parser;

use renraku_client::runner::{run_client, RunnerConfig};
use renraku_shared::logger::setup_logger;
use renraku_shared::types::OrderId;

#[derive(Parser, Debug)]
#[command(name = "renraku-client")]
#[command(about = "Chat client for order conversations with notification delivery", long_about = None)]
struct Args {
    /// Order whose conversation to join
    #[arg(short = 'o', long)]
    order_id: String,

    /// Auth token; omit to connect anonymously
    #[arg(short = 't', long)]
    token: Option<String>,

    /// WebSocket gateway URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Allow OS-level notifications while the terminal is backgrounded
    #[arg(long)]
    desktop_notifications: bool,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = RunnerConfig {
        url: args.url,
        token: args.token,
        order_id: OrderId::new(args.order_id),
        desktop_notifications: args.desktop_notifications,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
