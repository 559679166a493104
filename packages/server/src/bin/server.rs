//! Renraku gateway server binary.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin renraku-server
//! cargo run --bin renraku-server -- --host 0.0.0.0 --port 8080 \
//!     --seed-order order-1=alice
//! ```

use std::sync::Arc;

use clap::Parser;

use renraku_server::auth::StaticTokenVerifier;
use renraku_server::infrastructure::pusher::WebSocketRoomPusher;
use renraku_server::infrastructure::store::InMemoryStore;
use renraku_server::ui::Server;
use renraku_shared::logger::setup_logger;
use renraku_shared::time::SystemClock;
use renraku_shared::types::{OrderId, UserId};

#[derive(Parser, Debug)]
#[command(name = "renraku-server")]
#[command(about = "Chat and notification gateway for order conversations", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seed an order into the in-memory store, formatted as
    /// `<order_id>=<owner_user_id>`. Repeatable. Stands in for the
    /// out-of-scope order-creation collaborator in local runs.
    #[arg(long = "seed-order", value_name = "ORDER=OWNER")]
    seed_orders: Vec<String>,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. Clock and store (in-memory stand-in for the platform's DB)
    let clock = Arc::new(SystemClock);
    let store = Arc::new(InMemoryStore::new(clock.clone()));
    for seed in &args.seed_orders {
        match seed.split_once('=') {
            Some((order_id, owner)) if !order_id.is_empty() && !owner.is_empty() => {
                store
                    .seed_order(OrderId::new(order_id), UserId::new(owner))
                    .await;
                tracing::info!("Seeded order '{}' owned by '{}'", order_id, owner);
            }
            _ => {
                tracing::error!("Ignoring malformed --seed-order value '{}'", seed);
            }
        }
    }

    // 2. Connection/room registry
    let pusher = Arc::new(WebSocketRoomPusher::new());

    // 3. Token verifier (dev stand-in for the platform's session layer)
    let verifier = Arc::new(StaticTokenVerifier);

    // 4. Wire and run the gateway
    let server = Server::new(store, pusher, verifier, clock);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
