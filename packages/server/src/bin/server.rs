//! Room-addressed WebSocket relay.
//!
//! Forwards messages published on the bus, and typing/deletion events sent by
//! clients, to the connection currently registered for the target room.
//!
//! Run with:
//! ```not_rust
//! RELAY_JWT_SECRET=secret cargo run --bin roomrelay-server
//! cargo run --bin roomrelay-server -- --host 0.0.0.0 --port 8082 --jwt-secret secret
//! ```

use std::sync::Arc;

use clap::Parser;
use roomrelay_server::{
    infrastructure::{
        auth::JwtAdmissionCheck, bus::InMemoryMessageBus, registry::InMemoryConnectionRegistry,
    },
    ui::{Server, ServerConfig},
};
use roomrelay_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "roomrelay-server")]
#[command(about = "Room-addressed WebSocket relay for pub/sub chat messages", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RELAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "RELAY_PORT", default_value = "8082")]
    port: u16,

    /// Bus topic carrying chat messages
    #[arg(long, env = "RELAY_TOPIC", default_value = "chat_channel")]
    topic: String,

    /// Shared secret used to verify bearer tokens
    #[arg(long, env = "RELAY_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Token signing algorithm (HS256, HS384 or HS512)
    #[arg(long, env = "RELAY_JWT_ALGORITHM", default_value = "HS256")]
    jwt_algorithm: String,

    /// Also send typing indicators back to the sender's own user room
    #[arg(long, env = "RELAY_ECHO_TYPING")]
    echo_typing: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry
    // 2. Message bus
    // 3. Admission check
    // 4. Server (use cases, router, bus bridge)

    // 1. Create Registry (in-memory room → connection map)
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 2. Create message bus
    let bus = Arc::new(InMemoryMessageBus::new());

    // 3. Create admission check
    let admission = match JwtAdmissionCheck::new(
        args.jwt_secret.as_bytes(),
        &args.jwt_algorithm,
        Arc::new(SystemClock),
    ) {
        Ok(admission) => Arc::new(admission),
        Err(e) => {
            tracing::error!("Invalid token configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 4. Create and run the server
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        topic: args.topic,
        echo_typing: args.echo_typing,
    };
    let server = Server::new(config, registry, bus, admission);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
