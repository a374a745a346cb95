//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::{
    domain::{AdmissionCheck, BusError, ConnectionRegistry, MessageBus},
    usecase::{
        DeliverToRoomUseCase, HandleInboundEventUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        ListRoomsUseCase, PublishMessageUseCase, RelayBusMessageUseCase,
    },
};

use super::{
    bridge::BusBridge,
    handler::{health_check, list_rooms, publish_message, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Runtime settings for the relay server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// The port number to bind to (e.g., 8082)
    pub port: u16,
    /// Bus topic carrying chat messages
    pub topic: String,
    /// Echo typing events to the sender's own user room
    pub echo_typing: bool,
}

/// WebSocket relay server
///
/// Owns the registry and bus handles, builds the use cases, and runs the
/// HTTP/WebSocket front end together with the bus bridge.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(config, registry, bus, admission);
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    bus: Arc<dyn MessageBus>,
    state: Arc<AppState>,
    bridge: Arc<BusBridge>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address, topic and event options
    /// * `registry` - Room → connection registry shared by sessions and the bridge
    /// * `bus` - Message bus the bridge subscribes to and the publish endpoint writes to
    /// * `admission` - Credential check applied before the WebSocket upgrade
    pub fn new(
        config: ServerConfig,
        registry: Arc<dyn ConnectionRegistry>,
        bus: Arc<dyn MessageBus>,
        admission: Arc<dyn AdmissionCheck>,
    ) -> Self {
        let delivery = Arc::new(DeliverToRoomUseCase::new(registry.clone()));

        let state = Arc::new(AppState {
            admission,
            join_room_usecase: Arc::new(JoinRoomUseCase::new(registry.clone())),
            handle_inbound_event_usecase: Arc::new(HandleInboundEventUseCase::new(
                delivery.clone(),
                config.echo_typing,
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(registry.clone())),
            list_rooms_usecase: Arc::new(ListRoomsUseCase::new(registry)),
            publish_message_usecase: Arc::new(PublishMessageUseCase::new(
                bus.clone(),
                config.topic.clone(),
            )),
        });

        let relay_bus_message_usecase = Arc::new(RelayBusMessageUseCase::new(delivery));
        let bridge = Arc::new(BusBridge::new(relay_bus_message_usecase));

        Self {
            config,
            bus,
            state,
            bridge,
        }
    }

    /// Build the HTTP/WebSocket router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/publish", post(publish_message))
            .route("/debug/rooms", get(list_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Subscribe to the configured topic and spawn the bus bridge
    pub async fn start_bridge(&self) -> Result<JoinHandle<()>, BusError> {
        let subscription = self.bus.subscribe(&self.config.topic).await?;
        tracing::info!("Bus bridge subscribed to topic '{}'", self.config.topic);
        Ok(self.bridge.clone().spawn(subscription))
    }

    /// Start the bus bridge and serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bridge = self.start_bridge().await?;
        let app = self.router();

        tracing::info!("WebSocket relay listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        bridge.abort();
        Ok(())
    }

    /// Run the WebSocket relay server
    ///
    /// # Errors
    ///
    /// Returns an error if the bus subscription fails, if the server fails to bind
    /// to the configured address, or if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
