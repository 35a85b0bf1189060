use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::Reply;
use crate::transfer::Lister;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    lister: Lister,
    slots: Arc<Semaphore>,
}

impl Server {
    /// Binds the control listener described by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let socket = config.control_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(ServerError::Bind(socket, e));
            }
        };

        Self::from_listener(listener, config)
    }

    /// Builds a server around an already bound listener.
    pub fn from_listener(listener: TcpListener, config: ServerConfig) -> Result<Self, ServerError> {
        if let Err(e) = std::fs::create_dir_all(&config.server_root) {
            return Err(ServerError::ServerRoot(config.server_root.clone(), e));
        }
        info!("Server root directory: {}", config.server_root);

        let lister = Lister::from_config(&config);
        let slots = Arc::new(Semaphore::new(config.max_clients));

        Ok(Self {
            listener,
            config: Arc::new(config),
            lister,
            slots,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per client.
    pub async fn serve(self) {
        info!(
            "Starting FTP server on {} (max {} clients)",
            self.config.control_socket(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.spawn_client(stream, addr),
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    fn spawn_client(&self, stream: TcpStream, addr: SocketAddr) {
        let permit = match Arc::clone(&self.slots).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Rejecting {}: {} clients already connected", addr, self.config.max_clients);
                tokio::spawn(reject_client(stream));
                return;
            }
        };

        info!("Accepted connection from {}", addr);
        let config = Arc::clone(&self.config);
        let lister = self.lister.clone();

        // Spawn a task for each client so accept loop doesn't block
        tokio::spawn(async move {
            handle_client(stream, addr, config, lister).await;
            drop(permit);
        });
    }
}

async fn reject_client(mut stream: TcpStream) {
    let reply = Reply::ServiceNotAvailable.to_string();
    if stream.write_all(reply.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}
