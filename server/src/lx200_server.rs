// TCP front end of the LX200 handset emulator. Clients such as SkySafari or
// Stellarium connect as they would to a serial-to-network bridge in front of a
// real handset.
//
// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::time::sleep;

use crate::command_dispatcher::CommandDispatcher;
use crate::lx200_session::{Lx200Session, SessionConfig};

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 4030;

// Pause after a failed accept, so that a persistent failure (e.g. out of file
// descriptors) does not spin the accept loop.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[async_trait]
pub trait Lx200Telescope {
    async fn serve_requests(&mut self)
                            -> Result<(), Box<dyn Error + Send + Sync + 'static>>;
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: DEFAULT_PORT, session: SessionConfig::default() }
    }
}

pub struct Lx200TcpTelescope {
    config: ServerConfig,
    dispatcher: Arc<CommandDispatcher>,
}

#[async_trait]
impl Lx200Telescope for Lx200TcpTelescope {
    async fn serve_requests(&mut self)
                            -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;
        info!("Running LX200 server on: {}", listener.local_addr()?);
        self.serve_listener(listener).await
    }
}

impl Lx200TcpTelescope {
    pub fn new(config: ServerConfig) -> Self {
        Lx200TcpTelescope {
            config,
            dispatcher: Arc::new(CommandDispatcher::new()),
        }
    }

    /// Accepts clients on `listener` forever. Each client is served by its own
    /// task with its own session state; a failing client does not affect the
    /// others or the listener.
    pub async fn serve_listener(&self, listener: TcpListener)
                                -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        loop {
            let (mut stream, addr) =
                match accepted_or_pause(listener.accept().await).await {
                    Some(accepted) => accepted,
                    None => continue,
                };
            info!("New LX200 client: {}", addr);
            let mut session = Lx200Session::new(self.config.session.clone(),
                                                self.dispatcher.clone());
            tokio::spawn(async move {
                match session.run(&mut stream).await {
                    Ok(()) => info!("LX200 client {} disconnected", addr),
                    Err(e) => warn!("LX200 client {} dropped: {}", addr, e),
                }
            });
        }
    }
}

// Passes through a successful accept. A failed one is logged and answered
// with a pause before the caller retries.
async fn accepted_or_pause<T>(result: std::io::Result<T>) -> Option<T> {
    match result {
        Ok(accepted) => Some(accepted),
        Err(e) => {
            warn!("Failed to accept connection: {}", e);
            sleep(ACCEPT_RETRY_DELAY).await;
            None
        }
    }
}

pub fn create_lx200_server(config: ServerConfig)
                           -> Box<dyn Lx200Telescope + Send> {
    Box::new(Lx200TcpTelescope::new(config))
}

// mod tests.
