use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::{
        Semaphore,
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        watch,
    },
    task::JoinHandle,
    time::{sleep, timeout},
};
use tracing::{debug, info, warn};

use crate::{
    config::ServerConfig,
    http::{
        request::{HttpError, request_from_reader},
        response::write_response,
    },
    runtime::handler::Handler,
};

/// A connection waiting in the work queue for its handling task.
type Accepted = (TcpStream, SocketAddr);

/// A handle to a running server. Dropping it stops accepting just like `close`.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    acceptor: JoinHandle<()>,
}

impl Server {
    /// The address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new connections. Connections already accepted are served to the end.
    pub fn close(&self) {
        self.shutdown.send_replace(true);
    }

    /// Waits until the listener has been closed.
    pub async fn wait(self) {
        if let Err(error) = self.acceptor.await {
            warn!(%error, "acceptor task ended abnormally");
        }
    }
}

/// Owns the listener and the sending side of the work queue.
#[derive(Debug)]
struct Acceptor {
    listener: TcpListener,
    queue: UnboundedSender<Accepted>,
    shutdown: watch::Receiver<bool>,
}

impl Acceptor {
    /// Accepts connections and queues them until `close` is called or nobody drains the queue.
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    info!("listener closed");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "accepted connection");
                        if self.queue.send((stream, peer)).is_err() {
                            warn!("work queue closed, stop accepting");
                            return;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "failed to accept connection");
                        sleep(Duration::from_millis(50)).await;
                    }
                },
            }
        }
    }
}

/// Per-connection settings shared by all handling tasks.
#[derive(Clone, Debug)]
struct ConnectionSettings {
    request_timeout: Option<Duration>,
    admission: Option<Arc<Semaphore>>,
}

/// Serves the passed handler on the address from the configuration.
///
/// Accepted connections go through a work queue to a dispatcher spawning one task per connection.
/// Without `max_connections` the fan-out is unbounded.
///
/// # Errors
///
/// Throws an Error if binding the tcp listener fails.
pub async fn serve<H: Handler + 'static>(
    config: &ServerConfig,
    handler: Arc<H>,
) -> Result<Server, std::io::Error> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    let local_addr = listener.local_addr()?;

    let (queue_tx, queue_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let settings = ConnectionSettings {
        request_timeout: config.request_timeout(),
        admission: config
            .max_connections
            .map(|limit| Arc::new(Semaphore::new(limit))),
    };

    tokio::spawn(dispatch(queue_rx, handler, settings));
    let acceptor = tokio::spawn(
        Acceptor {
            listener,
            queue: queue_tx,
            shutdown: shutdown_rx,
        }
        .run(),
    );

    info!(address = %local_addr, max_connections = ?config.max_connections, "listening for connections");
    Ok(Server {
        local_addr,
        shutdown: shutdown_tx,
        acceptor,
    })
}

/// Drains the work queue, spawning an isolated task for each connection.
async fn dispatch<H: Handler + 'static>(
    mut queue: UnboundedReceiver<Accepted>,
    handler: Arc<H>,
    settings: ConnectionSettings,
) {
    while let Some((stream, peer)) = queue.recv().await {
        let permit = match &settings.admission {
            Some(semaphore) => match Arc::clone(semaphore).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_closed) => return,
            },
            None => None,
        };

        let handler = Arc::clone(&handler);
        let request_timeout = settings.request_timeout;
        tokio::spawn(async move {
            match handle(stream, &*handler, request_timeout).await {
                Ok(()) => debug!(%peer, "connection served"),
                Err(error) => warn!(%peer, %error, "closing connection"),
            }
            drop(permit);
        });
    }
}

/// Handles a single connection: parse one request, answer it, close.
///
/// # Errors
///
/// Throws an `HttpError` if parsing, the handler or writing fails. Nothing is written back in that case.
async fn handle<H: Handler>(
    mut stream: TcpStream,
    handler: &H,
    request_timeout: Option<Duration>,
) -> Result<(), HttpError> {
    let (reader, mut writer) = stream.split();

    let request = match request_timeout {
        Some(limit) => timeout(limit, request_from_reader(reader))
            .await
            .map_err(|_elapsed| HttpError::Timeout)??,
        None => request_from_reader(reader).await?,
    };
    debug!(
        method = request.method(),
        path = request.path(),
        version = request.protocol_version(),
        "parsed request"
    );

    let response = handler.call(&request).await?;
    write_response(&mut writer, &response).await?;
    writer.shutdown().await?;
    Ok(())
}
