//! Dispatch listener
//!
//! One decode task reads datagrams from the socket, decodes them and pushes
//! messages onto a bounded queue. A pool of workers drains the queue and runs
//! every matching handler. When the queue is full the decode task waits, which
//! leaves further datagrams in the socket.

use oscar_core::{Message, Pattern, MAX_DATAGRAM_SIZE};
use oscar_transport::DatagramSocket;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, ServerError};
use crate::group::TaskGroup;
use crate::handler::Handler;
use crate::shutdown::Shutdown;

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Number of worker tasks draining the queue
    pub workers: usize,
    /// Decoded messages buffered between the decode task and the workers
    pub queue_capacity: usize,
    /// Receive buffer size; longer datagrams are truncated by the socket
    pub max_datagram_size: usize,
    /// Report messages that match no handler as [`ServerError::UnmatchedPattern`]
    pub strict_routing: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 100,
            max_datagram_size: MAX_DATAGRAM_SIZE,
            strict_routing: false,
        }
    }
}

impl ListenerConfig {
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    pub fn strict_routing(mut self, strict: bool) -> Self {
        self.strict_routing = strict;
        self
    }

    /// Check the values `serve` depends on
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ServerError::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ServerError::Config(
                "queue_capacity must be at least 1".into(),
            ));
        }
        if self.max_datagram_size == 0 {
            return Err(ServerError::Config(
                "max_datagram_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

struct Route {
    pattern: String,
    handler: Arc<dyn Handler>,
}

/// Frozen route table shared by the workers.
///
/// Routing compiles the message address into a [`Pattern`] and tests it
/// against each registered pattern text, so a message sent to `/mixer/*`
/// reaches handlers registered at `/mixer/1` and `/mixer/2`.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<[Route]>,
    strict: bool,
}

impl Dispatcher {
    fn new(routes: Vec<Route>, strict: bool) -> Self {
        Self {
            routes: routes.into(),
            strict,
        }
    }

    /// Registered pattern texts, in registration order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    /// Run every matching handler in registration order.
    ///
    /// Returns the number of handlers that matched. Handler failures are
    /// logged and do not stop the remaining handlers. Fails if the address
    /// is not a valid pattern, or if nothing matched under strict routing.
    pub async fn dispatch(&self, message: &Message) -> Result<usize> {
        let pattern = Pattern::parse(&message.address)?;

        let mut matched = 0;
        for route in self.routes.iter() {
            if !pattern.matches(&route.pattern) {
                continue;
            }
            matched += 1;
            if let Err(e) = route.handler.handle(message).await {
                warn!(pattern = %route.pattern, "Handler failed for {}: {:#}", message, e);
            }
        }

        if matched == 0 && self.strict {
            return Err(ServerError::UnmatchedPattern(message.clone()));
        }
        Ok(matched)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .field("strict", &self.strict)
            .finish()
    }
}

/// OSC dispatch listener.
///
/// Register handlers with [`handle`](Self::handle), then call
/// [`serve`](Self::serve), which consumes the listener.
pub struct Listener<S> {
    socket: S,
    config: ListenerConfig,
    routes: Vec<Route>,
}

impl<S> Listener<S>
where
    S: DatagramSocket + 'static,
{
    /// Listener with `workers` workers and default settings otherwise
    pub fn new(socket: S, workers: usize) -> Self {
        Self::with_config(socket, ListenerConfig::default().workers(workers))
    }

    pub fn with_config(socket: S, config: ListenerConfig) -> Self {
        Self {
            socket,
            config,
            routes: Vec::new(),
        }
    }

    /// Register `handler` under `pattern`. Duplicate patterns are allowed;
    /// each registration is invoked.
    pub fn handle<H>(&mut self, pattern: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        let pattern = pattern.into();
        debug!("Registered handler for {}", pattern);
        self.routes.push(Route {
            pattern,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Snapshot of the current route table
    pub fn dispatcher(&self) -> Dispatcher {
        let routes = self
            .routes
            .iter()
            .map(|r| Route {
                pattern: r.pattern.clone(),
                handler: Arc::clone(&r.handler),
            })
            .collect();
        Dispatcher::new(routes, self.config.strict_routing)
    }

    /// Run until `shutdown` is cancelled or the socket fails.
    ///
    /// Returns [`ServerError::Cancelled`] after an external cancel and
    /// [`ServerError::Transport`] when receiving fails. Either way every
    /// task has exited when this returns.
    pub async fn serve(self, shutdown: Shutdown) -> Result<()> {
        self.config.validate()?;

        let Listener {
            socket,
            config,
            routes,
        } = self;
        let addr = socket.local_addr().ok();
        let dispatcher = Dispatcher::new(routes, config.strict_routing);
        let socket = Arc::new(socket);
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let mut group = TaskGroup::new();
        let token = group.token();

        group.spawn("shutdown", watch_shutdown(shutdown, token.clone()));
        group.spawn(
            "decode",
            decode_loop(socket, tx, config.max_datagram_size, token.clone()),
        );
        for id in 0..config.workers {
            group.spawn(
                "worker",
                worker_loop(id, Arc::clone(&rx), dispatcher.clone(), token.clone()),
            );
        }

        match addr {
            Some(addr) => info!(
                "Listening on {} with {} workers, {} routes",
                addr,
                config.workers,
                dispatcher.routes.len()
            ),
            None => info!(
                "Listening with {} workers, {} routes",
                config.workers,
                dispatcher.routes.len()
            ),
        }

        let result = group.wait().await;
        info!("Listener stopped");
        result
    }
}

/// Promote an external cancel into a group failure
async fn watch_shutdown(shutdown: Shutdown, group: Shutdown) -> Result<()> {
    tokio::select! {
        _ = shutdown.cancelled() => Err(ServerError::Cancelled),
        _ = group.cancelled() => Ok(()),
    }
}

async fn decode_loop<S>(
    socket: Arc<S>,
    queue: mpsc::Sender<Message>,
    max_datagram_size: usize,
    token: Shutdown,
) -> Result<()>
where
    S: DatagramSocket,
{
    let mut buf = vec![0u8; max_datagram_size];

    loop {
        let (len, from) = tokio::select! {
            _ = token.cancelled() => return Ok(()),
            received = socket.recv_from(&mut buf) => received?,
        };

        if len == 0 {
            trace!("Ignoring empty datagram from {}", from);
            continue;
        }

        let message = match Message::parse(&buf[..len]) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping undecodable datagram from {}: {}", from, e);
                continue;
            }
        };
        trace!("Received {} from {}", message, from);

        tokio::select! {
            _ = token.cancelled() => return Ok(()),
            sent = queue.send(message) => {
                if sent.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

async fn worker_loop(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Message>>>,
    dispatcher: Dispatcher,
    token: Shutdown,
) -> Result<()> {
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => return Ok(()),
            next = async { queue.lock().await.recv().await } => next,
        };
        let Some(message) = next else {
            return Ok(());
        };

        match dispatcher.dispatch(&message).await {
            Ok(matched) => trace!(worker = id, "{} matched {} handlers", message.address, matched),
            Err(ServerError::UnmatchedPattern(message)) => {
                warn!(worker = id, "No handler matched {}", message)
            }
            Err(e) => warn!(worker = id, "Skipping {}: {}", message.address, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use oscar_test_utils::MemorySocket;

    #[test]
    fn test_config_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.max_datagram_size, 65536);
        assert!(!config.strict_routing);
    }

    #[test]
    fn test_config_builder() {
        let config = ListenerConfig::default()
            .workers(2)
            .queue_capacity(10)
            .max_datagram_size(1024)
            .strict_routing(true);
        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.max_datagram_size, 1024);
        assert!(config.strict_routing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(ListenerConfig::default().workers(0).validate().is_err());
        assert!(ListenerConfig::default().queue_capacity(0).validate().is_err());
        assert!(ListenerConfig::default()
            .max_datagram_size(0)
            .validate()
            .is_err());
    }

    #[tokio::test]
    async fn test_serve_rejects_invalid_config() {
        let listener = Listener::new(MemorySocket::new(), 0);
        let result = listener.serve(Shutdown::new()).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_dispatcher_snapshot_keeps_order() {
        let mut listener = Listener::new(MemorySocket::new(), 1);
        listener
            .handle("/b", handler_fn(|_: &Message| Ok(())))
            .handle("/a", handler_fn(|_: &Message| Ok(())));
        let dispatcher = listener.dispatcher();
        let patterns: Vec<&str> = dispatcher.patterns().collect();
        assert_eq!(patterns, vec!["/b", "/a"]);
    }

    #[tokio::test]
    async fn test_dispatch_invalid_address() {
        let mut listener = Listener::new(MemorySocket::new(), 1);
        listener.handle("/x", handler_fn(|_: &Message| Ok(())));
        let result = listener.dispatcher().dispatch(&Message::new("/x/[")).await;
        assert!(matches!(result, Err(ServerError::Pattern(_))));
    }
}
