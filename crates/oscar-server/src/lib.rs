//! Oscar Server
//!
//! Concurrent OSC dispatch listener: a decode task feeding a bounded queue
//! drained by a pool of workers that route each message to its handlers.
//!
//! ```no_run
//! use oscar_server::{handler_fn, Listener, Shutdown};
//! use oscar_transport::UdpTransport;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let socket = UdpTransport::bind("127.0.0.1:9000").await?;
//! let mut listener = Listener::new(socket, 4);
//! listener.handle("/test", handler_fn(|msg| {
//!     println!("{}", msg);
//!     Ok(())
//! }));
//!
//! let shutdown = Shutdown::new();
//! listener.serve(shutdown).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod group;
pub mod handler;
pub mod listener;
pub mod shutdown;

pub use error::{Result, ServerError};
pub use group::TaskGroup;
pub use handler::{handler_fn, Handler, HandlerFn};
pub use listener::{Dispatcher, Listener, ListenerConfig};
pub use shutdown::Shutdown;
