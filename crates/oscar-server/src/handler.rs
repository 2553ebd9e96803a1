//! Message handlers

use async_trait::async_trait;
use oscar_core::Message;
use std::sync::Arc;

/// Receives every message whose routing matched the pattern it was
/// registered under.
///
/// Errors are logged by the listener and never stop dispatch.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, message: &Message) -> anyhow::Result<()>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, message: &Message) -> anyhow::Result<()> {
        (**self).handle(message).await
    }
}

/// Handler backed by a synchronous closure, see [`handler_fn`]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Message) -> anyhow::Result<()> + Send + Sync,
{
    async fn handle(&self, message: &Message) -> anyhow::Result<()> {
        (self.f)(message)
    }
}

/// Wrap a closure as a [`Handler`]
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Message) -> anyhow::Result<()> + Send + Sync,
{
    HandlerFn { f }
}
