//! Handler type aliases for machine callbacks.
//!
//! Guards, transition handlers, and subscribers are stored behind trait
//! objects so that both immediate and deferred callbacks fit one shape:
//! each returns a boxed pinned future borrowing its arguments.
//!
//! A handler or subscriber may return a follow-up event. Follow-ups are
//! queued on the machine and dispatched in FIFO order after the current
//! dispatch completes, which is how a callback "sends" on the machine it
//! is running inside without observing a half-finished transition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::core::context::Context;

/// Boxed future returned by machine callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for user-supplied callbacks.
///
/// Failures are wrapped by the engine into [`MachineError::Handler`]
/// together with the event and endpoint states of the dispatch.
///
/// [`MachineError::Handler`]: crate::machine::MachineError::Handler
pub type HandlerResult<T> = anyhow::Result<T>;

/// Async guard predicate over `(context, event)`.
///
/// Guards are read-only: they observe the context but may not mutate it.
pub type GuardFn<E, C> = Arc<
    dyn for<'a> Fn(&'a Context<C>, &'a E) -> BoxFuture<'a, HandlerResult<bool>> + Send + Sync,
>;

/// Async transition handler (`on_enter` / `on_exit`) over
/// `(context, event)`, optionally returning a follow-up event.
pub type HandlerFn<E, C> = Arc<
    dyn for<'a> Fn(&'a mut Context<C>, &'a E) -> BoxFuture<'a, HandlerResult<Option<E>>>
        + Send
        + Sync,
>;

/// Async subscriber callback, same shape as a transition handler.
pub type SubscriberFn<E, C> = Arc<
    dyn for<'a> Fn(&'a mut Context<C>, &'a E) -> BoxFuture<'a, HandlerResult<Option<E>>>
        + Send
        + Sync,
>;

/// Wrap a synchronous closure as a [`GuardFn`].
pub fn guard<E, C, F>(predicate: F) -> GuardFn<E, C>
where
    F: Fn(&Context<C>, &E) -> bool + Send + Sync + 'static,
{
    Arc::new(move |ctx: &Context<C>, event: &E| {
        let verdict = predicate(ctx, event);
        Box::pin(async move { Ok(verdict) })
    })
}

/// Wrap an asynchronous closure as a [`GuardFn`].
pub fn guard_async<E, C, F>(predicate: F) -> GuardFn<E, C>
where
    F: for<'a> Fn(&'a Context<C>, &'a E) -> BoxFuture<'a, HandlerResult<bool>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(predicate)
}

/// Wrap a synchronous closure as a [`HandlerFn`].
///
/// The closure returns the optional follow-up event directly; it cannot
/// fail. Use [`handler_async`] for fallible or awaiting handlers.
pub fn handler<E, C, F>(f: F) -> HandlerFn<E, C>
where
    F: Fn(&mut Context<C>, &E) -> Option<E> + Send + Sync + 'static,
    E: Send,
{
    Arc::new(move |ctx: &mut Context<C>, event: &E| {
        let followup = f(ctx, event);
        Box::pin(async move { Ok(followup) })
    })
}

/// Wrap an asynchronous closure as a [`HandlerFn`].
pub fn handler_async<E, C, F>(f: F) -> HandlerFn<E, C>
where
    F: for<'a> Fn(&'a mut Context<C>, &'a E) -> BoxFuture<'a, HandlerResult<Option<E>>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Wrap a synchronous closure as a [`SubscriberFn`].
pub fn subscriber<E, C, F>(f: F) -> SubscriberFn<E, C>
where
    F: Fn(&mut Context<C>, &E) -> Option<E> + Send + Sync + 'static,
    E: Send,
{
    handler(f)
}

/// Wrap an asynchronous closure as a [`SubscriberFn`].
pub fn subscriber_async<E, C, F>(f: F) -> SubscriberFn<E, C>
where
    F: for<'a> Fn(&'a mut Context<C>, &'a E) -> BoxFuture<'a, HandlerResult<Option<E>>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}
