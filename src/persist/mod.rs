//! Persistence adapter for machines that track an owning record.
//!
//! The adapter observes transitions and persists the record after state
//! progression: `bind` wraps every declared transition's enter handler so
//! that once the user's handler completes successfully, `save` is awaited
//! on the store. The adapter never participates in guard evaluation and
//! never changes the current state.
//!
//! Transitions added after `bind` are not wrapped; call `bind` again
//! after late additions if they should persist too.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::{Context, Event, HandlerFn, State};
use crate::machine::Machine;

/// Save interface for the owning record.
///
/// Implementations map the record onto whatever backing layer owns it:
/// a database row, a document, a file.
#[async_trait]
pub trait Store<R: Send + Sync>: Send + Sync {
    async fn save(&self, record: &R) -> anyhow::Result<()>;
}

/// Adapter configuration.
#[derive(Clone, Copy, Debug)]
pub struct PersistConfig {
    /// Persist the record after every committed transition. When false,
    /// `bind` installs nothing.
    pub save_after_transition: bool,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            save_after_transition: true,
        }
    }
}

/// Install the save hook on every transition currently declared on the
/// machine.
///
/// The wrapped enter handler runs the original handler first; a failure
/// there skips the save and surfaces unchanged. The save itself runs
/// inside the dispatch, after the state change and before the history
/// append, so a failing save aborts the dispatch the same way a failing
/// enter handler does.
pub fn bind<S, E, C, R>(
    machine: &mut Machine<S, E, C>,
    record: Arc<Mutex<R>>,
    store: Arc<dyn Store<R>>,
    config: PersistConfig,
) where
    S: State + 'static,
    E: Event,
    C: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    if !config.save_after_transition {
        return;
    }

    let mut wrapped_count = 0usize;
    for transition in machine.table_mut().iter_mut() {
        let previous = transition.on_enter.take();
        let record = Arc::clone(&record);
        let store = Arc::clone(&store);
        let wrapped: HandlerFn<E, C> = Arc::new(move |ctx: &mut Context<C>, event: &E| {
            let previous = previous.clone();
            let record = Arc::clone(&record);
            let store = Arc::clone(&store);
            Box::pin(async move {
                let followup = match &previous {
                    Some(handler) => handler(ctx, event).await?,
                    None => None,
                };
                let snapshot = record.lock().await;
                store.save(&snapshot).await?;
                Ok(followup)
            })
        });
        transition.on_enter = Some(wrapped);
        wrapped_count += 1;
    }
    debug!(transitions = wrapped_count, "persistence hook installed");
}

/// In-memory store recording every saved snapshot, for tests and local
/// runs.
pub struct MemoryStore<R> {
    saved: std::sync::Mutex<Vec<R>>,
}

impl<R: Clone> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            saved: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every snapshot saved so far, oldest first.
    pub fn saved(&self) -> Vec<R> {
        self.saved.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// The most recent snapshot, if any save has happened.
    pub fn last(&self) -> Option<R> {
        self.saved.lock().ok().and_then(|v| v.last().cloned())
    }

    /// Number of saves performed.
    pub fn save_count(&self) -> usize {
        self.saved.lock().map(|v| v.len()).unwrap_or(0)
    }
}

impl<R: Clone> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> Store<R> for MemoryStore<R>
where
    R: Clone + Send + Sync + 'static,
{
    async fn save(&self, record: &R) -> anyhow::Result<()> {
        self.saved
            .lock()
            .map_err(|e| anyhow::anyhow!("store mutex poisoned: {e}"))?
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TransitionBuilder;
    use crate::core::handler_async;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TaskState {
        Inactive,
        Active,
    }

    impl State for TaskState {
        fn name(&self) -> &str {
            match self {
                Self::Inactive => "Inactive",
                Self::Active => "Active",
            }
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    enum TaskEvent {
        Activate,
    }

    impl Event for TaskEvent {
        fn name(&self) -> &str {
            "Activate"
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TaskRecord {
        status: String,
    }

    fn machine_with_enter(
        record: Arc<Mutex<TaskRecord>>,
    ) -> Machine<TaskState, TaskEvent, ()> {
        let mut machine = Machine::new(TaskState::Inactive, ());
        machine.add_transitions(
            TransitionBuilder::new()
                .from(TaskState::Inactive)
                .on("Activate")
                .to(TaskState::Active)
                .on_enter_async(handler_async(move |_ctx: &mut Context<()>, _event: &TaskEvent| {
                    let record = Arc::clone(&record);
                    Box::pin(async move {
                        record.lock().await.status = "active".to_string();
                        Ok(None)
                    })
                }))
                .build()
                .unwrap(),
        );
        machine
    }

    #[tokio::test]
    async fn save_runs_after_the_enter_handler() {
        let record = Arc::new(Mutex::new(TaskRecord::default()));
        let store = Arc::new(MemoryStore::new());
        let mut machine = machine_with_enter(Arc::clone(&record));

        bind(
            &mut machine,
            Arc::clone(&record),
            store.clone(),
            PersistConfig::default(),
        );

        machine.send(TaskEvent::Activate).await.unwrap();

        // The snapshot already carries the enter handler's mutation.
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.last().unwrap().status, "active");
    }

    #[tokio::test]
    async fn transitions_without_enter_handlers_still_save() {
        let record = Arc::new(Mutex::new(TaskRecord::default()));
        let store = Arc::new(MemoryStore::new());
        let mut machine = Machine::new(TaskState::Inactive, ());
        machine.add_transitions(
            TransitionBuilder::new()
                .from(TaskState::Inactive)
                .on("Activate")
                .to(TaskState::Active)
                .build()
                .unwrap(),
        );

        bind(
            &mut machine,
            Arc::clone(&record),
            store.clone(),
            PersistConfig::default(),
        );

        machine.send(TaskEvent::Activate).await.unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn disabled_config_installs_nothing() {
        let record = Arc::new(Mutex::new(TaskRecord::default()));
        let store = Arc::new(MemoryStore::new());
        let mut machine = machine_with_enter(Arc::clone(&record));

        bind(
            &mut machine,
            Arc::clone(&record),
            store.clone(),
            PersistConfig {
                save_after_transition: false,
            },
        );

        machine.send(TaskEvent::Activate).await.unwrap();

        assert_eq!(store.save_count(), 0);
        // The user's own handler still ran.
        assert_eq!(record.lock().await.status, "active");
    }

    #[tokio::test]
    async fn memory_store_records_snapshots_in_order() {
        let store: MemoryStore<TaskRecord> = MemoryStore::new();
        store
            .save(&TaskRecord {
                status: "a".to_string(),
            })
            .await
            .unwrap();
        store
            .save(&TaskRecord {
                status: "b".to_string(),
            })
            .await
            .unwrap();

        let saved = store.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].status, "a");
        assert_eq!(store.last().unwrap().status, "b");
    }
}
