//! Timer-based coalescing of rapid edits.
//!
//! Every key holds at most one pending value. A new value for the key replaces
//! the buffered one and restarts its idle timer; when the timer runs out the
//! latest value is emitted on the output channel.

use crate::domain::{Todo, TodoId};
use crate::store::EntityStore;
use crate::usecase::TodoUseCase;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default idle interval before a title edit is written
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

pub fn default_interval() -> Duration {
    Duration::from_millis(DEFAULT_DEBOUNCE_MS)
}

struct Pending<V> {
    generation: u64,
    value: V,
    timer: JoinHandle<()>,
}

struct Inner<K, V> {
    pending: HashMap<K, Pending<V>>,
    generation: u64,
}

/// Per-key debouncer emitting `(key, latest value)` pairs
pub struct Debouncer<K, V> {
    interval: Duration,
    inner: Arc<Mutex<Inner<K, V>>>,
    output: mpsc::UnboundedSender<(K, V)>,
}

fn lock<K, V>(inner: &Mutex<Inner<K, V>>) -> MutexGuard<'_, Inner<K, V>> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Create a debouncer and the receiver its flushed values arrive on.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(interval: Duration) -> (Self, mpsc::UnboundedReceiver<(K, V)>) {
        let (output, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            interval,
            inner: Arc::new(Mutex::new(Inner {
                pending: HashMap::new(),
                generation: 0,
            })),
            output,
        };
        (debouncer, rx)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Buffer `value` for `key`, cancelling any pending flush for that key
    pub fn push(&self, key: K, value: V) {
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        let generation = inner.generation;

        let timer = {
            let shared = Arc::clone(&self.inner);
            let output = self.output.clone();
            let interval = self.interval;
            let key = key.clone();
            tokio::spawn(async move {
                tokio::time::sleep(interval).await;
                let due = {
                    let mut inner = lock(&shared);
                    // A newer push may have raced past the abort; only the
                    // latest generation flushes.
                    match inner.pending.get(&key) {
                        Some(pending) if pending.generation == generation => {
                            inner.pending.remove(&key).map(|p| p.value)
                        }
                        _ => None,
                    }
                };
                if let Some(value) = due {
                    let _ = output.send((key, value));
                }
            })
        };

        if let Some(previous) = inner.pending.insert(
            key,
            Pending {
                generation,
                value,
                timer,
            },
        ) {
            previous.timer.abort();
        }
    }

    /// Emit the buffered value for `key` now; returns false if nothing was pending
    pub fn flush(&self, key: &K) -> bool {
        let pending = lock(&self.inner).pending.remove(key);
        match pending {
            Some(pending) => {
                pending.timer.abort();
                let _ = self.output.send((key.clone(), pending.value));
                true
            }
            None => false,
        }
    }

    /// Drop the buffered value for `key` without emitting it
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.inner).pending.remove(key) {
            Some(pending) => {
                pending.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Emit every buffered value now
    pub fn flush_all(&self) {
        let drained: Vec<(K, Pending<V>)> = lock(&self.inner).pending.drain().collect();
        for (key, pending) in drained {
            pending.timer.abort();
            let _ = self.output.send((key, pending.value));
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.inner).pending.len()
    }
}

impl<K, V> Drop for Debouncer<K, V> {
    fn drop(&mut self) {
        for (_, pending) in lock(&self.inner).pending.drain() {
            pending.timer.abort();
        }
    }
}

/// Debounced title edits written through a [`TodoUseCase`].
///
/// Keystrokes go in with [`edit`](Self::edit); once a todo's title has been
/// idle for the interval, the latest text is written. [`submit`](Self::submit)
/// writes immediately. Failed writes are logged, since no caller is waiting
/// on them.
pub struct TitleWriter {
    debouncer: Debouncer<TodoId, String>,
    worker: JoinHandle<()>,
}

impl TitleWriter {
    /// Spawn the writer task. Must be called within a tokio runtime.
    pub fn spawn(
        interval: Duration,
        store: Arc<dyn EntityStore>,
        todos: Arc<dyn TodoUseCase>,
    ) -> Self {
        let (debouncer, mut rx) = Debouncer::<TodoId, String>::new(interval);
        let worker = tokio::spawn(async move {
            while let Some((id, title)) = rx.recv().await {
                if let Err(e) = write_title(store.as_ref(), todos.as_ref(), id, &title).await {
                    warn!(todo = %id, error = %e, "debounced title write failed");
                }
            }
        });
        Self { debouncer, worker }
    }

    pub fn edit(&self, todo: TodoId, title: impl Into<String>) {
        self.debouncer.push(todo, title.into());
    }

    /// Write the pending title for `todo` without waiting
    pub fn submit(&self, todo: TodoId) -> bool {
        self.debouncer.flush(&todo)
    }

    /// Discard the pending title for `todo`
    pub fn discard(&self, todo: TodoId) -> bool {
        self.debouncer.cancel(&todo)
    }

    pub fn pending_count(&self) -> usize {
        self.debouncer.pending_count()
    }

    /// Flush every pending edit and wait until all of them are written
    pub async fn shutdown(self) {
        self.debouncer.flush_all();
        let Self { debouncer, worker } = self;
        // Closing the channel lets the worker drain and exit.
        drop(debouncer);
        let _ = worker.await;
    }
}

async fn write_title(
    store: &dyn EntityStore,
    todos: &dyn TodoUseCase,
    id: TodoId,
    title: &str,
) -> anyhow::Result<Todo> {
    let todo = store
        .read_todo(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("todo {} no longer exists", id))?;
    let saved = todos.update(&todo, title).await?;
    debug!(todo = %id, "debounced title written");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::DailyTodoListStore;
    use crate::domain::{NewProject, Project};
    use crate::store::InMemoryStore;
    use crate::usecase::DefaultTodoUseCase;

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_latest() {
        let (debouncer, mut rx) = Debouncer::new(default_interval());
        debouncer.push("title", "W".to_string());
        debouncer.push("title", "Wr".to_string());
        debouncer.push("title", "Write".to_string());
        assert_eq!(debouncer.pending_count(), 1);

        assert_eq!(rx.recv().await, Some(("title", "Write".to_string())));
        assert!(rx.try_recv().is_err());
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_input_restarts_timer() {
        let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(100));
        debouncer.push(1, "a");
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.push(1, "ab");
        tokio::time::sleep(Duration::from_millis(60)).await;

        // 120ms since the first push, only 60ms idle: nothing yet
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rx.try_recv().unwrap(), (1, "ab"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(100));
        debouncer.push("a", 1);
        debouncer.push("b", 2);

        let mut got = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        got.sort();
        assert_eq!(got, vec![("a", 1), ("b", 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_and_cancel() {
        let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(100));
        debouncer.push("a", 1);
        assert!(debouncer.flush(&"a"));
        assert_eq!(rx.try_recv().unwrap(), ("a", 1));
        assert!(!debouncer.flush(&"a"));

        debouncer.push("b", 2);
        assert!(debouncer.cancel(&"b"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_writer_persists_latest_title() {
        let store = Arc::new(InMemoryStore::new());
        let daily = Arc::new(DailyTodoListStore::new());
        let todos: Arc<dyn TodoUseCase> =
            Arc::new(DefaultTodoUseCase::new(store.clone(), daily));
        let project = store
            .create_project(Project::new(NewProject::default()))
            .await
            .unwrap();
        let todo = todos.create(&project, None, "draft").await.unwrap();

        let writer = TitleWriter::spawn(default_interval(), store.clone(), todos);
        writer.edit(todo.id, "dra");
        writer.edit(todo.id, "");
        writer.edit(todo.id, "final");
        writer.shutdown().await;

        let stored = store.read_todo(todo.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "final");
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_writer_skips_blank_title() {
        let store = Arc::new(InMemoryStore::new());
        let daily = Arc::new(DailyTodoListStore::new());
        let todos: Arc<dyn TodoUseCase> =
            Arc::new(DefaultTodoUseCase::new(store.clone(), daily));
        let project = store
            .create_project(Project::new(NewProject::default()))
            .await
            .unwrap();
        let todo = todos.create(&project, None, "keep").await.unwrap();

        let writer = TitleWriter::spawn(default_interval(), store.clone(), todos);
        writer.edit(todo.id, "");
        tokio::time::sleep(Duration::from_millis(500)).await;
        writer.shutdown().await;

        let stored = store.read_todo(todo.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "keep");
    }
}
