use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

struct Scheduled {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    next_generation: u64,
    tasks: HashMap<String, Scheduled>,
}

/// Keyed one-shot timers. Each key holds at most one pending task.
#[derive(Clone, Default)]
pub struct TaskMap {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for TaskMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskMap").field("len", &self.len()).finish()
    }
}

impl TaskMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`. An existing task under `key` is aborted and
    /// replaced. The entry removes itself once the task has run.
    pub fn schedule<F>(&self, key: impl Into<String>, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        let mut inner = self.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;

        let map = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;

            let mut inner = map.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if inner
                .tasks
                .get(&task_key)
                .is_some_and(|scheduled| scheduled.generation == generation)
            {
                inner.tasks.remove(&task_key);
            }
        });

        if let Some(previous) = inner.tasks.insert(key, Scheduled { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Abort the task under `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        match self.lock().tasks.remove(key) {
            Some(scheduled) => {
                scheduled.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().tasks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::TaskMap;

    #[tokio::test]
    async fn runs_and_removes_itself() {
        let tasks = TaskMap::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        tasks.schedule("a", Duration::from_millis(10), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(tasks.contains("a"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!tasks.contains("a"));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn rescheduling_replaces_the_pending_task() {
        let tasks = TaskMap::new();
        let runs = Arc::new(AtomicUsize::new(0));

        for add in [1, 10] {
            let counter = runs.clone();
            tasks.schedule("a", Duration::from_millis(20), async move {
                counter.fetch_add(add, Ordering::SeqCst);
            });
        }
        assert_eq!(tasks.len(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 10);
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn cancel_stops_the_task() {
        let tasks = TaskMap::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        tasks.schedule("a", Duration::from_millis(30), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(tasks.cancel("a"));
        assert!(!tasks.cancel("a"));
        assert!(!tasks.cancel("missing"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
