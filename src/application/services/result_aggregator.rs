//! Fan-out/fan-in over spawned tokio tasks.
//!
//! Each task is tagged with a key describing what it works on. Results are
//! collected in completion order into a success list and a failure list, and
//! [`ResultAggregator::finish`] returns only after every spawned task has
//! reported. A panicking task is reported as a failure under its key instead
//! of being lost.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinSet;
use tracing::error;

/// Failure of a task that panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPanicked {
    pub message: String,
}

impl TaskPanicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "task panicked".to_string()
        };
        Self { message }
    }
}

/// Everything the spawned tasks reported, in arrival order
#[derive(Debug)]
pub struct Aggregated<K, T, E> {
    pub successes: Vec<(K, T)>,
    pub failures: Vec<(K, E)>,
}

/// Spawns keyed tasks and merges their results.
pub struct ResultAggregator<K, T, E> {
    tasks: JoinSet<(K, Result<T, E>)>,
}

impl<K, T, E> Default for ResultAggregator<K, T, E>
where
    K: Send + 'static,
    T: Send + 'static,
    E: From<TaskPanicked> + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T, E> ResultAggregator<K, T, E>
where
    K: Send + 'static,
    T: Send + 'static,
    E: From<TaskPanicked> + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Spawn `task` on the runtime, reporting under `key`.
    pub fn spawn<F>(&mut self, key: K, task: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.tasks.spawn(async move {
            let result = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(E::from(TaskPanicked::from_payload(payload))),
            };
            (key, result)
        });
    }

    /// Wait for every task and return what they reported.
    pub async fn finish(mut self) -> Aggregated<K, T, E> {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((key, Ok(value))) => successes.push((key, value)),
                Ok((key, Err(err))) => failures.push((key, err)),
                // Unreachable while keys travel inside the task: panics are
                // caught before the task returns and the set is never
                // aborted, so every key comes back through the arms above.
                // Only a runtime shutdown mid-join can land here.
                Err(join_error) => error!("Aggregated task did not complete: {}", join_error),
            }
        }

        Aggregated {
            successes,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Failed(&'static str),
        Panicked(String),
    }

    impl From<TaskPanicked> for TestError {
        fn from(panic: TaskPanicked) -> Self {
            Self::Panicked(panic.message)
        }
    }

    #[tokio::test]
    async fn test_collects_successes_and_failures() {
        let mut aggregator: ResultAggregator<u32, u32, TestError> = ResultAggregator::new();
        for i in 0..6u32 {
            aggregator.spawn(i, async move {
                if i % 3 == 0 {
                    Err(TestError::Failed("divisible by three"))
                } else {
                    Ok(i * 10)
                }
            });
        }

        let aggregated = aggregator.finish().await;
        assert_eq!(aggregated.successes.len() + aggregated.failures.len(), 6);

        let mut failed: Vec<u32> = aggregated.failures.iter().map(|(k, _)| *k).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec![0, 3]);

        let mut values: Vec<u32> = aggregated.successes.iter().map(|(_, v)| *v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![10, 20, 40, 50]);
    }

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        let mut aggregator: ResultAggregator<&'static str, (), TestError> = ResultAggregator::new();
        aggregator.spawn("slow", async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        });
        aggregator.spawn("fast", async { Ok(()) });

        let aggregated = aggregator.finish().await;
        let order: Vec<&str> = aggregated.successes.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported_under_its_key() {
        let mut aggregator: ResultAggregator<&'static str, (), TestError> = ResultAggregator::new();
        aggregator.spawn("ok", async { Ok(()) });
        aggregator.spawn("boom", async {
            if true {
                panic!("exploded");
            }
            Ok(())
        });
        aggregator.spawn("boom-owned", async {
            if true {
                panic!("{}", String::from("formatted"));
            }
            Ok(())
        });

        let mut aggregated = aggregator.finish().await;
        assert_eq!(aggregated.successes.len(), 1);
        aggregated.failures.sort_by_key(|(key, _)| *key);
        assert_eq!(
            aggregated.failures,
            vec![
                ("boom", TestError::Panicked("exploded".to_string())),
                (
                    "boom-owned",
                    TestError::Panicked("formatted".to_string())
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_aggregator_finishes_immediately() {
        let aggregator: ResultAggregator<(), (), TestError> = ResultAggregator::default();
        let aggregated = aggregator.finish().await;
        assert!(aggregated.successes.is_empty());
        assert!(aggregated.failures.is_empty());
    }
}
