// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned from `update`
//!
//! A task is a set of futures that each resolve to a follow-up message. The
//! host runs them on its tokio runtime and feeds the messages back into
//! `update`, so state is only ever mutated there.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;

/// Work to run outside `update`
#[must_use = "tasks do nothing unless handed to the runtime"]
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    /// No work
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Run `future` and map its output to a message
    pub fn perform<T, F>(future: F, map: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            futures: vec![future.map(map).boxed()],
        }
    }

    /// Combine several tasks
    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    /// Hand the futures to a runtime
    pub fn into_futures(self) -> Vec<BoxFuture<'static, M>> {
        self.futures
    }

    /// Run every future to completion and collect the messages, in order
    pub async fn collect(self) -> Vec<M> {
        futures::future::join_all(self.futures).await
    }
}

impl<M> std::fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_collects_in_order() {
        let task = Task::batch([
            Task::perform(async { 1 }, |n: i32| n * 10),
            Task::none(),
            Task::perform(async { 2 }, |n: i32| n * 10),
        ]);
        assert_eq!(task.len(), 2);
        assert_eq!(task.collect().await, vec![10, 20]);
    }
}
