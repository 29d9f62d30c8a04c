//! Task spawning on the platform's executor
//!
//! Native builds run on the Tokio multi-threaded runtime started by
//! `run_native`. Web builds have no Tokio runtime; tasks run on the browser
//! event loop through `wasm_bindgen_futures`, which also accepts the `!Send`
//! futures produced by browser HTTP clients.

use std::future::Future;

/// Spawn a detached task.
///
/// The future must be `Send` on native targets only; on the web it may hold
/// JavaScript handles.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    #[cfg(feature = "profiling")]
    {
        tokio::spawn(async move {
            profiling::scope!(
                "async_runtime::spawn",
                format!("task_type={}", std::any::type_name::<F>()).as_str()
            );
            future.await
        });
    }
    #[cfg(not(feature = "profiling"))]
    {
        tokio::spawn(future);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(feature = "profiling")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            profiling::scope!("async_runtime::spawn");
            future.await
        });
    }
    #[cfg(not(feature = "profiling"))]
    {
        wasm_bindgen_futures::spawn_local(future);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_task_runs() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn(async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.ok(), Some(42));
    }
}
