use std::{future::Future, sync::mpsc, thread};
use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tracing::debug;

/// Drives `future` to completion on a background task and blocks the calling thread until it finishes.
///
/// On a multi-thread runtime the future is spawned onto the current runtime.
/// Otherwise (no runtime, or a current-thread one that the caller itself would block) it runs on a dedicated thread
/// with its own current-thread runtime.
///
/// # Warning
/// This still deadlocks if every worker of the current multi-thread runtime is blocked the same way.
pub(crate) fn block_on<F>(future: F) -> anyhow::Result<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(1);

    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            debug!("Blocking on a task of the current runtime");
            handle.spawn(async move {
                let _ = sender.send(future.await);
            });
        }
        _ => {
            debug!("Blocking on a dedicated runtime thread");
            let runtime = Builder::new_current_thread().enable_all().build()?;
            thread::Builder::new().name("tessera-blocking".to_owned()).spawn(move || {
                let _ = sender.send(runtime.block_on(future));
            })?;
        }
    }

    receiver
        .recv()
        .map_err(|_| anyhow::anyhow!("Background task finished without producing a result"))
}
