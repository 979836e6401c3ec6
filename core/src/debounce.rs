//! Trailing-edge debouncer.
//!
//! RULE: only the newest pushed value is ever delivered. A push during the
//! quiet window supersedes the pending value and restarts the window.

use std::{future::Future, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

enum Command<T> {
    Push(T),
    Cancel,
    Flush(oneshot::Sender<()>),
}

pub struct Debouncer<T> {
    tx:     mpsc::UnboundedSender<Command<T>>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(delay: Duration, sink: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command<T>>();
        let worker = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                let command = if pending.is_some() {
                    tokio::select! {
                        command = rx.recv() => command,
                        _ = tokio::time::sleep(delay) => {
                            if let Some(value) = pending.take() {
                                sink(value).await;
                            }
                            continue;
                        }
                    }
                } else {
                    rx.recv().await
                };

                match command {
                    Some(Command::Push(value)) => pending = Some(value),
                    Some(Command::Cancel) => pending = None,
                    Some(Command::Flush(done)) => {
                        if let Some(value) = pending.take() {
                            sink(value).await;
                        }
                        let _ = done.send(());
                    }
                    None => {
                        // Owner dropped: deliver what is left, then stop.
                        if let Some(value) = pending.take() {
                            sink(value).await;
                        }
                        break;
                    }
                }
            }
        });
        Self { tx, worker }
    }

    pub fn push(&self, value: T) {
        if self.tx.send(Command::Push(value)).is_err() {
            log::warn!("debouncer worker has stopped; value dropped");
        }
    }

    /// Drop the pending value, if any, without delivering it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    /// Deliver the pending value now and wait until the sink has finished.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Arc<Mutex<Vec<u32>>>, Debouncer<u32>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let debouncer = Debouncer::spawn(Duration::from_millis(1000), move |v| {
            let seen = Arc::clone(&sink_seen);
            async move { seen.lock().unwrap().push(v) }
        });
        (seen, debouncer)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_delivers_only_the_last_value() {
        let (seen, debouncer) = recording();
        for v in 1..=5 {
            debouncer.push(v);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending() {
        let (seen, debouncer) = recording();
        debouncer.push(7);
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately() {
        let (seen, debouncer) = recording();
        debouncer.push(3);
        debouncer.flush().await;
        assert_eq!(*seen.lock().unwrap(), vec![3]);
        assert!(debouncer.is_running());
    }
}
