use tokio::sync::watch;

/// Cooperative cancellation: the handle side flips a flag, the signal side
/// resolves a future once it is set. The scheduler only polls the signal at
/// its suspend points, so an in-flight UI interaction is never aborted.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once cancellation has been requested. Pends forever if the
    /// handle is dropped without cancelling, which makes it safe to race
    /// against a sleep in `tokio::select!`.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn cancel_channel() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}
