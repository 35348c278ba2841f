use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::controller::LifecycleError;

/// One-shot notification that node bring-up has finished.
///
/// Resolves to `Ok(())` once the node is ready, or to the bring-up error as
/// returned by the runtime. Awaiting consumes the signal, so there is only
/// ever one reader.
#[derive(Debug)]
pub struct ReadySignal {
    rx: oneshot::Receiver<anyhow::Result<()>>,
}

impl ReadySignal {
    pub(crate) fn channel() -> (oneshot::Sender<anyhow::Result<()>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl Future for ReadySignal {
    type Output = anyhow::Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| match res {
            Ok(outcome) => outcome,
            // Bring-up task went away without reporting
            Err(_) => Err(LifecycleError::BringUpAborted.into()),
        })
    }
}
