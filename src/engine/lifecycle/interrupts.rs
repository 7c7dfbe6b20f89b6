//! Operator interrupts delivered to the lifecycle controller.
//!
//! The binary forwards Ctrl-C into an unbounded channel; the controller races
//! its blocking engine calls against [`Interrupts::received`]. Tests send
//! interrupts directly through [`InterruptSender`].

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending half of the interrupt channel.
#[derive(Debug, Clone)]
pub struct InterruptSender {
    sender: mpsc::UnboundedSender<()>,
}

impl InterruptSender {
    /// Deliver one interrupt. Returns `false` once the receiver is gone.
    #[must_use]
    pub fn interrupt(&self) -> bool {
        self.sender.send(()).is_ok()
    }
}

/// Receiving half of the interrupt channel.
#[derive(Debug)]
pub struct Interrupts {
    receiver: mpsc::UnboundedReceiver<()>,
}

impl Interrupts {
    /// Wait for the next interrupt.
    ///
    /// Never completes once every sender has been dropped, so a closed
    /// channel cannot be mistaken for an interrupt.
    pub async fn received(&mut self) {
        if self.receiver.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    /// Take an already-delivered interrupt without waiting.
    pub fn try_received(&mut self) -> bool {
        self.receiver.try_recv().is_ok()
    }
}

/// Create a connected interrupt sender and receiver.
#[must_use]
pub fn interrupt_channel() -> (InterruptSender, Interrupts) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (InterruptSender { sender }, Interrupts { receiver })
}

/// Spawn a task that forwards every Ctrl-C to `sender`.
///
/// The task ends when the receiver is dropped or the signal handler cannot be
/// installed. Must be called from within a Tokio runtime.
pub fn forward_ctrl_c(sender: InterruptSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::warn!(%error, "could not listen for Ctrl-C");
                break;
            }
            tracing::info!("received interrupt signal");
            if !sender.interrupt() {
                break;
            }
        }
    })
}
