//! Job queue that hands events to an in-process receiver.

use crate::kernel::services::ports::{BoxFuture, JobError, JobEvent, JobQueue};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct ChannelJobQueue {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelJobQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl JobQueue for ChannelJobQueue {
    fn submit(&self, event: JobEvent) -> BoxFuture<'_, Result<(), JobError>> {
        let result = self
            .tx
            .send(event)
            .map_err(|_| JobError::new("job runner is not listening"));
        Box::pin(async move { result })
    }
}
