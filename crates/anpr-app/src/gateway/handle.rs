//! Pending recognition results

use anpr_types::{Error, RecognitionResult, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot::{self, error::TryRecvError};

pub(crate) type ResultSlot = oneshot::Sender<Result<RecognitionResult>>;

/// Completion handle for one recognition call.
///
/// Resolved by whichever thread runs the command. Await it from async code,
/// or call [`RecognitionHandle::wait`] from a plain thread. The result can be
/// taken once; afterwards every accessor yields [`Error::ResultTaken`].
#[derive(Debug)]
pub struct RecognitionHandle {
    ordinal: u64,
    /// `None` once the result has been handed out
    receiver: Option<oneshot::Receiver<Result<RecognitionResult>>>,
}

impl RecognitionHandle {
    pub(crate) fn channel(ordinal: u64) -> (ResultSlot, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            sender,
            Self {
                ordinal,
                receiver: Some(receiver),
            },
        )
    }

    /// Position of the call in the gateway's submission order
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Take the result if the command has run. `None` while still queued.
    pub fn try_result(&mut self) -> Option<Result<RecognitionResult>> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Some(Err(Error::ResultTaken));
        };

        let outcome = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(Error::HandleDropped),
        };
        self.receiver = None;
        Some(outcome)
    }

    /// Block the current thread until the result arrives.
    ///
    /// Panics if called from within an async runtime; await the handle there.
    pub fn wait(self) -> Result<RecognitionResult> {
        match self.receiver {
            Some(receiver) => receiver.blocking_recv().unwrap_or(Err(Error::HandleDropped)),
            None => Err(Error::ResultTaken),
        }
    }
}

impl Future for RecognitionHandle {
    type Output = Result<RecognitionResult>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Ready(Err(Error::ResultTaken));
        };

        let outcome = ready!(Pin::new(receiver).poll(cx)).unwrap_or(Err(Error::HandleDropped));
        this.receiver = None;
        Poll::Ready(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anpr_types::AlprResults;

    fn sample() -> AlprResults {
        AlprResults::from_json(
            r#"{"epoch_time":0,"frame_number":3,"img_width":1,"img_height":1,
                "total_processing_time_ms":0.0,"plates":[],"regionsOfInterest":[]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_result_is_taken_once() {
        let (slot, mut handle) = RecognitionHandle::channel(0);
        assert!(handle.try_result().is_none());

        slot.send(Ok(sample())).unwrap();
        assert_eq!(handle.try_result().unwrap().unwrap().frame_number, 3);
        assert!(matches!(handle.try_result(), Some(Err(Error::ResultTaken))));
        assert!(matches!(handle.wait(), Err(Error::ResultTaken)));
    }

    #[test]
    fn test_closed_channel_reports_dropped_then_taken() {
        let (slot, mut handle) = RecognitionHandle::channel(0);
        drop(slot);
        assert!(matches!(handle.try_result(), Some(Err(Error::HandleDropped))));
        assert!(matches!(handle.try_result(), Some(Err(Error::ResultTaken))));
    }

    #[tokio::test]
    async fn test_await_after_try_result_does_not_panic() {
        let (slot, mut handle) = RecognitionHandle::channel(0);
        slot.send(Ok(sample())).unwrap();
        assert!(handle.try_result().unwrap().is_ok());

        assert!(matches!(handle.await, Err(Error::ResultTaken)));
    }
}
