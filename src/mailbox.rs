//! Driver ingress queue
//!
//! Interrupt handlers, timer callbacks and request stubs post messages
//! here; the dispatcher consumes them as a stream. The queue is a bounded
//! lock-free ring so producers never block and never allocate, and a waker
//! bridges the queue to whatever executor runs the driver task.

use alloc::sync::Arc;
use core::{
    pin::Pin,
    task::{Context, Poll},
};
use crossbeam_queue::ArrayQueue;
use futures_util::{stream::Stream, task::AtomicWaker};

use crate::message::Message;

/// Bounded message queue feeding the dispatcher
pub struct Mailbox {
    queue: ArrayQueue<Message>,
    waker: AtomicWaker,
}

impl Mailbox {
    /// Create a mailbox holding at most `capacity` undelivered messages
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: ArrayQueue::new(capacity),
            waker: AtomicWaker::new(),
        })
    }

    /// Post a message for the dispatcher.
    ///
    /// Must not block or allocate; safe to call from interrupt context.
    /// Returns the message back when the queue is full.
    pub fn post(&self, msg: Message) -> Result<(), Message> {
        match self.queue.push(msg) {
            Ok(()) => {
                self.waker.wake();
                Ok(())
            }
            Err(msg) => {
                log::warn!("tty: mailbox full; dropping {:?}", msg);
                Err(msg)
            }
        }
    }

    /// The consuming end, for the dispatcher task
    pub fn stream(self: &Arc<Self>) -> MessageStream {
        MessageStream {
            inner: Arc::clone(self),
        }
    }
}

/// Stream of incoming messages
pub struct MessageStream {
    inner: Arc<Mailbox>,
}

impl Stream for MessageStream {
    type Item = Message;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Message>> {
        // fast path
        if let Some(msg) = self.inner.queue.pop() {
            return Poll::Ready(Some(msg));
        }

        self.inner.waker.register(cx.waker());
        match self.inner.queue.pop() {
            Some(msg) => {
                self.inner.waker.take();
                Poll::Ready(Some(msg))
            }
            None => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::task::noop_waker;

    #[test]
    fn test_post_then_poll_delivers_in_order() {
        let mailbox = Mailbox::new(8);
        mailbox.post(Message::Alarm).unwrap();
        mailbox.post(Message::Interrupt).unwrap();

        let mut stream = mailbox.stream();
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert_eq!(
            Pin::new(&mut stream).poll_next(&mut cx),
            Poll::Ready(Some(Message::Alarm))
        );
        assert_eq!(
            Pin::new(&mut stream).poll_next(&mut cx),
            Poll::Ready(Some(Message::Interrupt))
        );
        assert_eq!(Pin::new(&mut stream).poll_next(&mut cx), Poll::Pending);
    }

    #[test]
    fn test_full_mailbox_rejects() {
        let mailbox = Mailbox::new(1);
        mailbox.post(Message::Alarm).unwrap();
        assert_eq!(mailbox.post(Message::Interrupt), Err(Message::Interrupt));
    }
}
