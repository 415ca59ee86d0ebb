// src/crawl/queue.rs
// =============================================================================
// This module implements the blocking work queue shared by the worker pools.
//
// How it works:
// - push() appends to the back and wakes ONE waiting consumer
// - pop_blocking() sleeps until an item arrives or the queue is cancelled
// - cancel() wakes EVERY waiting consumer, and from then on pop_blocking()
//   returns None straight away
//
// The single-wake / broadcast-wake split matters at shutdown: every worker
// sleeping on the queue has to notice the cancellation, not just one of them.
//
// Rust concepts:
// - Generics: BlockingQueue<T> works for any item type
// - Mutex + Condvar: the classic "sleep until something changes" pair
// - Traits as objects: Cancel lets the shutdown code hold queues of
//   different item types in one Vec
// =============================================================================

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

// Anything the shutdown coordinator can cancel
pub trait Cancel: Send + Sync {
    fn cancel(&self);
    fn name(&self) -> &'static str;
}

struct QueueState<T> {
    items: VecDeque<T>,
    cancelled: bool,
}

/// Unbounded FIFO queue with blocking pop and broadcast cancellation
pub struct BlockingQueue<T> {
    /// Name used in log messages ("fetch", "parse")
    name: &'static str,
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> BlockingQueue<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                cancelled: false,
            }),
            available: Condvar::new(),
        }
    }

    // Appends an item and wakes one consumer
    //
    // Never blocks (the queue has no capacity limit). Returns false if the
    // queue was already cancelled, in which case the item is dropped because
    // nobody will ever pop it.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.state.lock();
        if state.cancelled {
            return false;
        }
        state.items.push_back(item);
        drop(state);

        self.available.notify_one();
        true
    }

    // Waits for the next item
    //
    // Returns:
    //   Some(item) - the oldest item in the queue
    //   None       - the queue has been cancelled (even if items remain)
    pub fn pop_blocking(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            self.available.wait(&mut state);
        }
    }

    /// Non-blocking pop; None when empty or cancelled
    #[cfg(test)]
    pub fn try_pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.cancelled {
            return None;
        }
        state.items.pop_front()
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send> Cancel for BlockingQueue<T> {
    // Idempotent: a second call just re-broadcasts to nobody
    fn cancel(&self) {
        self.state.lock().cancelled = true;
        self.available.notify_all();
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a loop around wait()?
//    - A Condvar can wake up "spuriously", with nothing changed
//    - So after every wake-up we re-check: cancelled? item available?
//    - Only then do we return; otherwise we go back to sleep
//
// 2. Why notify_one() in push but notify_all() in cancel?
//    - One new item can only be taken by one consumer, so waking more
//      would just make the rest go back to sleep
//    - Cancellation concerns everybody, so everybody must wake up
//
// 3. Why drop(state) before notify_one()?
//    - The woken thread needs the lock straight away
//    - Releasing it first saves that thread from waking up only to block
//      on the mutex again
// -----------------------------------------------------------------------------
