//! Single-flight action serializer.
//!
//! `ActionSerializer` guarantees that at most one action is in flight against
//! shared composition state. It is plain data: a `Busy`/`Idle` tag plus a FIFO
//! of pending arguments. Nothing here recurses on the call stack, so the same
//! behavior holds whether the host drives it from a thread, an event loop or
//! an async executor.
//!
//! Two ways to use it:
//!
//! - Manually: `submit` returns the arguments to dispatch right now (or
//!   `None` when they were queued), and `complete` returns the next pending
//!   arguments (or `None`, going `Idle`).
//! - Through `drive`, with a consumer implementing `Dispatch`. Completion is
//!   the dispatch future resolving. A `dispatch` may `submit` more work into
//!   the queue it is handed; that work runs after everything queued before it.

use std::collections::VecDeque;
use tracing::{debug, error};

/// Serializer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerState {
    Idle,
    Busy,
}

/// The consumer's dispatch handler.
#[allow(async_fn_in_trait)]
pub trait Dispatch<A> {
    /// Run one action. `queue` is the serializer that dispatched it, in the
    /// `Busy` state, so any `submit` made here is queued.
    async fn dispatch(&mut self, args: A, queue: &mut ActionSerializer<A>);
}

#[derive(Debug)]
pub struct ActionSerializer<A> {
    state: SerializerState,
    pending: VecDeque<A>,
}

impl<A> ActionSerializer<A> {
    pub fn new() -> Self {
        Self {
            state: SerializerState::Idle,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SerializerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == SerializerState::Busy
    }

    /// Number of queued (not yet dispatched) actions.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Submit an action.
    ///
    /// When `Idle`, the serializer becomes `Busy` and hands the arguments
    /// straight back: the caller must dispatch them now. When `Busy`, the
    /// arguments are queued and `None` is returned.
    #[must_use = "arguments returned by submit must be dispatched"]
    pub fn submit(&mut self, args: A) -> Option<A> {
        match self.state {
            SerializerState::Idle => {
                self.state = SerializerState::Busy;
                Some(args)
            }
            SerializerState::Busy => {
                self.pending.push_back(args);
                debug!(pending = self.pending.len(), "action queued behind in-flight action");
                None
            }
        }
    }

    /// Finish the in-flight action.
    ///
    /// Returns the next queued arguments (staying `Busy`), or `None` after
    /// going `Idle`. Calling this while `Idle` is a contract violation.
    #[must_use = "arguments returned by complete must be dispatched"]
    pub fn complete(&mut self) -> Option<A> {
        debug_assert!(
            self.state == SerializerState::Busy,
            "ActionSerializer::complete called while idle"
        );
        if self.state == SerializerState::Idle {
            error!("ActionSerializer::complete called while idle; ignoring");
            return None;
        }
        match self.pending.pop_front() {
            Some(next) => Some(next),
            None => {
                self.state = SerializerState::Idle;
                None
            }
        }
    }

    /// Dispatch `first` and then every queued action, in order, until the
    /// queue drains and the serializer is `Idle` again.
    ///
    /// `first` must be the value a `submit` just returned.
    pub async fn drive<D>(&mut self, first: A, target: &mut D)
    where
        D: Dispatch<A>,
    {
        let mut next = Some(first);
        while let Some(args) = next {
            target.dispatch(args, self).await;
            next = self.complete();
        }
    }
}

impl<A> Default for ActionSerializer<A> {
    fn default() -> Self {
        Self::new()
    }
}
