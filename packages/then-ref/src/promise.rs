//! The asynchronous handle behind the `Async` kind.
//!
//! A [`Promise`] is an opaque `Future<Output = Result<T, E>>`. The crate
//! never polls it on its own; chain steps on an `Async` wrapper only queue
//! work on it, and the caller settles the result by awaiting.
//!
//! Handing over a `Promise` is how a producer says "this value arrives
//! later". There is no structural detection of futures anywhere else.
//!
//! Chain steps on a promise are queued rather than nested, and a single
//! poll loop drains the queue. A step returning another pending wrapper
//! has its own queue spliced in front of the remaining steps.
//!
//! # Example
//!
//! ```ignore
//! use then_ref::{wrap, Promise};
//!
//! let fetched = Promise::new(async { Ok::<_, anyhow::Error>(fetch_count().await?) });
//! let doubled = wrap(fetched).then(|n| Ok(n * 2)).await?;
//! ```

use std::any::{type_name, Any};
use std::collections::VecDeque;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use crate::error::ThenRefError;
use crate::kind::{Classify, Kind};
use crate::thenable::Thenable;

/// A success value with its type erased. A `Promise<T, E>` only ever stores
/// a `T` here once its last step has run.
type Erased = Box<dyn Any + Send>;

/// One queued chain step: takes the previous outcome, yields the next links.
type Step<E> = Box<dyn FnOnce(Result<Erased, E>) -> Links<E> + Send>;

/// Where a promise currently stands.
enum Head<E> {
    Waiting(BoxFuture<'static, Result<Erased, E>>),
    Settled(Result<Erased, E>),
    Done,
}

/// A head plus the steps still to run after it.
///
/// Steps live in a flat queue so that chains of any length are polled and
/// dropped without recursion.
struct Links<E> {
    head: Head<E>,
    steps: VecDeque<Step<E>>,
}

/// A value of type `T` or an error of type `E`, available later.
#[must_use = "promises do nothing unless awaited"]
pub struct Promise<T, E> {
    links: Links<E>,
    _output: PhantomData<fn() -> T>,
}

impl<T, E> Promise<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Tag a future as the asynchronous handle of a wrapper.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::from_head(Head::Waiting(
            future.map(|outcome| outcome.map(erase)).boxed(),
        ))
    }

    /// A promise that settles successfully with `value` on first poll.
    pub fn resolve(value: T) -> Self {
        Self::from_head(Head::Settled(Ok(erase(value))))
    }

    /// A promise that settles with `error` on first poll.
    pub fn reject(error: E) -> Self {
        Self::from_head(Head::Settled(Err(error)))
    }

    /// Run `future` as a tokio task and return a promise for its outcome.
    ///
    /// A panic inside the task settles the promise with
    /// [`ThenRefError::Panicked`]; a task that is aborted (for example by
    /// runtime shutdown) settles with [`ThenRefError::Cancelled`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: From<ThenRefError>,
    {
        let handle = tokio::spawn(future);
        Self::new(async move {
            match handle.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => Err(ThenRefError::from_panic(err.into_panic()).into()),
                Err(_) => {
                    warn!("spawned promise task was cancelled");
                    Err(ThenRefError::Cancelled.into())
                }
            }
        })
    }

    /// Queue `step` to run on this promise's outcome.
    ///
    /// Nothing runs until the returned promise is polled. If `step` hands
    /// back another pending wrapper, its steps are spliced in ahead of the
    /// ones queued after this call.
    pub(crate) fn chain<U, F>(self, step: F) -> Promise<U, E>
    where
        U: Send + 'static,
        F: FnOnce(Result<T, E>) -> Thenable<U, E> + Send + 'static,
    {
        let mut links = self.links;
        links.steps.push_back(Box::new(move |outcome: Result<Erased, E>| {
            step(outcome.map(recover::<T>)).into_future().links
        }));
        Promise {
            links,
            _output: PhantomData,
        }
    }

    fn from_head(head: Head<E>) -> Self {
        Self {
            links: Links {
                head,
                steps: VecDeque::new(),
            },
            _output: PhantomData,
        }
    }
}

impl<T, E> Unpin for Promise<T, E> {}

impl<T: 'static, E> Future for Promise<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let links = &mut self.get_mut().links;
        loop {
            let outcome = match mem::replace(&mut links.head, Head::Done) {
                Head::Waiting(mut future) => match future.poll_unpin(cx) {
                    Poll::Ready(outcome) => outcome,
                    Poll::Pending => {
                        links.head = Head::Waiting(future);
                        return Poll::Pending;
                    }
                },
                Head::Settled(outcome) => outcome,
                Head::Done => panic!("`Promise` polled after completion"),
            };

            let Some(step) = links.steps.pop_front() else {
                return Poll::Ready(outcome.map(recover::<T>));
            };
            let next = step(outcome);
            for queued in next.steps.into_iter().rev() {
                links.steps.push_front(queued);
            }
            links.head = next.head;
        }
    }
}

impl<T, E> Classify for Promise<T, E> {
    fn kind(&self) -> Kind {
        Kind::Async
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}

fn erase<T: Send + 'static>(value: T) -> Erased {
    Box::new(value)
}

fn recover<T: 'static>(value: Erased) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!("promise settled with a value that is not a {}", type_name::<T>()),
    }
}
