//! Stack growth for deeply recursive reductions
//!
//! Reduction recurses once per nesting level of the program, and recursive
//! user programs (fixed-point combinators) nest without bound. Every branch
//! future is polled through [`ensure_sufficient_stack`], so the host stack
//! grows on demand instead of overflowing.

use futures_util::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// If less than this remains, the stack is grown before continuing
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if less than the red zone remains
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// A boxed future whose every poll runs with sufficient stack
pub struct StackGuarded<'a, T> {
    inner: BoxFuture<'a, T>,
}

impl<'a, T> StackGuarded<'a, T> {
    /// Wraps an already boxed future
    pub fn new(inner: BoxFuture<'a, T>) -> Self {
        StackGuarded { inner }
    }
}

impl<T> Future for StackGuarded<'_, T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let inner = &mut self.inner;
        ensure_sufficient_stack(|| inner.as_mut().poll(cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    fn depth(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
    }

    #[test]
    fn test_deep_sync_recursion() {
        assert_eq!(depth(200_000), 200_000);
    }

    fn nested(n: u64) -> StackGuarded<'static, u64> {
        StackGuarded::new(async move { if n == 0 { 0 } else { 1 + nested(n - 1).await } }.boxed())
    }

    #[test]
    fn test_deep_async_recursion() {
        assert_eq!(tokio_test::block_on(nested(50_000)), 50_000);
    }
}
