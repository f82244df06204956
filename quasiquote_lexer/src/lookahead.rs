//! Buffered lookahead over any iterator
//!
//! `Lookahead` lets the rewriter test a fixed-size window of upcoming tokens
//! without committing to it: peeked items stay buffered and are handed out
//! again, in order, by `next()`.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

/// Both the buffer and the underlying iterator are empty
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("lookahead iterator is exhausted")]
pub struct Exhausted;

/// Iterator adapter with a FIFO buffer of peeked items
#[derive(Debug)]
pub struct Lookahead<I: Iterator> {
    inner: I,
    buffer: VecDeque<I::Item>,
}

impl<I: Iterator> Lookahead<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            buffer: VecDeque::new(),
        }
    }

    /// Take the next item, buffered items first
    pub fn advance(&mut self) -> Result<I::Item, Exhausted> {
        self.next().ok_or(Exhausted)
    }

    /// Look at the next `n` items without consuming them.
    ///
    /// Returns fewer than `n` items when the stream runs out. Repeated calls
    /// with no consumption in between return the same items.
    pub fn peek(&mut self, n: usize) -> &[I::Item] {
        while self.buffer.len() < n {
            match self.inner.next() {
                Some(item) => self.buffer.push_back(item),
                None => break,
            }
        }
        let len = self.buffer.len().min(n);
        &self.buffer.make_contiguous()[..len]
    }

    /// Drop up to `n` buffered items without yielding them
    pub fn consume_peeked(&mut self, n: usize) {
        let n = n.min(self.buffer.len());
        self.buffer.drain(..n);
    }

    /// Drop every buffered item; the "all" counterpart of
    /// [`consume_peeked`](Self::consume_peeked)
    pub fn discard_peeked(&mut self) {
        self.buffer.clear();
    }

    /// Number of items currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Walk the stream one item at a time.
    ///
    /// Each item is consumed as it is yielded, so stopping after item X
    /// leaves the stream positioned at the item that follows X.
    pub fn lookahead_iter(&mut self) -> LookaheadIter<'_, I> {
        LookaheadIter { source: self }
    }
}

impl<I: Iterator> Iterator for Lookahead<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.pop_front().or_else(|| self.inner.next())
    }
}

/// Borrowing walker returned by [`Lookahead::lookahead_iter`]
pub struct LookaheadIter<'a, I: Iterator> {
    source: &'a mut Lookahead<I>,
}

impl<I: Iterator> fmt::Debug for LookaheadIter<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookaheadIter")
            .field("buffered", &self.source.buffered())
            .finish()
    }
}

impl<I: Iterator> Iterator for LookaheadIter<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next()
    }
}
