use serde::{Deserialize, Serialize};

use std::ops::AddAssign;

/// A monotonic key generator.
///
/// Each owner (a genome for its node keys, a population
/// for its genome and species keys) holds its own sequence,
/// so independent runs never share counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence<T> {
    next: T,
}

impl<T> Sequence<T>
where
    T: Copy + AddAssign + From<u8>,
{
    /// Creates a sequence whose first value is `start`.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::Sequence;
    ///
    /// let mut keys = Sequence::starting_at(5i64);
    /// assert_eq!(keys.next_key(), 5);
    /// assert_eq!(keys.next_key(), 6);
    /// ```
    pub fn starting_at(start: T) -> Sequence<T> {
        Sequence { next: start }
    }

    /// Returns the next key and advances the sequence.
    pub fn next_key(&mut self) -> T {
        let key = self.next;
        self.next += T::from(1);
        key
    }

    /// Returns the key the next call to
    /// [`next_key`](Sequence::next_key) will produce.
    pub fn peek(&self) -> T {
        self.next
    }
}
