//! Deferred follow-up events.
//!
//! State machines never sleep. A mutating call returns a [`Timeline`] that
//! lists what should happen next and after which delay; the UI plays it on
//! the main loop and tests simply walk it. In-flight cues are never
//! cancelled, so every handler re-checks its latches when a cue fires.

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cue<E> {
    pub at: Duration,
    pub event: E,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline<E> {
    cues: Vec<Cue<E>>,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self { cues: Vec::new() }
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` at `ms` milliseconds from the start.
    pub fn at(mut self, ms: u64, event: E) -> Self {
        self.push(Duration::from_millis(ms), event);
        self
    }

    /// Inserts keeping offsets sorted; equal offsets keep insertion order.
    pub fn push(&mut self, at: Duration, event: E) {
        let idx = self.cues.partition_point(|cue| cue.at <= at);
        self.cues.insert(idx, Cue { at, event });
    }

    /// Appends every cue of `other`, shifted by `base`.
    pub fn merge_offset(&mut self, other: Timeline<E>, base: Duration) {
        for cue in other.cues {
            self.push(base + cue.at, cue.event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn cues(&self) -> &[Cue<E>] {
        &self.cues
    }

    /// Offset of the last cue, zero for an empty timeline.
    pub fn span(&self) -> Duration {
        self.cues.last().map(|cue| cue.at).unwrap_or_default()
    }

    pub fn events(&self) -> impl Iterator<Item = &E> {
        self.cues.iter().map(|cue| &cue.event)
    }

    pub fn offset_of(&self, pred: impl Fn(&E) -> bool) -> Option<Duration> {
        self.cues.iter().find(|cue| pred(&cue.event)).map(|cue| cue.at)
    }

    pub fn map<F, T>(self, mut f: F) -> Timeline<T>
    where
        F: FnMut(E) -> T,
    {
        Timeline {
            cues: self
                .cues
                .into_iter()
                .map(|cue| Cue {
                    at: cue.at,
                    event: f(cue.event),
                })
                .collect(),
        }
    }
}

impl<E> IntoIterator for Timeline<E> {
    type Item = Cue<E>;
    type IntoIter = std::vec::IntoIter<Cue<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.into_iter()
    }
}
