//! Bounded ring of raw wire traffic for observability (spec §3.6).

use std::collections::VecDeque;

/// Bitset over the flags a [`RawMessageEntry`] can carry. Implemented as
/// a hand-rolled newtype over associated consts rather than pulling in
/// the `bitflags` crate, matching SPEC_FULL.md §3.6's note that none of
/// the five example repos depend on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFlags(u8);

impl RawFlags {
    /// Received from the server.
    pub const RECV: RawFlags = RawFlags(1 << 0);
    /// Sent to the server.
    pub const SENT: RawFlags = RawFlags(1 << 1);
    /// Modified from its original form before being shown (e.g. by a
    /// relaying plugin).
    pub const MODIFIED: RawFlags = RawFlags(1 << 2);
    /// Captured under an active redirect rather than shown directly.
    pub const REDIRECTED: RawFlags = RawFlags(1 << 3);
    /// Binary (relay) traffic rather than an IRC line.
    pub const BINARY: RawFlags = RawFlags(1 << 4);

    /// No flags set.
    pub const NONE: RawFlags = RawFlags(0);

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub fn with(self, other: RawFlags) -> RawFlags {
        RawFlags(self.0 | other.0)
    }

    /// Whether `other`'s bits are a subset of `self`'s.
    pub fn contains(self, other: RawFlags) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for RawFlags {
    type Output = RawFlags;
    fn bitor(self, rhs: RawFlags) -> RawFlags {
        self.with(rhs)
    }
}

/// One entry in a [`RawMessageRing`] (spec §3.6).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMessageEntry {
    /// Unix timestamp (seconds) the entry was recorded at.
    pub timestamp: i64,
    /// Owning server's stable identifier.
    pub server: String,
    /// Flags describing the traffic direction and nature.
    pub flags: RawFlags,
    /// The raw bytes (an IRC line, or a relay frame when `BINARY` is set).
    pub bytes: Vec<u8>,
}

/// Bounded observability queue of raw wire traffic (spec §3.6). Oldest
/// entries are evicted once the configured capacity is exceeded; used
/// only for display/debugging, never consulted by protocol logic.
#[derive(Clone, Debug)]
pub struct RawMessageRing {
    entries: VecDeque<RawMessageEntry>,
    capacity: usize,
}

impl RawMessageRing {
    /// Creates a ring bounded at `capacity` entries. `capacity == 0`
    /// means every push is immediately evicted (a degenerate but valid
    /// "observability disabled" configuration).
    pub fn new(capacity: usize) -> Self {
        RawMessageRing {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest if the ring is at capacity.
    pub fn push(&mut self, entry: RawMessageEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Iterates oldest-to-newest.
    pub fn iter(&self) -> impl Iterator<Item = &RawMessageEntry> {
        self.entries.iter()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry, keeping the configured capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: i64) -> RawMessageEntry {
        RawMessageEntry {
            timestamp: n,
            server: "libera".to_string(),
            flags: RawFlags::RECV,
            bytes: vec![n as u8],
        }
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut ring = RawMessageRing::new(2);
        ring.push(entry(1));
        ring.push(entry(2));
        ring.push(entry(3));
        let timestamps: Vec<_> = ring.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![2, 3]);
    }

    #[test]
    fn flags_compose_with_bitor() {
        let flags = RawFlags::RECV | RawFlags::REDIRECTED;
        assert!(flags.contains(RawFlags::RECV));
        assert!(flags.contains(RawFlags::REDIRECTED));
        assert!(!flags.contains(RawFlags::SENT));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut ring = RawMessageRing::new(0);
        ring.push(entry(1));
        assert!(ring.is_empty());
    }
}
