//! # Event Tape
//!
//! The tape is the parser's only output: a flat, append-mostly sequence of
//! packed `u32` words, each recording one or more region boundaries at one
//! input position.
//!
//! ## Word Layout
//!
//! ```text
//!  31  30  29  28  27  26 ........ 20  19 ................. 0
//! [ - ][MS'][CS'][CS ][MS ][   state    ][      position       ]
//!        |    |    |    `- marker start
//!        |    |    `------ content start
//!        |    `----------- content stop
//!        `---------------- marker stop
//! ```
//!
//! A "marker" boundary includes the delimiter syntax (`**`, `# `), a
//! "content" boundary excludes it. When both coincide they share one word.
//!
//! ## Why Flat?
//!
//! Like the event list of an event-based parser, the tape stores no
//! parent/child links. Nesting is enforced while the tape is being built (the
//! inline machine keeps an explicit stack) and is implicit afterwards: every
//! state's flags read in order are well nested, so renderers can walk the tape
//! linearly with O(1) work per entry.
//!
//! ## Bounded Memory
//!
//! The tape never grows past `max_entries`. Parsers reserve the entries they
//! will need to close what they open (`reserve`/`release`) and degrade to an
//! `Unparsable` region when [`Tape::remaining`] runs out. Consumed entries
//! are dropped by [`Tape::compact`] in step with the caller's input window.

mod cursor;

pub use cursor::Cursor;

use std::fmt;
use std::ops::BitOr;

use crate::state::State;

/// Bits available for an entry position.
pub const POSITION_BITS: u32 = 20;

/// Largest position an entry can record.
pub const MAX_POSITION: usize = (1 << POSITION_BITS) - 1;

/// Default ceiling on live tape entries.
pub const DEFAULT_MAX_ENTRIES: usize = 102_400;

/// Capacity up to which the tape doubles; beyond it, it grows linearly.
const SOFT_TARGET: usize = 4096;

const STATE_SHIFT: u32 = POSITION_BITS;
const STATE_MASK: u32 = 0x7f;
const FLAGS_SHIFT: u32 = 27;
const FLAGS_MASK: u32 = 0xf;

/// Boundary flags carried by one tape entry.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const MARKER_START: Flags = Flags(0b0001);
    pub const CONTENT_START: Flags = Flags(0b0010);
    pub const CONTENT_STOP: Flags = Flags(0b0100);
    pub const MARKER_STOP: Flags = Flags(0b1000);
    /// Marker and content begin at the same position.
    pub const START_BOTH: Flags = Flags(0b0011);
    /// Content and marker end at the same position.
    pub const STOP_BOTH: Flags = Flags(0b1100);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Any start flag and no stop flag.
    pub fn is_open_only(self) -> bool {
        self.intersects(Flags::START_BOTH) && !self.intersects(Flags::STOP_BOTH)
    }

    #[must_use]
    pub fn without(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Flags::MARKER_START, "MS"),
            (Flags::CONTENT_START, "CS"),
            (Flags::CONTENT_STOP, "CE"),
            (Flags::MARKER_STOP, "ME"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("-")?;
        }
        Ok(())
    }
}

/// Unpacked view of one tape word.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    pub flags: Flags,
    pub state: State,
    pub position: usize,
}

impl Entry {
    pub fn new(state: State, flags: Flags, position: usize) -> Self {
        Self {
            flags,
            state,
            position,
        }
    }

    /// Packs the entry into a tape word.
    ///
    /// Panics if the position does not fit in 20 bits.
    pub fn pack(self) -> u32 {
        assert!(
            self.position <= MAX_POSITION,
            "tape position {} exceeds {MAX_POSITION}",
            self.position
        );
        (self.position as u32)
            | ((self.state.raw() as u32 & STATE_MASK) << STATE_SHIFT)
            | ((self.flags.bits() as u32 & FLAGS_MASK) << FLAGS_SHIFT)
    }

    pub fn unpack(word: u32) -> Self {
        Self {
            flags: Flags(((word >> FLAGS_SHIFT) & FLAGS_MASK) as u8),
            state: State::from_raw(((word >> STATE_SHIFT) & STATE_MASK) as u8),
            position: (word & MAX_POSITION as u32) as usize,
        }
    }

    pub fn is_marker_start(self) -> bool {
        self.flags.contains(Flags::MARKER_START)
    }

    pub fn is_content_start(self) -> bool {
        self.flags.contains(Flags::CONTENT_START)
    }

    pub fn is_content_stop(self) -> bool {
        self.flags.contains(Flags::CONTENT_STOP)
    }

    pub fn is_marker_stop(self) -> bool {
        self.flags.contains(Flags::MARKER_STOP)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4} {:?} {:?}", self.position, self.state, self.flags)
    }
}

/// Saved tape length and reservation, restored by [`Tape::rollback_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeMark {
    len: usize,
    reserved: usize,
}

/// The shared event tape.
pub struct Tape {
    words: Vec<u32>,
    max_entries: usize,
    reserved: usize,
}

impl Tape {
    /// Creates a tape with the default ceiling.
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Creates a tape holding at most `max_entries` live entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            words: Vec::with_capacity(max_entries.min(16)),
            max_entries,
            reserved: 0,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Entry at `index`. Panics when out of bounds.
    pub fn get(&self, index: usize) -> Entry {
        Entry::unpack(self.words[index])
    }

    pub fn last(&self) -> Option<Entry> {
        self.words.last().map(|w| Entry::unpack(*w))
    }

    pub fn iter(&self) -> impl Iterator<Item = Entry> + '_ {
        self.words.iter().map(|w| Entry::unpack(*w))
    }

    /// A read cursor positioned at `index`.
    pub fn cursor(&self, index: usize) -> Cursor<'_> {
        Cursor::new(self, index)
    }

    /// Free capacity: entries neither used nor promised to open constructs.
    pub fn remaining(&self) -> usize {
        self.max_entries
            .saturating_sub(self.words.len() + self.reserved)
    }

    /// Entries promised to close constructs that are still open.
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Promises `n` entries to a construct being opened.
    ///
    /// Returns false, reserving nothing, if there is not enough room.
    pub fn reserve(&mut self, n: usize) -> bool {
        if self.remaining() < n {
            return false;
        }
        self.reserved += n;
        true
    }

    /// Hands back `n` promised entries, usually just before appending them.
    pub fn release(&mut self, n: usize) {
        debug_assert!(self.reserved >= n, "released more than reserved");
        self.reserved = self.reserved.saturating_sub(n);
    }

    /// Appends an entry.
    ///
    /// Panics if the entry would break position ordering.
    pub fn add(&mut self, entry: Entry) {
        if let Some(last) = self.last() {
            assert!(
                entry.position >= last.position,
                "tape entry {entry:?} precedes {last:?}"
            );
        }
        debug_assert!(
            self.words.len() + self.reserved < self.max_entries,
            "tape ceiling of {} exceeded",
            self.max_entries
        );
        self.grow();
        self.words.push(entry.pack());
    }

    pub fn add_start(&mut self, state: State, pos: usize) {
        self.add(Entry::new(state, Flags::MARKER_START, pos));
    }

    pub fn add_stop(&mut self, state: State, pos: usize) {
        self.add(Entry::new(state, Flags::MARKER_STOP, pos));
    }

    pub fn add_start_content(&mut self, state: State, pos: usize) {
        self.add(Entry::new(state, Flags::CONTENT_START, pos));
    }

    pub fn add_stop_content(&mut self, state: State, pos: usize) {
        self.add(Entry::new(state, Flags::CONTENT_STOP, pos));
    }

    /// Marker and content start at `pos`.
    pub fn add_start_both(&mut self, state: State, pos: usize) {
        self.add(Entry::new(state, Flags::START_BOTH, pos));
    }

    /// Content and marker stop at `pos`.
    pub fn add_stop_both(&mut self, state: State, pos: usize) {
        self.add(Entry::new(state, Flags::STOP_BOTH, pos));
    }

    /// Removes the most recent entries if they are an unmatched start of
    /// `state`: a lone start, or a content start preceded by its marker start.
    ///
    /// Returns false and leaves the tape untouched otherwise.
    pub fn rollback_last_marker_or_content_start(&mut self, state: State) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        if last.state != state || !last.flags.is_open_only() {
            return false;
        }
        self.words.pop();
        if last.flags == Flags::CONTENT_START
            && let Some(prev) = self.last()
            && prev.state == state
            && prev.flags == Flags::MARKER_START
        {
            self.words.pop();
        }
        true
    }

    /// Removes the content start of `state` recorded by the last entry.
    ///
    /// A fused marker start stays in place.
    pub fn rollback_last_content_start(&mut self, state: State) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        if last.state != state || !last.is_content_start() || last.flags.intersects(Flags::STOP_BOTH)
        {
            return false;
        }
        self.replace_last_flags(last, last.flags.without(Flags::CONTENT_START));
        true
    }

    /// Removes the content stop of `state` recorded by the last entry, so the
    /// content can be extended.
    ///
    /// Panics if the content stop is fused with a marker stop: the region is
    /// already closed and reopening only its content would corrupt the tape.
    pub fn rollback_last_content_stop(&mut self, state: State) -> bool {
        let Some(last) = self.last() else {
            return false;
        };
        if last.state != state || !last.is_content_stop() {
            return false;
        }
        assert!(
            !last.is_marker_stop(),
            "cannot reopen content of a closed {state:?} region"
        );
        self.replace_last_flags(last, last.flags.without(Flags::CONTENT_STOP));
        true
    }

    /// Pops entries back past the last unmatched marker start of `state`,
    /// abandoning the whole in-progress construct and everything nested in it.
    ///
    /// Returns false, leaving the tape untouched, if no such start exists.
    pub fn rollback_state(&mut self, state: State) -> bool {
        let mut depth = 0usize;
        for index in (0..self.words.len()).rev() {
            let entry = self.get(index);
            if entry.state != state {
                continue;
            }
            let starts = entry.is_marker_start();
            let stops = entry.is_marker_stop();
            if starts && stops {
                continue;
            }
            if stops {
                depth += 1;
            } else if starts {
                if depth == 0 {
                    self.words.truncate(index);
                    return true;
                }
                depth -= 1;
            }
        }
        false
    }

    /// Captures the current length and reservation.
    pub fn mark(&self) -> TapeMark {
        TapeMark {
            len: self.words.len(),
            reserved: self.reserved,
        }
    }

    /// Drops every entry appended since `mark` and restores its reservation.
    pub fn rollback_to(&mut self, mark: TapeMark) {
        debug_assert!(mark.len <= self.words.len(), "tape mark is stale");
        self.words.truncate(mark.len);
        self.reserved = mark.reserved;
    }

    /// Drops scanned entries and rebases the rest onto a new origin.
    ///
    /// `cursor` is the index of the first entry a reader has not finished
    /// with; everything before it is folded away. The origin is `cutoff`,
    /// lowered if needed so no surviving entry ends up before it. Survivors
    /// move to the front in one pass and the cursor becomes 0. Returns the
    /// origin; the caller must compact its input window by exactly that much.
    pub fn compact(&mut self, cutoff: usize, cursor: &mut usize) -> usize {
        let scanned = (*cursor).min(self.words.len());
        let origin = match self.words.get(scanned) {
            Some(word) => cutoff.min(Entry::unpack(*word).position),
            None => cutoff,
        };
        let mut write = 0;
        for read in scanned..self.words.len() {
            let mut entry = Entry::unpack(self.words[read]);
            entry.position -= origin;
            self.words[write] = entry.pack();
            write += 1;
        }
        self.words.truncate(write);
        *cursor = 0;
        origin
    }

    /// Removes all entries and reservations.
    pub fn clear(&mut self) {
        self.words.clear();
        self.reserved = 0;
    }

    /// One line per entry, for tests and debug logging.
    pub fn dump(&self) -> String {
        self.iter()
            .map(|e| format!("{e:?}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn replace_last_flags(&mut self, last: Entry, flags: Flags) {
        if flags.is_empty() {
            self.words.pop();
        } else if let Some(word) = self.words.last_mut() {
            *word = Entry::new(last.state, flags, last.position).pack();
        }
    }

    fn grow(&mut self) {
        let capacity = self.words.capacity();
        if self.words.len() < capacity {
            return;
        }
        let step = if capacity < SOFT_TARGET {
            capacity.max(16)
        } else {
            SOFT_TARGET
        };
        let room = self.max_entries.saturating_sub(capacity).max(1);
        self.words.reserve_exact(step.min(room));
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
