//! Output sinks for the renderer.
//!
//! The renderer writes its output as atomic units: a whole tag string or one
//! escaped character. A sink either takes a unit whole or refuses it.

/// Destination for rendered output units.
pub trait Sink {
    /// Appends `unit`, returning false if it does not fit.
    fn push_unit(&mut self, unit: &str) -> bool;
}

impl Sink for String {
    fn push_unit(&mut self, unit: &str) -> bool {
        self.push_str(unit);
        true
    }
}

/// A fixed-capacity output buffer, drained by the caller whenever the
/// renderer reports it full.
#[derive(Debug, Clone)]
pub struct BoundedSink {
    buf: String,
    capacity: usize,
}

impl BoundedSink {
    /// Smallest capacity that holds any single output unit.
    pub const MIN_CAPACITY: usize = 32;

    /// Creates an empty sink of `capacity` bytes.
    ///
    /// Panics if `capacity` is below [`MIN_CAPACITY`](Self::MIN_CAPACITY).
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity >= Self::MIN_CAPACITY,
            "sink capacity {capacity} is below the minimum of {}",
            Self::MIN_CAPACITY
        );
        Self {
            buf: String::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hands out the buffered output and empties the sink.
    pub fn take(&mut self) -> String {
        std::mem::replace(&mut self.buf, String::with_capacity(self.capacity))
    }
}

impl Sink for BoundedSink {
    fn push_unit(&mut self, unit: &str) -> bool {
        if self.buf.len() + unit.len() > self.capacity {
            return false;
        }
        self.buf.push_str(unit);
        true
    }
}
