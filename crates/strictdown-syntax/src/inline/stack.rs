use crate::state::State;

/// Deepest nesting of inline constructs on one line.
pub const MAX_DEPTH: usize = 8;

/// An open inline construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Strikethrough,
    Bold,
    Italic,
    Underline,
    Code,
    /// `url` is set once `](` was seen.
    Link { url: bool },
    /// `url` is set once `](` or `!(` was seen.
    Image { url: bool },
    HardBreak,
}

impl Kind {
    pub fn state(self) -> State {
        match self {
            Kind::Strikethrough => State::Strikethrough,
            Kind::Bold => State::Bold,
            Kind::Italic => State::Italic,
            Kind::Underline => State::Underline,
            Kind::Code => State::Code,
            Kind::Link { .. } => State::Link,
            Kind::Image { .. } => State::Image,
            Kind::HardBreak => State::HardBreak,
        }
    }

    /// Raw constructs see no markup until their closer.
    pub fn is_raw(self) -> bool {
        matches!(
            self,
            Kind::Code | Kind::Link { url: true } | Kind::Image { .. }
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub kind: Kind,
    /// Position of the opening delimiter.
    pub start: usize,
    /// Tape entries still promised to this construct's closers.
    pub reserved: usize,
}

impl Frame {
    pub fn state(&self) -> State {
        self.kind.state()
    }
}

/// Fixed-capacity stack of open constructs.
#[derive(Debug, Default)]
pub struct Stack {
    frames: [Option<Frame>; MAX_DEPTH],
    len: usize,
}

impl Stack {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_DEPTH
    }

    pub fn push(&mut self, frame: Frame) {
        assert!(!self.is_full(), "inline stack overflow");
        self.frames[self.len] = Some(frame);
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<Frame> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        self.frames[self.len].take()
    }

    pub fn top(&self) -> Option<Frame> {
        self.len.checked_sub(1).and_then(|i| self.frames[i])
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        let i = self.len.checked_sub(1)?;
        self.frames[i].as_mut()
    }

    pub fn get(&self, index: usize) -> Option<Frame> {
        if index < self.len {
            self.frames[index]
        } else {
            None
        }
    }

    pub fn contains(&self, state: State) -> bool {
        self.iter().any(|f| f.state() == state)
    }

    /// Index of the outermost link or image.
    pub fn link_index(&self) -> Option<usize> {
        self.iter()
            .position(|f| matches!(f.kind, Kind::Link { .. } | Kind::Image { .. }))
    }

    fn iter(&self) -> impl Iterator<Item = Frame> + '_ {
        self.frames[..self.len].iter().flatten().copied()
    }
}
