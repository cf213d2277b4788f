/// Per-task position in a rotation.
///
/// The cursor counts ticks; the frame shown for a sequence of `len` frames
/// is `position % len`, so sequences of different lengths (one per zone)
/// all wrap on their own boundary while sharing a single cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationCursor {
    position: u64,
}

impl RotationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next frame, returning the position this tick renders.
    pub fn advance(&mut self) -> u64 {
        let current = self.position;
        self.position = self.position.wrapping_add(1);
        current
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Frame index the cursor points at for a sequence of `len` frames.
    pub fn index_for(&self, len: usize) -> Option<usize> {
        wrap(self.position, len)
    }
}

/// Index of `position` in a sequence of `len` frames, `None` if empty.
pub fn wrap(position: u64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    // len fits in u64 and the remainder is smaller than len
    Some((position % len as u64) as usize)
}
