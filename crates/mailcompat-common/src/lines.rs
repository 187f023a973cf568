//! Byte offset to line number mapping.
//!
//! A [`LineIndex`] records the byte offset at which every line of a buffer
//! starts. Lines are 1-based: the line of an offset is the number of line
//! starts at or before it, and offsets past the end of the buffer map to the
//! last line.
//!
//! Tokenizers visit their input in document order, so lookups are normally
//! made through a [`LineCursor`], which only ever moves forward and answers in
//! amortized constant time. [`LineIndex::line_of`] is a binary search for
//! callers that cannot guarantee ascending offsets.

/// Line start table for one text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first byte of each line. `starts[0]` is always 0.
    starts: Vec<usize>,
    /// Length of the indexed buffer in bytes.
    len: usize,
}

impl LineIndex {
    /// Build the index by splitting `text` on line feeds.
    #[must_use]
    pub fn new(text: impl AsRef<[u8]>) -> Self {
        let bytes = text.as_ref();
        let mut starts = Vec::with_capacity(bytes.len() / 32 + 1);
        starts.push(0);
        starts.extend(
            bytes
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: bytes.len(),
        }
    }

    /// Number of lines in the buffer. A trailing line feed opens an empty
    /// last line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Length in bytes of the indexed buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when the indexed buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset at which 1-based `line` starts.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.starts.get(i).copied())
    }

    /// Line containing `offset`, found by binary search.
    ///
    /// Works for any query order; prefer [`LineIndex::cursor`] while walking
    /// a buffer front to back.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// A forward-only cursor positioned before the first line.
    #[must_use]
    pub const fn cursor(&self) -> LineCursor<'_> {
        LineCursor {
            index: self,
            line: 0,
            last_offset: 0,
        }
    }
}

/// Forward-only line lookup over a [`LineIndex`].
///
/// Queries must be issued with non-decreasing offsets. The cursor never moves
/// backwards, so an out-of-order query answers with a line at or after the
/// one returned previously. Debug builds assert the ordering.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    index: &'a LineIndex,
    /// Last line returned (0 before the first query).
    line: usize,
    last_offset: usize,
}

impl LineCursor<'_> {
    /// Line containing `offset`.
    pub fn line_at(&mut self, offset: usize) -> usize {
        debug_assert!(
            offset >= self.last_offset,
            "line cursor queried out of order: {offset} after {}",
            self.last_offset
        );
        self.last_offset = offset;

        let starts = &self.index.starts;
        while self.line < starts.len() && starts[self.line] <= offset {
            self.line += 1;
        }
        self.line
    }

    /// The index this cursor walks.
    #[must_use]
    pub const fn index(&self) -> &LineIndex {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_starts() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.line_start(2), Some(3));
        assert_eq!(index.line_start(3), Some(6));
        assert_eq!(index.line_start(4), Some(7));
        assert_eq!(index.line_start(0), None);
        assert_eq!(index.line_start(5), None);
    }

    #[test]
    fn test_cursor_walks_forward() {
        let index = LineIndex::new("ab\ncd\n\nef");
        let mut cursor = index.cursor();
        assert_eq!(cursor.line_at(0), 1);
        assert_eq!(cursor.line_at(2), 1);
        assert_eq!(cursor.line_at(3), 2);
        assert_eq!(cursor.line_at(6), 3);
        assert_eq!(cursor.line_at(8), 4);
        assert_eq!(cursor.line_at(500), 4);
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let index = LineIndex::new("");
        assert!(index.is_empty());
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.cursor().line_at(0), 1);
    }

    #[test]
    fn test_trailing_newline_opens_last_line() {
        let index = LineIndex::new("a\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_of(1), 1);
        assert_eq!(index.line_of(2), 2);
    }
}
