//! Mapping between offsets in the concatenated text and read ids.

/// Sorted positions of the sentinels in the concatenated text. Read `i` ends at
/// `sentinel_indices[i]` (exclusive), so the read id of an offset is the number
/// of sentinels strictly before it.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReadBoundaries {
    sentinel_indices: Vec<usize>,
}

impl ReadBoundaries {
    pub(crate) fn from_sentinel_indices(sentinel_indices: Vec<usize>) -> Self {
        debug_assert!(!sentinel_indices.is_empty());
        debug_assert!(sentinel_indices.is_sorted());

        Self { sentinel_indices }
    }

    pub(crate) fn num_reads(&self) -> usize {
        self.sentinel_indices.len()
    }

    pub(crate) fn read_id_at(&self, offset: usize) -> usize {
        self.sentinel_indices.partition_point(|&idx| idx < offset)
    }

    /// Splits an offset in the concatenated text into a read id and a position
    /// within that read. An offset on a sentinel belongs to the read the
    /// sentinel terminates, with position equal to the read's length.
    pub(crate) fn split_concatenated_offset(&self, offset: usize) -> (usize, usize) {
        let read_id = self.read_id_at(offset);

        let read_start = if read_id == 0 {
            0
        } else {
            self.sentinel_indices[read_id - 1] + 1
        };

        (read_id, offset - read_start)
    }
}
