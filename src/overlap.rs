//! Suffix/prefix overlap discovery, the primitive behind assembly overlap
//! graphs: which indexed reads start with a suffix of the query?

use num_traits::NumCast;

use crate::alphabet::SENTINEL;
use crate::rank_support::RankSupport;
use crate::{FmIndex, HalfOpenInterval, IndexStorage};

/// A read whose prefix matches a suffix of an overlap query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub read_id: usize,
    /// The overlapping read in io representation.
    pub sequence: Vec<u8>,
    /// Length of the matched suffix/prefix region.
    pub len: usize,
}

impl<I: IndexStorage, R: RankSupport<I>> FmIndex<I, R> {
    /// Finds all indexed reads whose prefix matches a suffix of `query` with a
    /// length of at least `min_overlap_len`.
    ///
    /// The query is scanned back to front exactly like in
    /// [`locate`](FmIndex::locate). After each step that consumed at least
    /// `min_overlap_len` symbols, every matching position that sits directly
    /// behind a sentinel is the start of a read, and is emitted together with
    /// the number of symbols consumed so far.
    ///
    /// A read overlapping the query at several lengths is emitted once per
    /// qualifying length; callers that only want the longest overlap per read
    /// must deduplicate. A match spanning the whole query is not reported as an
    /// overlap, so the emitted lengths are in `[min_overlap_len, query.len())`.
    pub fn prefix_overlaps(&self, query: &[u8], min_overlap_len: usize) -> Vec<Overlap> {
        let mut overlaps = Vec::new();
        let mut cursor = self.cursor_empty();

        for (chars_scanned, &io_symbol) in (1..).zip(query.iter().rev()) {
            cursor.extend_query_front(io_symbol);

            if cursor.is_empty() {
                break;
            }

            if chars_scanned >= min_overlap_len && chars_scanned < query.len() {
                self.collect_reads_starting_in_interval(
                    cursor.interval(),
                    chars_scanned,
                    &mut overlaps,
                );
            }
        }

        overlaps
    }

    /// Emits one overlap for every row of the interval whose suffix begins at a
    /// read start. A suffix starts directly behind a sentinel if and only if
    /// its BWT symbol is the sentinel, which also covers the first read via the
    /// cyclic wrap-around to the final sentinel.
    fn collect_reads_starting_in_interval(
        &self,
        interval: HalfOpenInterval,
        overlap_len: usize,
        overlaps: &mut Vec<Overlap>,
    ) {
        for row in interval.start..interval.end {
            if self.rank_support.symbol_at(row) != SENTINEL {
                continue;
            }

            let offset = <usize as NumCast>::from(self.suffix_array[row]).unwrap();

            overlaps.push(Overlap {
                read_id: self.read_bounds.read_id_at(offset),
                sequence: self.read_at_offset(offset),
                len: overlap_len,
            });
        }
    }
}
