use crate::rank_support::RankSupport;
use crate::{FmIndex, HalfOpenInterval, Hit, IndexStorage, alphabet};

/// A cursor into the index.
///
/// The cursor implicitly maintains a currently searched query and the interval
/// of suffix array rows whose suffixes start with that query. Symbols can
/// iteratively be added to the front of the query; repeatedly calling
/// [`extend_query_front`](Cursor::extend_query_front) is a backward search.
///
/// The interval only ever shrinks. Once it is empty, it stays empty, no matter
/// which symbols are added.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a, I: 'static, R: 'static> {
    pub(crate) index: &'a FmIndex<I, R>,
    pub(crate) interval: HalfOpenInterval,
}

impl<'a, I: IndexStorage, R: RankSupport<I>> Cursor<'a, I, R> {
    /// Extends the currently searched query at the front by one symbol in io
    /// representation.
    ///
    /// A symbol outside the index's alphabet empties the interval: such a query
    /// cannot occur in the text. This is a designed no-match, not an error.
    ///
    /// The running time is in O(1).
    pub fn extend_query_front(&mut self, io_symbol: u8) {
        let dense = self.index.alphabet.io_to_dense_representation(io_symbol);

        if dense == alphabet::INVALID_SYMBOL {
            self.interval.end = self.interval.start;
            return;
        }

        self.extend_front_dense(dense);
    }

    // symbol must be valid in dense representation
    pub(crate) fn extend_front_dense(&mut self, dense_symbol: u8) {
        if self.interval.is_empty() {
            return;
        }

        self.interval = HalfOpenInterval {
            start: self.index.lf_mapping_step(dense_symbol, self.interval.start),
            end: self.index.lf_mapping_step(dense_symbol, self.interval.end),
        };
    }

    /// The half-open interval of suffix array rows matching the current query.
    pub fn interval(&self) -> HalfOpenInterval {
        self.interval
    }

    /// Returns the number of occurrences of the currently searched query.
    ///
    /// The running time is in O(1).
    pub fn count(&self) -> usize {
        self.interval.end - self.interval.start
    }

    pub fn is_empty(&self) -> bool {
        self.interval.is_empty()
    }

    /// Resolves the current interval into concrete hits.
    pub fn locate(&self) -> impl Iterator<Item = Hit> {
        self.index.locate_interval(self.interval)
    }
}
