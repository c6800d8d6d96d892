//! An FM-Index over collections of sentinel-separated reads, answering exact
//! substring queries and suffix/prefix overlap queries for overlap-based
//! sequence assembly.
//!
//! The index is built once from a set of reads and is immutable afterwards. All
//! query state lives in per-query [`Cursor`] values, so a finished index can be
//! shared freely between threads.

/// Contains functions to create commonly used alphabets.
pub mod alphabet;
pub mod config;
pub mod cursor;
pub mod rank_support;

mod construction;
mod overlap;
mod read_bounds;

use libsais::OutputElement;
use num_traits::{NumCast, PrimInt};

#[doc(inline)]
pub use alphabet::Alphabet;
#[doc(inline)]
pub use config::FmIndexConfig;
#[doc(inline)]
pub use cursor::Cursor;
#[doc(inline)]
pub use overlap::Overlap;
#[doc(inline)]
pub use rank_support::{ColumnarRankSupport, RankSupport};

use construction::DataStructures;
use read_bounds::ReadBoundaries;

pub type FmIndexI32 = FmIndex<i32>;
pub type FmIndexI64 = FmIndex<i64>;

/// The FM-Index over a collection of reads.
///
/// Owns the concatenated dense text, its full suffix array, the count table and
/// the rank structure over the BWT. Build it via [`FmIndexConfig`].
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, PartialEq, Eq)]
pub struct FmIndex<I: 'static, R: 'static = ColumnarRankSupport<I>> {
    alphabet: Alphabet,
    text: Vec<u8>,
    count: Vec<usize>,
    suffix_array: Vec<I>,
    rank_support: R,
    read_bounds: ReadBoundaries,
}

impl<I: IndexStorage, R: RankSupport<I>> FmIndex<I, R> {
    fn new<T: AsRef<[u8]>>(
        reads: impl IntoIterator<Item = T>,
        alphabet: Alphabet,
        suffix_array_construction_threads: u16,
    ) -> Result<Self, BuildError> {
        let DataStructures {
            text,
            count,
            suffix_array,
            rank_support,
            read_bounds,
        } = construction::create_data_structures::<I, R, T>(
            reads,
            &alphabet,
            suffix_array_construction_threads,
        )?;

        Ok(FmIndex {
            alphabet,
            text,
            count,
            suffix_array,
            rank_support,
            read_bounds,
        })
    }

    pub fn num_reads(&self) -> usize {
        self.read_bounds.num_reads()
    }

    /// Length of the concatenated text, sentinels included.
    pub fn total_text_len(&self) -> usize {
        self.text.len()
    }

    /// Returns the number of occurrences of the query in the indexed reads.
    ///
    /// The running time is in O(query length).
    pub fn count(&self, query: &[u8]) -> usize {
        self.cursor_for_query(query).count()
    }

    /// Returns whether the query occurs at least once in the indexed reads.
    ///
    /// The running time is in O(query length), independent of the text size.
    pub fn contains(&self, query: &[u8]) -> bool {
        !self.cursor_for_query(query).is_empty()
    }

    /// Returns all occurrences of the query as read ids and positions within
    /// the read. The order of the hits is unspecified.
    pub fn locate(&self, query: &[u8]) -> impl Iterator<Item = Hit> {
        self.locate_interval(self.cursor_for_query(query).interval())
    }

    /// Returns all occurrences of the query as offsets into the concatenated
    /// text, in unspecified order.
    pub fn locate_offsets(&self, query: &[u8]) -> impl Iterator<Item = usize> {
        self.offsets_in_interval(self.cursor_for_query(query).interval())
    }

    /// Returns the half-open interval of suffix array rows whose suffixes start
    /// with the query.
    ///
    /// The empty query matches everywhere and yields the full interval
    /// `[0, total_text_len)`.
    pub fn interval_for_query(&self, query: &[u8]) -> HalfOpenInterval {
        self.cursor_for_query(query).interval()
    }

    /// A cursor with the empty query, matching the full interval.
    pub fn cursor_empty(&self) -> Cursor<'_, I, R> {
        Cursor {
            index: self,
            interval: HalfOpenInterval {
                start: 0,
                end: self.text.len(),
            },
        }
    }

    /// Runs a backward search over the query and returns the resulting cursor.
    pub fn cursor_for_query(&self, query: &[u8]) -> Cursor<'_, I, R> {
        let mut cursor = self.cursor_empty();

        for &io_symbol in query.iter().rev() {
            cursor.extend_query_front(io_symbol);

            if cursor.is_empty() {
                break;
            }
        }

        cursor
    }

    /// Returns the read containing the given offset of the concatenated text,
    /// in io representation, by scanning to the enclosing sentinels.
    ///
    /// An offset on a sentinel resolves to the read that sentinel terminates.
    /// The running time is in O(read length).
    pub fn read_at_offset(&self, offset: usize) -> Vec<u8> {
        let start = memchr::memrchr(alphabet::SENTINEL, &self.text[..offset]).map_or(0, |i| i + 1);

        // the text is sentinel-terminated
        let end = offset + memchr::memchr(alphabet::SENTINEL, &self.text[offset..]).unwrap();

        self.text[start..end]
            .iter()
            .map(|&dense| self.alphabet.dense_to_io_representation(dense))
            .collect()
    }

    /// Reconstructs the read that ends directly before the suffix of the given
    /// suffix array row, by walking the LF-mapping backwards until a sentinel
    /// is produced.
    ///
    /// For the rows of sentinel suffixes (the first `num_reads` rows), this
    /// recovers the read terminated by that sentinel. This is a diagnostic
    /// path; [`read_at_offset`](FmIndex::read_at_offset) is the intended way to
    /// materialize reads.
    pub fn recover_read_before_row(&self, mut row: usize) -> Vec<u8> {
        let mut read = Vec::new();

        loop {
            let dense = self.rank_support.symbol_at(row);

            if dense == alphabet::SENTINEL {
                break;
            }

            read.push(self.alphabet.dense_to_io_representation(dense));
            row = self.lf_mapping_step(dense, row);
        }

        read.reverse();
        read
    }

    fn locate_interval(&self, interval: HalfOpenInterval) -> impl Iterator<Item = Hit> {
        self.offsets_in_interval(interval).map(|offset| {
            let (read_id, position) = self.read_bounds.split_concatenated_offset(offset);

            Hit { read_id, position }
        })
    }

    fn offsets_in_interval(&self, interval: HalfOpenInterval) -> impl Iterator<Item = usize> {
        self.suffix_array[interval.start..interval.end]
            .iter()
            .map(|&idx| <usize as NumCast>::from(idx).unwrap())
    }

    fn lf_mapping_step(&self, dense_symbol: u8, idx: usize) -> usize {
        self.count[dense_symbol as usize] + self.rank_support.rank(dense_symbol, idx)
    }
}

#[cfg(feature = "savefile")]
impl<I: IndexStorage, R: RankSupport<I>> FmIndex<I, R> {
    const VERSION_FOR_SAVEFILE: u32 = 0;

    pub fn load_from_reader(
        reader: &mut impl std::io::Read,
    ) -> Result<Self, savefile::SavefileError> {
        savefile::load(reader, Self::VERSION_FOR_SAVEFILE)
    }

    pub fn load_from_file(
        filepath: impl AsRef<std::path::Path>,
    ) -> Result<Self, savefile::SavefileError> {
        savefile::load_file(filepath, Self::VERSION_FOR_SAVEFILE)
    }

    pub fn save_to_writer(
        &self,
        writer: &mut impl std::io::Write,
    ) -> Result<(), savefile::SavefileError> {
        savefile::save(writer, Self::VERSION_FOR_SAVEFILE, self)
    }

    pub fn save_to_file(
        &self,
        filepath: impl AsRef<std::path::Path>,
    ) -> Result<(), savefile::SavefileError> {
        savefile::save_file(filepath, Self::VERSION_FOR_SAVEFILE, self)
    }
}

/// An occurrence of a query in one of the indexed reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hit {
    pub read_id: usize,
    pub position: usize,
}

/// A half-open interval `[start, end)` of suffix array rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfOpenInterval {
    pub start: usize,
    pub end: usize,
}

impl HalfOpenInterval {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Error raised when an index cannot be built from the given reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// No reads were given. An index needs at least one sentinel-terminated read.
    EmptyInput,
    /// A read contains a byte outside the alphabet. This includes a literal
    /// sentinel byte, which may only occur as a read terminator.
    InvalidSymbol {
        read_id: usize,
        position: usize,
        symbol: u8,
    },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::EmptyInput => write!(f, "cannot build an index over zero reads"),
            BuildError::InvalidSymbol {
                read_id,
                position,
                symbol,
            } => write!(
                f,
                "read {read_id} contains the symbol {:?} at position {position}, \
                 which is not part of the alphabet",
                *symbol as char
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// Types that can store suffix array entries of the index.
///
/// The maximum value of the type is an upper bound for the total length of the
/// indexed reads, sentinels included.
pub trait IndexStorage:
    PrimInt + OutputElement + maybe_savefile::MaybeSavefile + sealed::Sealed + Send + Sync + 'static
{
}

impl sealed::Sealed for i32 {}
impl IndexStorage for i32 {}

impl sealed::Sealed for i64 {}
impl IndexStorage for i64 {}

mod maybe_savefile {
    #[cfg(feature = "savefile")]
    pub trait MaybeSavefile: savefile::Savefile {}

    #[cfg(not(feature = "savefile"))]
    pub trait MaybeSavefile {}

    impl MaybeSavefile for i32 {}
    impl MaybeSavefile for i64 {}
}

mod sealed {
    pub trait Sealed {}
}
