//! Rank support over the BWT of the concatenated text.
//!
//! The index only ever needs two questions answered about the BWT: how many
//! occurrences of a symbol appear before a given row, and which symbol a given
//! row holds. Both are behind the [`RankSupport`] trait, so the concrete
//! space/time tradeoff can be swapped without touching the search code.

use num_traits::NumCast;
use rayon::prelude::*;

use crate::{IndexStorage, maybe_savefile::MaybeSavefile, sealed::Sealed};

const WORD_NUM_BITS: usize = 64;
const SUPERBLOCK_NUM_BITS: usize = u16::MAX as usize + 1;
const WORDS_PER_SUPERBLOCK: usize = SUPERBLOCK_NUM_BITS / WORD_NUM_BITS;

/// Occurrence counting over an immutable text in dense representation.
///
/// All symbols of the text must be smaller than the alphabet size given at
/// construction. Queries with out-of-range arguments are programming errors
/// and panic instead of returning a clamped answer.
pub trait RankSupport<I>: Sealed + MaybeSavefile + Send + Sync + 'static {
    /// Builds the structure. The running time is linear in the text length.
    fn construct(text: &[u8], alphabet_size: usize) -> Self;

    /// Returns the number of occurrences of `symbol` in `text[0..idx)`.
    ///
    /// `idx` may be `text.len()`, which yields the total occurrence count.
    /// The running time is in O(1).
    fn rank(&self, symbol: u8, idx: usize) -> usize;

    /// Recovers the symbol of the text at `idx`.
    fn symbol_at(&self, idx: usize) -> u8;

    fn text_len(&self) -> usize;

    fn alphabet_size(&self) -> usize;
}

/// The default [`RankSupport`] implementation.
///
/// Stores one indicator bit column per symbol of the alphabet, each with a
/// two-level rank acceleration: `u16` offsets per 64-bit word relative to the
/// enclosing superblock of 2^16 bits, and `I`-typed offsets per superblock.
/// A rank query is two array lookups and one masked popcount.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnarRankSupport<I: 'static> {
    text_len: usize,
    alphabet_size: usize,
    columns: Vec<SymbolColumn<I>>,
}

impl<I: IndexStorage> Sealed for ColumnarRankSupport<I> {}

impl<I: IndexStorage> MaybeSavefile for ColumnarRankSupport<I> {}

impl<I: IndexStorage> RankSupport<I> for ColumnarRankSupport<I> {
    fn construct(text: &[u8], alphabet_size: usize) -> Self {
        assert!(alphabet_size >= 2 && alphabet_size < 256);

        let columns = (0..alphabet_size)
            .into_par_iter()
            .map(|symbol| SymbolColumn::construct(symbol as u8, text))
            .collect();

        Self {
            text_len: text.len(),
            alphabet_size,
            columns,
        }
    }

    fn rank(&self, symbol: u8, idx: usize) -> usize {
        assert!((symbol as usize) < self.alphabet_size && idx <= self.text_len);

        self.columns[symbol as usize].rank(idx)
    }

    fn symbol_at(&self, idx: usize) -> u8 {
        assert!(idx < self.text_len);

        for (symbol, column) in self.columns.iter().enumerate() {
            if column.bit_at(idx) {
                return symbol as u8;
            }
        }

        unreachable!("every text position holds exactly one symbol")
    }

    fn text_len(&self) -> usize {
        self.text_len
    }

    fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }
}

#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, PartialEq, Eq)]
struct SymbolColumn<I> {
    words: Vec<u64>,
    block_offsets: Vec<u16>,
    superblock_offsets: Vec<I>,
}

impl<I: IndexStorage> SymbolColumn<I> {
    fn construct(symbol: u8, text: &[u8]) -> Self {
        // one extra word and superblock so that rank queries at idx == text.len()
        // land on stored offsets
        let num_words = text.len() / WORD_NUM_BITS + 1;
        let num_superblocks = text.len() / SUPERBLOCK_NUM_BITS + 1;

        let mut words = vec![0u64; num_words];
        let mut block_offsets = vec![0u16; num_words];
        let mut superblock_offsets = vec![I::zero(); num_superblocks];

        let mut total_count: usize = 0;
        let mut count_in_superblock: usize = 0;

        for (word_index, word) in words.iter_mut().enumerate() {
            if word_index % WORDS_PER_SUPERBLOCK == 0 {
                superblock_offsets[word_index / WORDS_PER_SUPERBLOCK] =
                    <I as NumCast>::from(total_count).unwrap();
                count_in_superblock = 0;
            }

            block_offsets[word_index] = count_in_superblock as u16;

            let begin = word_index * WORD_NUM_BITS;
            let end = std::cmp::min(begin + WORD_NUM_BITS, text.len());

            for (index_in_word, &text_symbol) in text[begin..end].iter().enumerate() {
                if text_symbol == symbol {
                    *word |= 1 << index_in_word;
                }
            }

            let ones = word.count_ones() as usize;
            count_in_superblock += ones;
            total_count += ones;
        }

        Self {
            words,
            block_offsets,
            superblock_offsets,
        }
    }

    fn rank(&self, idx: usize) -> usize {
        let word_index = idx / WORD_NUM_BITS;
        let index_in_word = idx % WORD_NUM_BITS;

        let superblock_offset = <usize as NumCast>::from(
            self.superblock_offsets[idx / SUPERBLOCK_NUM_BITS],
        )
        .unwrap();
        let block_offset = self.block_offsets[word_index] as usize;

        let mask = (1u64 << index_in_word) - 1;
        let count_in_word = (self.words[word_index] & mask).count_ones() as usize;

        superblock_offset + block_offset + count_in_word
    }

    fn bit_at(&self, idx: usize) -> bool {
        (self.words[idx / WORD_NUM_BITS] >> (idx % WORD_NUM_BITS)) & 1 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_text_ranks() {
        let text = [0u8, 1, 2, 2, 1, 0, 1];
        let ranks: ColumnarRankSupport<i32> = RankSupport::construct(&text, 3);

        assert_eq!(ranks.text_len(), text.len());
        assert_eq!(ranks.alphabet_size(), 3);

        assert_eq!(ranks.rank(0, 0), 0);
        assert_eq!(ranks.rank(0, 1), 1);
        assert_eq!(ranks.rank(1, 5), 2);
        assert_eq!(ranks.rank(1, text.len()), 3);
        assert_eq!(ranks.rank(2, 2), 0);
        assert_eq!(ranks.rank(2, text.len()), 2);

        for (idx, &symbol) in text.iter().enumerate() {
            assert_eq!(ranks.symbol_at(idx), symbol);
        }
    }

    #[test]
    fn ranks_across_word_boundaries() {
        let text: Vec<u8> = (0..200).map(|i| (i % 2) as u8).collect();
        let ranks: ColumnarRankSupport<i64> = RankSupport::construct(&text, 2);

        for idx in 0..=text.len() {
            assert_eq!(ranks.rank(0, idx), idx.div_ceil(2));
            assert_eq!(ranks.rank(1, idx), idx / 2);
        }
    }

    #[test]
    #[should_panic]
    fn rank_out_of_range_panics() {
        let text = [0u8, 1];
        let ranks: ColumnarRankSupport<i32> = RankSupport::construct(&text, 2);

        let _ = ranks.rank(0, 3);
    }
}
