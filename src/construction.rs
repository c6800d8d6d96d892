//! Construction of the index data structures: concatenation of the reads into a
//! densely encoded sentinel-separated text, suffix array construction via
//! libsais, count table and BWT derivation.

use libsais::ThreadCount;
use num_traits::NumCast;
use rayon::prelude::*;

use crate::alphabet::{self, Alphabet};
use crate::rank_support::RankSupport;
use crate::read_bounds::ReadBoundaries;
use crate::{BuildError, IndexStorage};

pub(crate) struct DataStructures<I, R> {
    pub(crate) text: Vec<u8>,
    pub(crate) count: Vec<usize>,
    pub(crate) suffix_array: Vec<I>,
    pub(crate) rank_support: R,
    pub(crate) read_bounds: ReadBoundaries,
}

pub(crate) fn create_data_structures<I: IndexStorage, R: RankSupport<I>, T: AsRef<[u8]>>(
    reads: impl IntoIterator<Item = T>,
    alphabet: &Alphabet,
    suffix_array_construction_threads: u16,
) -> Result<DataStructures<I, R>, BuildError> {
    let (text, mut frequency_table, sentinel_indices) =
        concatenate_into_dense_text::<I, T>(reads, alphabet)?;

    assert!(text.len() <= <usize as NumCast>::from(I::max_value()).unwrap());

    let read_bounds = ReadBoundaries::from_sentinel_indices(sentinel_indices);
    let count = frequency_table_to_count(&frequency_table, alphabet.num_dense_symbols());

    let mut suffix_array = vec![I::zero(); text.len()];

    let mut construction = libsais::SuffixArrayConstruction::for_text(&text)
        .in_borrowed_buffer(suffix_array.as_mut_slice())
        .multi_threaded(ThreadCount::fixed(suffix_array_construction_threads));

    unsafe {
        construction = construction.with_frequency_table(&mut frequency_table);
    }

    construction
        .run()
        .expect("libsais suffix array construction");

    let bwt = bwt_from_suffix_array(&suffix_array, &text);
    let rank_support = R::construct(&bwt, alphabet.num_dense_symbols());

    Ok(DataStructures {
        text,
        count,
        suffix_array,
        rank_support,
        read_bounds,
    })
}

type TextAndMetadata<I> = (Vec<u8>, Vec<I>, Vec<usize>);

/// Translates the reads into dense representation and concatenates them,
/// appending a sentinel after each read. Also collects the symbol frequency
/// table (over the full 256-entry dense range, as libsais expects it) and the
/// sentinel positions.
fn concatenate_into_dense_text<I: IndexStorage, T: AsRef<[u8]>>(
    reads: impl IntoIterator<Item = T>,
    alphabet: &Alphabet,
) -> Result<TextAndMetadata<I>, BuildError> {
    let reads: Vec<_> = reads.into_iter().collect();

    if reads.is_empty() {
        return Err(BuildError::EmptyInput);
    }

    let needed_capacity = reads.iter().map(|r| r.as_ref().len()).sum::<usize>() + reads.len();

    let mut text = Vec::with_capacity(needed_capacity);
    let mut frequency_table = vec![I::zero(); 256];
    let mut sentinel_indices = Vec::with_capacity(reads.len());

    for (read_id, read) in reads.iter().enumerate() {
        for (position, &io_symbol) in read.as_ref().iter().enumerate() {
            let dense = alphabet.io_to_dense_representation(io_symbol);

            if dense == alphabet::INVALID_SYMBOL {
                return Err(BuildError::InvalidSymbol {
                    read_id,
                    position,
                    symbol: io_symbol,
                });
            }

            text.push(dense);
            frequency_table[dense as usize] = frequency_table[dense as usize] + I::one();
        }

        sentinel_indices.push(text.len());
        text.push(alphabet::SENTINEL);
        frequency_table[alphabet::SENTINEL as usize] =
            frequency_table[alphabet::SENTINEL as usize] + I::one();
    }

    Ok((text, frequency_table, sentinel_indices))
}

/// Turns symbol frequencies into the count table: `count[c]` is the number of
/// text symbols strictly smaller than `c`.
fn frequency_table_to_count<I: IndexStorage>(
    frequency_table: &[I],
    num_dense_symbols: usize,
) -> Vec<usize> {
    let mut count: Vec<_> = frequency_table[..num_dense_symbols]
        .iter()
        .map(|&value| <usize as NumCast>::from(value).unwrap())
        .collect();

    let mut sum = 0;

    for entry in count.iter_mut() {
        let temp = *entry;
        *entry = sum;
        sum += temp;
    }

    count
}

fn bwt_from_suffix_array<I: IndexStorage>(suffix_array: &[I], text: &[u8]) -> Vec<u8> {
    let mut bwt = vec![0u8; text.len()];

    let chunk_size = text
        .len()
        .div_ceil(rayon::current_num_threads() * 4)
        .max(1);

    suffix_array
        .par_chunks(chunk_size)
        .zip(bwt.par_chunks_mut(chunk_size))
        .for_each(|(suffix_array_chunk, bwt_chunk)| {
            for (&text_index, bwt_entry) in suffix_array_chunk.iter().zip(bwt_chunk) {
                let text_index = <usize as NumCast>::from(text_index).unwrap();

                // the symbol before the first suffix is the final sentinel
                let text_index = if text_index > 0 {
                    text_index
                } else {
                    text.len()
                };

                *bwt_entry = text[text_index - 1];
            }
        });

    bwt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::ascii_dna;

    #[test]
    fn concat_reads() {
        let reads = [b"cccaaagggttt".as_slice(), b"acgtacgtacgt"];
        let (text, frequency_table, sentinel_indices) =
            concatenate_into_dense_text::<i32, _>(reads, &ascii_dna()).unwrap();

        assert_eq!(
            text,
            [2, 2, 2, 1, 1, 1, 3, 3, 3, 4, 4, 4, 0, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 0]
        );

        assert_eq!(&sentinel_indices, &[12, 25]);

        let mut expected_frequency_table = vec![0; 256];
        expected_frequency_table[0] = 2;
        expected_frequency_table[1] = 6;
        expected_frequency_table[2] = 6;
        expected_frequency_table[3] = 6;
        expected_frequency_table[4] = 6;

        assert_eq!(expected_frequency_table, frequency_table);
    }

    #[test]
    fn concat_rejects_foreign_symbol() {
        let reads = [b"acg".as_slice(), b"ac$t"];
        let result = concatenate_into_dense_text::<i32, _>(reads, &ascii_dna());

        assert_eq!(
            result.unwrap_err(),
            BuildError::InvalidSymbol {
                read_id: 1,
                position: 2,
                symbol: b'$',
            }
        );
    }

    #[test]
    fn count_table_invariants() {
        let reads = [b"acgtacgtacgt".as_slice(), b"tttt"];
        let (text, frequency_table, _) =
            concatenate_into_dense_text::<i32, _>(reads, &ascii_dna()).unwrap();

        let count = frequency_table_to_count(&frequency_table, 5);

        // non-decreasing in symbol order, sentinel lowest
        assert!(count.is_sorted());
        assert_eq!(count[0], 0);

        // count of the greatest symbol plus its frequency spans the whole text
        let num_t = text.iter().filter(|&&s| s == 4).count();
        assert_eq!(count[4] + num_t, text.len());
    }

    #[test]
    fn bwt_of_small_text() {
        // text "ab$" as dense symbols with a = 1, b = 2
        let text = [1u8, 2, 0];
        let suffix_array = [2i32, 0, 1];

        let bwt = bwt_from_suffix_array(&suffix_array, &text);

        assert_eq!(bwt, [2, 0, 1]);
    }
}
