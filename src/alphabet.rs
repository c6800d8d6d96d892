//! Dense alphabet encoding for indexed reads.
//!
//! Reads are handed to the index as ascii bytes (the io representation) and are
//! translated into a dense representation before indexing: the read separator
//! (sentinel) is `0` and the searchable symbols are `1..=k` in lexicographic
//! order. Bytes without a translation map to an invalid marker and are rejected
//! at construction time or treated as a guaranteed non-match in queries.

/// The read separator in dense representation. Lexicographically smaller than
/// every searchable symbol, appended once after every read.
pub const SENTINEL: u8 = 0;

/// The io byte that represents the sentinel when reads are recovered from the index.
pub const SENTINEL_IO: u8 = b'$';

pub(crate) const INVALID_SYMBOL: u8 = 255;

/// Translation between io bytes and the dense representation used by the index.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    io_to_dense: [u8; 256],
    dense_to_io: [u8; 256],
    num_dense_symbols: usize,
}

impl Alphabet {
    /// Creates an alphabet from groups of io bytes that should be treated as the
    /// same symbol (typically upper- and lowercase). Groups must be given in the
    /// desired lexicographic order of the dense symbols and the first byte of a
    /// group is used when translating back to io representation.
    pub fn from_symbol_groups(groups: &[&[u8]]) -> Self {
        assert!(!groups.is_empty() && groups.len() < INVALID_SYMBOL as usize);

        let mut io_to_dense = [INVALID_SYMBOL; 256];
        let mut dense_to_io = [INVALID_SYMBOL; 256];
        dense_to_io[SENTINEL as usize] = SENTINEL_IO;

        for (i, group) in groups.iter().enumerate() {
            let dense = (i + 1) as u8;

            for &io_symbol in *group {
                assert!(
                    io_symbol != SENTINEL_IO,
                    "the sentinel byte cannot be a searchable symbol"
                );
                io_to_dense[io_symbol as usize] = dense;
            }

            dense_to_io[dense as usize] = group[0];
        }

        Self {
            io_to_dense,
            dense_to_io,
            num_dense_symbols: groups.len() + 1,
        }
    }

    /// Returns the dense representation of an io byte, or an invalid marker
    /// if the byte is not part of this alphabet.
    pub(crate) fn io_to_dense_representation(&self, io_symbol: u8) -> u8 {
        self.io_to_dense[io_symbol as usize]
    }

    pub(crate) fn dense_to_io_representation(&self, dense_symbol: u8) -> u8 {
        self.dense_to_io[dense_symbol as usize]
    }

    /// Number of dense symbols including the sentinel.
    pub fn num_dense_symbols(&self) -> usize {
        self.num_dense_symbols
    }

    /// Number of symbols that can occur in queries (the sentinel cannot).
    pub fn num_searchable_symbols(&self) -> usize {
        self.num_dense_symbols - 1
    }
}

/// The DNA alphabet `ACGT`, case-insensitive.
pub fn ascii_dna() -> Alphabet {
    Alphabet::from_symbol_groups(&[b"Aa", b"Cc", b"Gg", b"Tt"])
}

/// The DNA alphabet `ACGT` extended by the unknown-base symbol `N`, case-insensitive.
pub fn ascii_dna_with_n() -> Alphabet {
    Alphabet::from_symbol_groups(&[b"Aa", b"Cc", b"Gg", b"Tt", b"Nn"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_translation_round_trip() {
        let alphabet = ascii_dna();

        assert_eq!(alphabet.num_dense_symbols(), 5);
        assert_eq!(alphabet.num_searchable_symbols(), 4);

        for (io_symbol, dense) in [(b'A', 1), (b'c', 2), (b'G', 3), (b't', 4)] {
            assert_eq!(alphabet.io_to_dense_representation(io_symbol), dense);
            assert_eq!(
                alphabet.dense_to_io_representation(dense),
                io_symbol.to_ascii_uppercase()
            );
        }

        assert_eq!(alphabet.io_to_dense_representation(b'N'), INVALID_SYMBOL);
        assert_eq!(alphabet.io_to_dense_representation(b'$'), INVALID_SYMBOL);
        assert_eq!(alphabet.dense_to_io_representation(SENTINEL), b'$');
    }

    #[test]
    #[should_panic]
    fn sentinel_byte_rejected_as_symbol() {
        let _ = Alphabet::from_symbol_groups(&[b"A$"]);
    }
}
