use std::marker::PhantomData;

use crate::rank_support::{ColumnarRankSupport, RankSupport};
use crate::{Alphabet, BuildError, FmIndex, IndexStorage};

/// Configuration for building an [`FmIndex`].
///
/// The type parameters select the suffix array storage integer and the rank
/// support implementation of the resulting index.
pub struct FmIndexConfig<I, R = ColumnarRankSupport<I>> {
    suffix_array_construction_threads: u16,
    _index_storage_marker: PhantomData<I>,
    _rank_support_marker: PhantomData<R>,
}

impl<I: IndexStorage, R: RankSupport<I>> FmIndexConfig<I, R> {
    /// All other construction steps use rayon's configured number of threads.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suffix_array_construction_threads(&mut self, num_threads: u16) -> &mut Self {
        self.suffix_array_construction_threads = num_threads;
        self
    }

    pub fn construct<T: AsRef<[u8]>>(
        &mut self,
        reads: impl IntoIterator<Item = T>,
        alphabet: Alphabet,
    ) -> Result<FmIndex<I, R>, BuildError> {
        FmIndex::new(reads, alphabet, self.suffix_array_construction_threads)
    }
}

impl<I: IndexStorage, R: RankSupport<I>> Default for FmIndexConfig<I, R> {
    fn default() -> Self {
        Self {
            suffix_array_construction_threads: 1,
            _index_storage_marker: PhantomData,
            _rank_support_marker: PhantomData,
        }
    }
}
