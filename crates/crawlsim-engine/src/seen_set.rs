//! Membership over the docid space: a hashed variant with no capacity
//! bound, and a fixed-capacity bitmap variant for when the orchestrator can
//! supply a dense integer key.

use crawlsim_core::{DocNo, Error, Result, SeenSet};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct HashedSeenSet {
    seen: HashSet<DocNo>,
}

impl HashedSeenSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenSet for HashedSeenSet {
    fn mark(&mut self, docno: DocNo) -> Result<()> {
        self.seen.insert(docno);
        Ok(())
    }

    fn is_marked(&self, docno: DocNo) -> bool {
        self.seen.contains(&docno)
    }

    fn count(&self) -> usize {
        self.seen.len()
    }
}

/// Fixed-capacity bit vector. Docnos must satisfy `0 <= docno < capacity`;
/// out-of-range values fail with `Error::OutOfRange` rather than panicking.
#[derive(Debug)]
pub struct BitmapSeenSet {
    capacity: u64,
    bits: Vec<u64>,
    count: usize,
}

const WORD_BITS: u64 = 64;

impl BitmapSeenSet {
    pub fn new(capacity: u64) -> Self {
        let words = capacity.div_ceil(WORD_BITS) as usize;
        Self {
            capacity,
            bits: vec![0u64; words],
            count: 0,
        }
    }

    fn check_range(&self, docno: DocNo) -> Result<()> {
        if docno >= self.capacity {
            return Err(Error::OutOfRange {
                index: docno,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn word_and_bit(docno: DocNo) -> (usize, u64) {
        ((docno / WORD_BITS) as usize, docno % WORD_BITS)
    }
}

impl SeenSet for BitmapSeenSet {
    fn mark(&mut self, docno: DocNo) -> Result<()> {
        self.check_range(docno)?;
        let (word, bit) = Self::word_and_bit(docno);
        let mask = 1u64 << bit;
        if self.bits[word] & mask == 0 {
            self.bits[word] |= mask;
            self.count += 1;
        }
        Ok(())
    }

    fn is_marked(&self, docno: DocNo) -> bool {
        if docno >= self.capacity {
            return false;
        }
        let (word, bit) = Self::word_and_bit(docno);
        self.bits[word] & (1u64 << bit) != 0
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Dispatches to whichever SeenSet variant the orchestrator was configured
/// with, mirroring `frontier::AnyFrontier`'s tagged-union approach.
pub enum AnySeenSet {
    Hashed(HashedSeenSet),
    Bitmap(BitmapSeenSet),
}

impl AnySeenSet {
    pub fn hashed() -> Self {
        AnySeenSet::Hashed(HashedSeenSet::new())
    }

    pub fn bitmap(capacity: u64) -> Self {
        AnySeenSet::Bitmap(BitmapSeenSet::new(capacity))
    }
}

impl SeenSet for AnySeenSet {
    fn mark(&mut self, docno: DocNo) -> Result<()> {
        match self {
            AnySeenSet::Hashed(s) => s.mark(docno),
            AnySeenSet::Bitmap(s) => s.mark(docno),
        }
    }

    fn is_marked(&self, docno: DocNo) -> bool {
        match self {
            AnySeenSet::Hashed(s) => s.is_marked(docno),
            AnySeenSet::Bitmap(s) => s.is_marked(docno),
        }
    }

    fn count(&self) -> usize {
        match self {
            AnySeenSet::Hashed(s) => s.count(),
            AnySeenSet::Bitmap(s) => s.count(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hashed_matches_a_hash_set_oracle(docnos in proptest::collection::vec(0u64..200, 0..200)) {
            let mut s = HashedSeenSet::new();
            let mut oracle: HashSet<DocNo> = HashSet::new();
            for &docno in &docnos {
                s.mark(docno).unwrap();
                oracle.insert(docno);
                prop_assert!(s.is_marked(docno));
            }
            prop_assert_eq!(s.count(), oracle.len());
            for probe in 0u64..200 {
                prop_assert_eq!(s.is_marked(probe), oracle.contains(&probe));
            }
        }

        #[test]
        fn bitmap_matches_a_hash_set_oracle(docnos in proptest::collection::vec(0u64..64, 0..200)) {
            let mut s = BitmapSeenSet::new(64);
            let mut oracle: HashSet<DocNo> = HashSet::new();
            for &docno in &docnos {
                s.mark(docno).unwrap();
                oracle.insert(docno);
                prop_assert!(s.is_marked(docno));
            }
            prop_assert_eq!(s.count(), oracle.len());
            for probe in 0u64..64 {
                prop_assert_eq!(s.is_marked(probe), oracle.contains(&probe));
            }
        }

        #[test]
        fn repeated_mark_sequences_are_idempotent(docnos in proptest::collection::vec(0u64..50, 0..100)) {
            let mut once = HashedSeenSet::new();
            for &docno in &docnos {
                once.mark(docno).unwrap();
            }
            let mut twice = HashedSeenSet::new();
            for &docno in docnos.iter().chain(docnos.iter()) {
                twice.mark(docno).unwrap();
            }
            prop_assert_eq!(once.count(), twice.count());
        }
    }
}
