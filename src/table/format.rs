//! Binary pattern-table asset
//!
//! Layout, all little-endian:
//!
//! ```text
//! u32 magic  u16 version  u8 word_len  u8 reserved
//! u32 vocab_len  u32 vocab_hash  u32 seed_count
//! u32 seeds[seed_count]
//! u16 codes[seed_count * vocab_len]   (row = seed, column = vocabulary index)
//! ```

use thiserror::Error;

pub const MAGIC: u32 = 0x4958_5054;
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 20;

/// Longest word whose codes fit in `u16` (3^10 - 1 < 2^16)
pub const MAX_TABLE_LEN: usize = 10;

/// Why an asset was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("asset truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),
    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),
    #[error("reserved byte is {0}, expected 0")]
    Reserved(u8),
    #[error("word length {found}, expected {expected}")]
    WordLength { expected: usize, found: usize },
    #[error("vocabulary size {found}, expected {expected}")]
    VocabSize { expected: usize, found: usize },
    #[error("vocabulary hash {found:#010x}, expected {expected:#010x}")]
    VocabHash { expected: u32, found: u32 },
    #[error("seed index {index} outside vocabulary of {vocab_len}")]
    SeedOutOfRange { index: u32, vocab_len: usize },
    #[error("{0} trailing bytes after pattern matrix")]
    TrailingBytes(usize),
    #[error("pattern code {code} at matrix entry {entry} exceeds {max} for this word length")]
    CodeOutOfRange { code: u16, entry: usize, max: u64 },
}

/// Build-time failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("pattern of '{guess}' does not fit in 16 bits (word length {word_len})")]
    Overflow { guess: String, word_len: usize },
}

/// What a loaded asset must describe to be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub word_len: usize,
    pub vocab_len: usize,
    pub vocab_hash: u32,
}

/// Precomputed feedback rows for a set of seed guesses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    word_len: usize,
    vocab_len: usize,
    vocab_hash: u32,
    seeds: Vec<u32>,
    codes: Vec<u16>,
}

impl PatternTable {
    /// # Panics
    /// If `codes` is not `seeds.len() * vocab_len` long.
    #[must_use]
    pub fn new(
        word_len: usize,
        vocab_len: usize,
        vocab_hash: u32,
        seeds: Vec<u32>,
        codes: Vec<u16>,
    ) -> Self {
        assert_eq!(
            codes.len(),
            seeds.len() * vocab_len,
            "pattern matrix does not match seed count"
        );
        Self {
            word_len,
            vocab_len,
            vocab_hash,
            seeds,
            codes,
        }
    }

    #[must_use]
    pub const fn word_len(&self) -> usize {
        self.word_len
    }

    #[must_use]
    pub const fn vocab_len(&self) -> usize {
        self.vocab_len
    }

    #[must_use]
    pub const fn vocab_hash(&self) -> u32 {
        self.vocab_hash
    }

    /// Vocabulary indices of the seed guesses, in row order
    #[must_use]
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Row position of a vocabulary index, if it is a seed
    #[must_use]
    pub fn seed_row(&self, vocab_index: usize) -> Option<usize> {
        self.seeds
            .iter()
            .position(|&s| usize::try_from(s).is_ok_and(|s| s == vocab_index))
    }

    /// Codes of one seed row against the whole vocabulary
    ///
    /// # Panics
    /// If `row >= seeds().len()`.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u16] {
        let start = row * self.vocab_len;
        &self.codes[start..start + self.vocab_len]
    }

    /// Serialized size in bytes
    #[must_use]
    pub fn byte_len(&self) -> usize {
        HEADER_LEN + self.seeds.len() * 4 + self.codes.len() * 2
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.push(self.word_len as u8);
        out.push(0);
        out.extend_from_slice(&(self.vocab_len as u32).to_le_bytes());
        out.extend_from_slice(&self.vocab_hash.to_le_bytes());
        out.extend_from_slice(&(self.seeds.len() as u32).to_le_bytes());
        for seed in &self.seeds {
            out.extend_from_slice(&seed.to_le_bytes());
        }
        for code in &self.codes {
            out.extend_from_slice(&code.to_le_bytes());
        }
        out
    }

    /// Parse and validate an asset against the vocabulary it claims to cover
    ///
    /// # Errors
    /// Any header field that disagrees with `expected`, a seed index outside
    /// the vocabulary, or a size that does not match the declared counts.
    pub fn parse(bytes: &[u8], expected: &Expectation) -> Result<Self, FormatError> {
        let mut reader = Reader { bytes, pos: 0 };

        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic(magic));
        }
        let version = reader.u16()?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let word_len = usize::from(reader.u8()?);
        let reserved = reader.u8()?;
        if reserved != 0 {
            return Err(FormatError::Reserved(reserved));
        }
        if word_len != expected.word_len {
            return Err(FormatError::WordLength {
                expected: expected.word_len,
                found: word_len,
            });
        }
        let vocab_len = reader.u32()? as usize;
        if vocab_len != expected.vocab_len {
            return Err(FormatError::VocabSize {
                expected: expected.vocab_len,
                found: vocab_len,
            });
        }
        let vocab_hash = reader.u32()?;
        if vocab_hash != expected.vocab_hash {
            return Err(FormatError::VocabHash {
                expected: expected.vocab_hash,
                found: vocab_hash,
            });
        }
        let seed_count = reader.u32()? as usize;

        let needed = HEADER_LEN + seed_count * 4 + seed_count * vocab_len * 2;
        if bytes.len() < needed {
            return Err(FormatError::Truncated {
                needed,
                actual: bytes.len(),
            });
        }
        if bytes.len() > needed {
            return Err(FormatError::TrailingBytes(bytes.len() - needed));
        }

        let mut seeds = Vec::with_capacity(seed_count);
        for _ in 0..seed_count {
            let index = reader.u32()?;
            if index as usize >= vocab_len {
                return Err(FormatError::SeedOutOfRange { index, vocab_len });
            }
            seeds.push(index);
        }
        // 3^L - 1; every u16 is in range from L = 11 on
        let max = u32::try_from(word_len)
            .ok()
            .and_then(|l| 3u64.checked_pow(l))
            .map_or(u64::MAX, |n| n - 1);
        let mut codes = Vec::with_capacity(seed_count * vocab_len);
        for entry in 0..seed_count * vocab_len {
            let code = reader.u16()?;
            if u64::from(code) > max {
                return Err(FormatError::CodeOutOfRange { code, entry, max });
            }
            codes.push(code);
        }

        Ok(Self {
            word_len,
            vocab_len,
            vocab_hash,
            seeds,
            codes,
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or(FormatError::Truncated {
            needed: end,
            actual: self.bytes.len(),
        })?;
        self.pos = end;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, FormatError> {
        self.take().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        self.take().map(u32::from_le_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatternTable {
        PatternTable::new(3, 4, 0xdead_beef, vec![2, 0], vec![1, 2, 3, 4, 5, 6, 7, 8])
    }

    fn expectation() -> Expectation {
        Expectation {
            word_len: 3,
            vocab_len: 4,
            vocab_hash: 0xdead_beef,
        }
    }

    #[test]
    fn header_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(&bytes[0..4], &[0x54, 0x50, 0x58, 0x49]);
        assert_eq!(&bytes[4..6], &[1, 0]);
        assert_eq!(bytes[6], 3);
        assert_eq!(bytes[7], 0);
        assert_eq!(&bytes[8..12], &[4, 0, 0, 0]);
        assert_eq!(&bytes[16..20], &[2, 0, 0, 0]);
        assert_eq!(bytes.len(), sample().byte_len());
    }

    #[test]
    fn parses_what_it_writes() {
        let table = sample();
        let parsed = PatternTable::parse(&table.to_bytes(), &expectation()).unwrap();
        assert_eq!(parsed, table);
        assert_eq!(parsed.row(1), &[5, 6, 7, 8]);
        assert_eq!(parsed.seed_row(0), Some(1));
        assert_eq!(parsed.seed_row(1), None);
    }

    #[test]
    fn rejects_each_header_mismatch() {
        let bytes = sample().to_bytes();
        let base = expectation();

        let mut bad = bytes.clone();
        bad[0] ^= 1;
        assert!(matches!(
            PatternTable::parse(&bad, &base),
            Err(FormatError::BadMagic(_))
        ));

        let mut bad = bytes.clone();
        bad[4] = 2;
        assert_eq!(
            PatternTable::parse(&bad, &base),
            Err(FormatError::UnsupportedVersion(2))
        );

        let mut bad = bytes.clone();
        bad[7] = 1;
        assert_eq!(PatternTable::parse(&bad, &base), Err(FormatError::Reserved(1)));

        let wrong_len = Expectation { word_len: 5, ..base };
        assert!(matches!(
            PatternTable::parse(&bytes, &wrong_len),
            Err(FormatError::WordLength { .. })
        ));

        let wrong_size = Expectation { vocab_len: 5, ..base };
        assert!(matches!(
            PatternTable::parse(&bytes, &wrong_size),
            Err(FormatError::VocabSize { .. })
        ));

        let wrong_hash = Expectation { vocab_hash: 1, ..base };
        assert!(matches!(
            PatternTable::parse(&bytes, &wrong_hash),
            Err(FormatError::VocabHash { .. })
        ));
    }

    #[test]
    fn rejects_bad_sizes_and_seeds() {
        let bytes = sample().to_bytes();
        assert!(matches!(
            PatternTable::parse(&bytes[..bytes.len() - 1], &expectation()),
            Err(FormatError::Truncated { .. })
        ));
        assert!(matches!(
            PatternTable::parse(&bytes[..10], &expectation()),
            Err(FormatError::Truncated { .. })
        ));

        let mut long = bytes.clone();
        long.push(0);
        assert_eq!(
            PatternTable::parse(&long, &expectation()),
            Err(FormatError::TrailingBytes(1))
        );

        let mut bad_seed = bytes;
        bad_seed[20] = 9;
        assert!(matches!(
            PatternTable::parse(&bad_seed, &expectation()),
            Err(FormatError::SeedOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn rejects_codes_beyond_the_word_length() {
        // Word length 3 allows codes up to 26; the matrix starts at byte 28
        let mut bytes = sample().to_bytes();
        bytes[28] = 26;
        assert!(PatternTable::parse(&bytes, &expectation()).is_ok());

        bytes[30] = 27;
        assert_eq!(
            PatternTable::parse(&bytes, &expectation()),
            Err(FormatError::CodeOutOfRange {
                code: 27,
                entry: 1,
                max: 26
            })
        );
    }

    #[test]
    #[should_panic(expected = "pattern matrix does not match seed count")]
    fn mismatched_matrix_panics() {
        let _ = PatternTable::new(3, 4, 0, vec![0], vec![1, 2]);
    }
}
