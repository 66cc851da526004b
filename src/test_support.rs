//! Word list generators shared by unit tests

use crate::core::Word;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `count` pseudo-random words of length `len` over `alphabet`
pub fn synthetic_words(count: usize, len: usize, alphabet: &[u8], seed: u64) -> Vec<Word> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let text: String = (0..len)
                .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
                .collect();
            Word::new(text).unwrap()
        })
        .collect()
}

/// Every word of length `len` over `alphabet`, in lexicographic order
pub fn all_words_over(alphabet: &[u8], len: usize) -> Vec<Word> {
    let mut words = vec![String::new()];
    for _ in 0..len {
        words = words
            .into_iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |&c| {
                    let mut next = prefix.clone();
                    next.push(char::from(c));
                    next
                })
            })
            .collect();
    }
    words.into_iter().map(|w| Word::new(w).unwrap()).collect()
}
