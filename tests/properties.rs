//! Property tests for the feedback codec and the candidate pool

use std::sync::Arc;

use proptest::prelude::*;
use wordle_assist::core::{
    CORRECT, CandidatePool, MAX_WORD_LEN, PRESENT, Pattern, Trits, Vocabulary, Word, feedback,
    pattern_between,
};

/// Words over a small alphabet so repeated letters are common
fn word_of_len(len: usize) -> impl Strategy<Value = Word> {
    prop::collection::vec(prop::sample::select(b"abcde".to_vec()), len)
        .prop_map(|bytes| Word::new(String::from_utf8(bytes).unwrap()).unwrap())
}

fn word_pair() -> impl Strategy<Value = (Word, Word)> {
    (1usize..=12).prop_flat_map(|len| (word_of_len(len), word_of_len(len)))
}

fn vocab_and_history() -> impl Strategy<Value = (Vec<Word>, Vec<(usize, usize)>)> {
    (2usize..=6).prop_flat_map(|len| {
        prop::collection::vec(word_of_len(len), 2..40).prop_flat_map(|words| {
            let n = words.len();
            let history = prop::collection::vec((0..n, 0..n), 0..4);
            (Just(words), history)
        })
    })
}

fn count_of(word: &Word, letter: u8) -> usize {
    word.bytes().iter().filter(|&&b| b == letter).count()
}

proptest! {
    #[test]
    fn correct_marks_exactly_the_positional_matches((guess, secret) in word_pair()) {
        let trits = feedback(&guess, &secret).unwrap();
        for (i, &t) in trits.as_slice().iter().enumerate() {
            prop_assert_eq!(t == CORRECT, guess.char_at(i) == secret.char_at(i));
        }
    }

    #[test]
    fn present_never_exceeds_the_unmatched_letters((guess, secret) in word_pair()) {
        let trits = feedback(&guess, &secret).unwrap();
        for letter in b'a'..=b'e' {
            let marked = |mark: u8| {
                trits
                    .as_slice()
                    .iter()
                    .zip(guess.bytes())
                    .filter(|&(&t, &b)| t == mark && b == letter)
                    .count()
            };
            let correct = marked(CORRECT);
            let present = marked(PRESENT);
            prop_assert!(present <= count_of(&secret, letter) - correct);
            prop_assert_eq!(
                correct + present,
                count_of(&guess, letter).min(count_of(&secret, letter))
            );
        }
    }

    #[test]
    fn a_word_against_itself_is_solved(word in (1usize..=20).prop_flat_map(word_of_len)) {
        prop_assert!(feedback(&word, &word).unwrap().is_solved());
    }

    #[test]
    fn patterns_decode_to_their_trits(trits in prop::collection::vec(0u8..3, 1..=MAX_WORD_LEN)) {
        let len = trits.len();
        let trits = Trits::from_vec(trits).unwrap();
        let pattern = Pattern::encode(&trits);
        prop_assert_eq!(pattern.code().is_some(), len <= 40);
        prop_assert_eq!(pattern.decode(len), trits);
    }

    #[test]
    fn pattern_between_matches_feedback((guess, secret) in word_pair()) {
        let trits = feedback(&guess, &secret).unwrap();
        prop_assert_eq!(pattern_between(&guess, &secret), Pattern::encode(&trits));
    }

    #[test]
    fn pool_keeps_the_secret((words, history) in vocab_and_history(), secret in any::<prop::sample::Index>()) {
        let vocab = Arc::new(Vocabulary::new(words.clone()).unwrap());
        let secret = secret.index(words.len());
        let observed: Vec<(Word, Pattern)> = history
            .iter()
            .map(|&(g, _)| (words[g].clone(), pattern_between(&words[g], &words[secret])))
            .collect();
        let pool = CandidatePool::from_history(vocab, &observed);
        prop_assert!(pool.is_alive(secret));
    }

    #[test]
    fn pool_matches_a_brute_force_filter((words, history) in vocab_and_history()) {
        let vocab = Arc::new(Vocabulary::new(words.clone()).unwrap());
        let observed: Vec<(Word, Pattern)> = history
            .iter()
            .map(|&(g, s)| (words[g].clone(), pattern_between(&words[g], &words[s])))
            .collect();
        let pool = CandidatePool::from_history(vocab, &observed);

        let expected: Vec<usize> = (0..words.len())
            .filter(|&i| {
                observed
                    .iter()
                    .all(|(guess, pattern)| pattern_between(guess, &words[i]) == *pattern)
            })
            .collect();
        prop_assert_eq!(pool.alive_indices(), expected);
    }
}
