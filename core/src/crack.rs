//! The crack engine: a per-request pool of OS threads brute-forcing the
//! dictionary against one cipher text.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::debug;

use crate::SaltmineError;
use crate::crypt::{CryptEngine, Salt};
use crate::dictionary::Dictionary;

/// What one worker brings back: the match, if it found one, and how many
/// times it invoked the primitive.
#[derive(Debug)]
struct WorkerReport {
    word: Option<String>,
    crypt_calls: u32,
}

/// Result of a whole crack request. `worker_calls` has one entry per
/// spawned worker so the statistics layer can account for each worker's
/// primitive invocations with a single locked addition.
#[derive(Debug)]
pub struct CrackOutcome {
    pub word: Option<String>,
    pub worker_calls: Vec<u32>,
}

/// Collapses the requested worker count to what the dictionary supports:
/// a single worker when one was asked for or when there are more workers
/// than words.
fn effective_worker_count(requested: u32, dictionary_len: usize) -> usize {
    if requested == 1 || requested as usize > dictionary_len {
        1
    } else {
        requested as usize
    }
}

/// Runs a crack request to completion.
///
/// # Arguments
///
/// * `engine` - The crypt primitive used to hash each candidate.
/// * `dictionary` - The shared read-only word list.
/// * `cipher` - The 13-character cipher text being cracked.
/// * `salt` - The validated salt extracted from the cipher's prefix.
/// * `requested_workers` - The worker count from the request, 1..=50.
///
/// The dictionary index range is partitioned into contiguous slices, one
/// per worker, with the last worker absorbing the remainder. Workers share
/// an advisory early-stop flag checked between candidates; a worker already
/// inside a hash call finishes it first, so every attempted hash is counted,
/// including the matching one.
///
/// # Errors
///
/// Returns [`SaltmineError::WorkerJoin`] if a worker thread panicked; the
/// caller must treat that as fatal, since the call counts can no longer be
/// trusted.
pub fn run_crack(
    engine: &Arc<dyn CryptEngine>,
    dictionary: &Arc<Dictionary>,
    cipher: &str,
    salt: &Salt,
    requested_workers: u32,
) -> Result<CrackOutcome, SaltmineError> {
    let worker_count = effective_worker_count(requested_workers, dictionary.len());
    let increment = dictionary.len() / worker_count;
    let found = Arc::new(AtomicBool::new(false));

    debug!(
        "cracking {cipher} with {worker_count} worker(s) over {} words",
        dictionary.len()
    );

    let (report_tx, report_rx) = crossbeam_channel::bounded::<WorkerReport>(worker_count);
    let mut handles = Vec::with_capacity(worker_count);

    for index in 0..worker_count {
        let start = index * increment;
        let end = if index == worker_count - 1 {
            dictionary.len()
        } else {
            (index + 1) * increment
        };

        let engine = Arc::clone(engine);
        let dictionary = Arc::clone(dictionary);
        let cipher = cipher.to_string();
        let salt = salt.clone();
        let found = Arc::clone(&found);
        let report_tx = report_tx.clone();

        handles.push(thread::spawn(move || {
            let report = crack_range(&*engine, &dictionary, &cipher, &salt, start, end, &found);
            let _ = report_tx.send(report);
        }));
    }
    drop(report_tx);

    for handle in handles {
        handle.join().map_err(|_| SaltmineError::WorkerJoin)?;
    }

    let mut word = None;
    let mut worker_calls = Vec::with_capacity(worker_count);
    for report in report_rx.try_iter() {
        worker_calls.push(report.crypt_calls);
        if let Some(matched) = report.word {
            word = Some(matched);
        }
    }

    Ok(CrackOutcome { word, worker_calls })
}

/// One worker's search over `[start, end)`. Stops early once the shared
/// flag is raised; the flag is advisory, so a relaxed load is enough.
fn crack_range(
    engine: &dyn CryptEngine,
    dictionary: &Dictionary,
    cipher: &str,
    salt: &Salt,
    start: usize,
    end: usize,
    found: &AtomicBool,
) -> WorkerReport {
    let mut crypt_calls = 0u32;

    for index in start..end {
        if found.load(Ordering::Relaxed) {
            break;
        }
        let word = dictionary.word(index);
        crypt_calls += 1;
        if let Ok(hash) = engine.hash(word, salt) {
            if hash == cipher {
                found.store(true, Ordering::Relaxed);
                return WorkerReport {
                    word: Some(word.to_string()),
                    crypt_calls,
                };
            }
        }
    }

    WorkerReport {
        word: None,
        crypt_calls,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Deterministic stand-in for the crypt primitive: a salt prefix
    /// followed by an FNV-1a fold of the word and salt, padded to the
    /// cipher length.
    struct FakeCrypt;

    fn fake_hash(word: &str, salt: &Salt) -> String {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in salt.as_str().bytes().chain(word.bytes()) {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }
        format!("{}{:011}", salt.as_str(), state % 100_000_000_000)
    }

    impl CryptEngine for FakeCrypt {
        fn hash(&self, word: &str, salt: &Salt) -> Result<String, SaltmineError> {
            Ok(fake_hash(word, salt))
        }
    }

    fn test_dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::from_words(["hello", "world", "abc"]).unwrap())
    }

    fn engine() -> Arc<dyn CryptEngine> {
        Arc::new(FakeCrypt)
    }

    #[test]
    fn single_worker_finds_a_word() {
        let dictionary = test_dictionary();
        let engine = engine();
        let salt = Salt::parse("ab").unwrap();
        let cipher = fake_hash("hello", &salt);

        let outcome = run_crack(&engine, &dictionary, &cipher, &salt, 1).unwrap();
        assert_eq!(outcome.word.as_deref(), Some("hello"));
        assert_eq!(outcome.worker_calls.len(), 1);
        // "hello" is the first word, so exactly one call was needed
        assert_eq!(outcome.worker_calls[0], 1);
    }

    #[test]
    fn worker_count_collapses_when_larger_than_dictionary() {
        assert_eq!(effective_worker_count(1, 100), 1);
        assert_eq!(effective_worker_count(4, 3), 1);
        assert_eq!(effective_worker_count(4, 4), 4);
        assert_eq!(effective_worker_count(50, 1000), 50);
    }

    #[test]
    fn result_is_invariant_over_worker_counts() {
        let dictionary = Arc::new(
            Dictionary::from_words((0..100).map(|i| format!("w{i:03}"))).unwrap(),
        );
        let engine = engine();
        let salt = Salt::parse("xy").unwrap();
        let cipher = fake_hash("w042", &salt);

        for workers in [1, 2, 3, 7, 50] {
            let outcome = run_crack(&engine, &dictionary, &cipher, &salt, workers).unwrap();
            assert_eq!(outcome.word.as_deref(), Some("w042"), "workers = {workers}");
        }
    }

    #[test]
    fn miss_exhausts_the_dictionary_and_counts_every_call() {
        let dictionary = test_dictionary();
        let engine = engine();
        let salt = Salt::parse("ab").unwrap();
        let cipher = fake_hash("nope", &salt);

        for workers in [1, 2] {
            let outcome = run_crack(&engine, &dictionary, &cipher, &salt, workers).unwrap();
            assert_eq!(outcome.word, None, "workers = {workers}");
            let total: u32 = outcome.worker_calls.iter().sum();
            assert_eq!(total, dictionary.len() as u32, "workers = {workers}");
        }
    }

    #[test]
    fn partition_covers_remainder_entries() {
        // 7 words over 3 workers: ranges [0,2) [2,4) [4,7)
        let dictionary = Arc::new(
            Dictionary::from_words(["a", "b", "c", "d", "e", "f", "target"]).unwrap(),
        );
        let engine = engine();
        let salt = Salt::parse("zz").unwrap();
        let cipher = fake_hash("target", &salt);

        let outcome = run_crack(&engine, &dictionary, &cipher, &salt, 3).unwrap();
        assert_eq!(outcome.word.as_deref(), Some("target"));
        assert_eq!(outcome.worker_calls.len(), 3);
    }

    #[test]
    fn duplicate_words_stay_crackable() {
        let dictionary = Arc::new(Dictionary::from_words(["dup", "dup"]).unwrap());
        let engine = engine();
        let salt = Salt::parse("ab").unwrap();
        let cipher = fake_hash("dup", &salt);

        let outcome = run_crack(&engine, &dictionary, &cipher, &salt, 2).unwrap();
        assert_eq!(outcome.word.as_deref(), Some("dup"));
    }
}
