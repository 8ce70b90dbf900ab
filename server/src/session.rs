//! One session handler per accepted connection: read a command line,
//! dispatch, write the response, repeat until the peer goes away.

use std::sync::Arc;

use log::{debug, error};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::OwnedSemaphorePermit;
use tokio::task;

use saltmine_core::crack::run_crack;
use saltmine_core::crypt::CryptEngine;
use saltmine_core::dictionary::Dictionary;
use saltmine_core::protocol::{FAILED, INVALID, Request};

use crate::stats::Stats;

/// Drives one client session to completion.
///
/// # Arguments
///
/// * `stream` - The accepted connection; any async byte stream works, so
///   tests can drive a session over an in-memory pipe.
/// * `dictionary` - The shared read-only word list.
/// * `engine` - The crypt primitive.
/// * `stats` - The shared statistics registry.
/// * `_permit` - The admission slot this session occupies.
///
/// Requests are processed strictly in order; responses pair 1:1 with the
/// lines read. The session ends on peer EOF, a read error, or a
/// write/flush error; on every exit path the connection counters move
/// exactly once and the admission permit held by `_permit` is released by
/// its drop.
pub async fn handle_session<S>(
    stream: S,
    dictionary: Arc<Dictionary>,
    engine: Arc<dyn CryptEngine>,
    stats: Arc<Stats>,
    _permit: OwnedSemaphorePermit,
) where
    S: AsyncRead + AsyncWrite,
{
    stats.on_connect();

    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                debug!("session read error: {err}");
                break;
            }
        };

        let response = dispatch(&line, &dictionary, &engine, &stats).await;

        if let Err(err) = writer.write_all(format!("{response}\n").as_bytes()).await {
            debug!("session write error: {err}");
            break;
        }
        if let Err(err) = writer.flush().await {
            debug!("session flush error: {err}");
            break;
        }
    }

    stats.on_disconnect();
}

/// Validates and executes one command line, returning the response line.
///
/// The request counters advance only for commands that pass validation,
/// and before any work is dispatched, so a snapshot can never show more
/// completed cracks than crack requests.
async fn dispatch(
    line: &str,
    dictionary: &Arc<Dictionary>,
    engine: &Arc<dyn CryptEngine>,
    stats: &Arc<Stats>,
) -> String {
    match Request::parse(line) {
        Some(Request::Crypt { text, salt }) => {
            stats.on_crypt_request();
            match engine.hash(&text, &salt) {
                Ok(cipher) => {
                    stats.add_crypt_calls(1);
                    cipher
                }
                Err(err) => {
                    error!("crypt primitive rejected a validated salt: {err}");
                    INVALID.to_string()
                }
            }
        }
        Some(Request::Crack {
            cipher,
            salt,
            workers,
        }) => {
            stats.on_crack_request();

            let engine = Arc::clone(engine);
            let dictionary = Arc::clone(dictionary);
            let outcome = task::spawn_blocking(move || {
                run_crack(&engine, &dictionary, &cipher, &salt, workers)
            })
            .await;

            let outcome = match outcome {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    // a lost worker leaves the call counts wrong; don't lie
                    error!("crack worker failure: {err}");
                    std::process::abort();
                }
                Err(err) => {
                    error!("crack task failure: {err}");
                    std::process::abort();
                }
            };

            for worker_calls in &outcome.worker_calls {
                stats.add_crypt_calls(*worker_calls);
            }

            match outcome.word {
                Some(word) => {
                    stats.on_crack_success();
                    word
                }
                None => {
                    stats.on_crack_fail();
                    FAILED.to_string()
                }
            }
        }
        None => INVALID.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::admission::ConnectionGate;
    use saltmine_core::SaltmineError;
    use saltmine_core::crypt::Salt;
    use tokio::io::{AsyncReadExt, duplex};

    /// Deterministic stand-in for the crypt primitive.
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

    struct SessionFixture {
        dictionary: Arc<Dictionary>,
        engine: Arc<dyn CryptEngine>,
        stats: Arc<Stats>,
    }

    fn fixture() -> SessionFixture {
        SessionFixture {
            dictionary: Arc::new(Dictionary::from_words(["hello", "world", "abc"]).unwrap()),
            engine: Arc::new(FakeCrypt),
            stats: Arc::new(Stats::new()),
        }
    }

    /// Feeds `input` to a session over an in-memory duplex pipe and
    /// collects everything the session writes back.
    async fn drive_session(fix: &SessionFixture, input: &str) -> String {
        let (client, server) = duplex(4096);
        let gate = ConnectionGate::new(1);
        let permit = gate.acquire().await.unwrap();

        let session = tokio::spawn(handle_session(
            server,
            Arc::clone(&fix.dictionary),
            Arc::clone(&fix.engine),
            Arc::clone(&fix.stats),
            permit,
        ));

        let (mut read_half, mut write_half) = tokio::io::split(client);
        write_half.write_all(input.as_bytes()).await.unwrap();
        write_half.shutdown().await.unwrap();

        let mut output = String::new();
        read_half.read_to_string(&mut output).await.unwrap();
        session.await.unwrap();
        output
    }

    #[tokio::test]
    async fn crypt_command_round_trips() {
        let fix = fixture();
        let salt = Salt::parse("ab").unwrap();
        let output = drive_session(&fix, "crypt hello ab\n").await;

        assert_eq!(output, format!("{}\n", fake_hash("hello", &salt)));
        let snapshot = fix.stats.snapshot();
        assert_eq!(snapshot.crypts, 1);
        assert_eq!(snapshot.crypt_calls, 1);
    }

    #[tokio::test]
    async fn crack_command_recovers_the_plaintext() {
        let fix = fixture();
        let salt = Salt::parse("ab").unwrap();
        let cipher = fake_hash("world", &salt);

        let output = drive_session(&fix, &format!("crack {cipher} 2\n")).await;

        assert_eq!(output, "world\n");
        let snapshot = fix.stats.snapshot();
        assert_eq!(snapshot.cracks, 1);
        assert_eq!(snapshot.success_cracks, 1);
        assert_eq!(snapshot.failed_cracks, 0);
    }

    #[tokio::test]
    async fn crack_miss_reports_failed_and_counts_every_call() {
        let fix = fixture();
        let salt = Salt::parse("ab").unwrap();
        let cipher = fake_hash("missing", &salt);

        let output = drive_session(&fix, &format!("crack {cipher} 1\n")).await;

        assert_eq!(output, ":failed\n");
        let snapshot = fix.stats.snapshot();
        assert_eq!(snapshot.failed_cracks, 1);
        assert_eq!(snapshot.crypt_calls, fix.dictionary.len() as u32);
    }

    #[tokio::test]
    async fn malformed_commands_get_invalid_without_touching_counters() {
        let fix = fixture();
        let output = drive_session(
            &fix,
            "nonsense\ncrypt hello !!\ncrack short 1\ncrack ab12345678901 0\n\n",
        )
        .await;

        assert_eq!(output, ":invalid\n:invalid\n:invalid\n:invalid\n:invalid\n");
        let snapshot = fix.stats.snapshot();
        assert_eq!(snapshot.cracks, 0);
        assert_eq!(snapshot.crypts, 0);
        assert_eq!(snapshot.crypt_calls, 0);
    }

    #[tokio::test]
    async fn responses_come_back_in_request_order() {
        let fix = fixture();
        let salt = Salt::parse("ab").unwrap();
        let cipher = fake_hash("abc", &salt);

        let input = format!("crypt abc ab\nbogus\ncrack {cipher} 3\n");
        let output = drive_session(&fix, &input).await;

        let expected = format!("{cipher}\n:invalid\nabc\n");
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn eof_completes_the_session_and_frees_the_permit() {
        let fix = fixture();
        let gate = ConnectionGate::new(1);
        let permit = gate.acquire().await.unwrap();
        let (client, server) = duplex(64);

        let session = tokio::spawn(handle_session(
            server,
            Arc::clone(&fix.dictionary),
            Arc::clone(&fix.engine),
            Arc::clone(&fix.stats),
            permit,
        ));

        drop(client);
        session.await.unwrap();

        let snapshot = fix.stats.snapshot();
        assert_eq!(snapshot.connected, 0);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(gate.available(), 1);
    }
}
