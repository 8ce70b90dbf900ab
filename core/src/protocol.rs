//! The line protocol spoken between crackclient and crackserver.
//!
//! Commands are newline-terminated, split on single spaces into at most
//! [`MAX_FIELDS`] fields. Responses are single lines; the two sentinel
//! responses start with `:`, which is outside the salt alphabet, so they
//! can never collide with a cipher text.

use crate::crypt::Salt;

/// Response to any command that fails validation.
pub const INVALID: &str = ":invalid";

/// Response to a well-formed crack request that matched no dictionary word.
pub const FAILED: &str = ":failed";

/// A command line is split into at most this many space-separated fields.
pub const MAX_FIELDS: usize = 3;

/// Lowest accepted crack worker count.
pub const MIN_CRACK_WORKERS: u32 = 1;

/// Highest accepted crack worker count.
pub const MAX_CRACK_WORKERS: u32 = 50;

/// A validated client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `crypt TEXT SALT` — hash TEXT under SALT.
    Crypt { text: String, salt: Salt },
    /// `crack CIPHER N` — search the dictionary for CIPHER's plaintext
    /// using N workers. The salt is the validated prefix of CIPHER.
    Crack {
        cipher: String,
        salt: Salt,
        workers: u32,
    },
}

impl Request {
    /// Parses one command line. `None` means the command is malformed and
    /// the server must reply [`INVALID`].
    pub fn parse(line: &str) -> Option<Request> {
        let mut fields = line.splitn(MAX_FIELDS, ' ');
        let command = fields.next()?;
        match command {
            "crypt" => {
                let text = fields.next()?;
                let salt = Salt::parse(fields.next()?)?;
                Some(Request::Crypt {
                    text: text.to_string(),
                    salt,
                })
            }
            "crack" => {
                let cipher = fields.next()?;
                let workers = parse_worker_count(fields.next()?)?;
                let salt = Salt::from_cipher(cipher)?;
                Some(Request::Crack {
                    cipher: cipher.to_string(),
                    salt,
                    workers,
                })
            }
            _ => None,
        }
    }
}

/// Strict decimal worker count: 1..=50, at most two digits.
fn parse_worker_count(field: &str) -> Option<u32> {
    if field.len() > 2 {
        return None;
    }
    let workers = field.parse::<u32>().ok()?;
    if !(MIN_CRACK_WORKERS..=MAX_CRACK_WORKERS).contains(&workers) {
        return None;
    }
    Some(workers)
}
