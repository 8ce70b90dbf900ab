use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::ClientError;

/// Opens the command source: the named job file, or stdin when no file
/// was given.
///
/// # Errors
///
/// Returns [`ClientError::JobFileOpen`] if the job file cannot be read.
pub fn open_job_source(job_file: Option<&Path>) -> Result<Box<dyn BufRead>, ClientError> {
    match job_file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|_| ClientError::JobFileOpen(path.display().to_string()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Blank lines and lines starting with `#` are client-side comments and
/// are never transmitted.
pub fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blanks_are_skipped() {
        assert!(is_comment(""));
        assert!(is_comment("#"));
        assert!(is_comment("# crack later"));
        assert!(!is_comment("crypt hello ab"));
        assert!(!is_comment(" # indented is not a comment"));
    }

    #[test]
    fn missing_job_file_is_a_typed_error() {
        let err = match open_job_source(Some(Path::new("/no/such/jobfile"))) {
            Err(e) => e,
            Ok(_) => panic!("expected an error opening a missing job file"),
        };
        assert!(matches!(err, ClientError::JobFileOpen(_)));
        assert_eq!(err.to_string(), "unable to open job file \"/no/such/jobfile\"");
    }
}
