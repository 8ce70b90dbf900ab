//! The request/response dialogue with the server: one command line out,
//! exactly one response line back.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use log::debug;

use saltmine_core::protocol::{FAILED, INVALID};

use crate::ClientError;
use crate::job::is_comment;

/// Connects to the server on localhost. The port is kept as the string
/// the user typed, so an unparseable port surfaces as a connection
/// failure naming it.
///
/// # Errors
///
/// Returns [`ClientError::Connect`] if the connection cannot be made.
pub fn connect(port: &str) -> Result<TcpStream, ClientError> {
    TcpStream::connect(format!("localhost:{port}"))
        .map_err(|_| ClientError::Connect(port.to_string()))
}

/// Translates one server response line for the user.
pub fn translate_response(response: &str) -> &str {
    match response {
        INVALID => "Error in command",
        FAILED => "Unable to decrypt",
        other => other,
    }
}

/// Runs the whole dialogue: read commands from `commands`, skip comments,
/// send each survivor, read one response, print its translation to `out`.
/// Ends successfully at end of input.
///
/// # Arguments
///
/// * `commands` - The job file or stdin, one command per line.
/// * `stream` - The established server connection.
/// * `out` - Where translated responses are printed (stdout in the binary).
///
/// # Errors
///
/// Returns [`ClientError::Terminated`] if the server closes the
/// connection (or the socket errors) while a response is outstanding.
pub fn run_dialogue<R, W>(commands: R, stream: TcpStream, out: &mut W) -> Result<(), ClientError>
where
    R: BufRead,
    W: Write,
{
    let mut server_in = BufReader::new(stream.try_clone().map_err(|_| ClientError::Terminated)?);
    let mut server_out = stream;

    for line in commands.lines() {
        let Ok(line) = line else { break };
        if is_comment(&line) {
            continue;
        }
        debug!("sending command: {line}");

        server_out
            .write_all(format!("{line}\n").as_bytes())
            .and_then(|()| server_out.flush())
            .map_err(|_| ClientError::Terminated)?;

        let mut response = String::new();
        let read = server_in
            .read_line(&mut response)
            .map_err(|_| ClientError::Terminated)?;
        if read == 0 {
            return Err(ClientError::Terminated);
        }

        let response = response.trim_end_matches('\n');
        writeln!(out, "{}", translate_response(response)).map_err(|_| ClientError::Terminated)?;
    }

    Ok(())
}
