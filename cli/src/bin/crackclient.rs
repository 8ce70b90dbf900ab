#![deny(clippy::unwrap_used, clippy::expect_used)]
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use saltmine_client::dialogue::{connect, run_dialogue};
use saltmine_client::job::open_job_source;

const USAGE: &str = "Usage: crackclient portnum [jobfile]";

#[derive(Debug, Parser)]
#[command(name = "crackclient")]
struct ClientArgs {
    /// Port the crackserver is listening on
    port: String,

    /// Commands to send, one per line; stdin when omitted
    jobfile: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = match ClientArgs::try_parse() {
        Ok(args) => args,
        Err(_) => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    // the job file must be readable before any connection is attempted
    let commands = match open_job_source(args.jobfile.as_deref()) {
        Ok(commands) => commands,
        Err(err) => {
            eprintln!("crackclient: {err}");
            process::exit(2);
        }
    };

    let stream = match connect(&args.port) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("crackclient: {err}");
            process::exit(3);
        }
    };

    let mut stdout = io::stdout();
    match run_dialogue(commands, stream, &mut stdout) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("crackclient: {err}");
            process::exit(4);
        }
    }
}
