#![deny(clippy::unwrap_used, clippy::expect_used)]
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::info;

use saltmine_core::SaltmineError;
use saltmine_core::crypt::DesCrypt;
use saltmine_core::dictionary::Dictionary;
use saltmine_server::ServerError;
use saltmine_server::server::Server;

const USAGE: &str =
    "Usage: crackserver [--maxconn connections] [--port portnum] [--dictionary filename]";

#[derive(Debug, Parser)]
#[command(name = "crackserver")]
struct ServerArgs {
    /// Maximum simultaneous client connections; 0 means unbounded
    #[arg(long, default_value_t = 0)]
    maxconn: u32,

    /// Listening port: 0 for an ephemeral port, otherwise 1024..=65535
    #[arg(long, value_parser = port_in_range, default_value_t = 0)]
    port: u16,

    /// Plain text word list, one candidate per line
    #[arg(long, default_value = "/usr/share/dict/words")]
    dictionary: PathBuf,
}

fn port_in_range(val: &str) -> Result<u16, String> {
    match val.parse::<u16>() {
        Ok(0) => Ok(0),
        Ok(port) if port >= 1024 => Ok(port),
        Ok(port) => Err(format!("port {port} is below 1024")),
        Err(e) => Err(format!("invalid port number: {e}")),
    }
}

fn usage_exit() -> ! {
    eprintln!("{USAGE}");
    process::exit(1);
}

fn main() {
    env_logger::init();

    let args = match ServerArgs::try_parse() {
        Ok(args) => args,
        Err(_) => usage_exit(),
    };

    let dictionary = match Dictionary::load(&args.dictionary) {
        Ok(dictionary) => Arc::new(dictionary),
        Err(err @ SaltmineError::DictionaryOpen(_)) => {
            eprintln!("crackserver: {err}");
            process::exit(2);
        }
        Err(err) => {
            eprintln!("crackserver: {err}");
            process::exit(3);
        }
    };
    info!(
        "dictionary {} holds {} candidate words",
        args.dictionary.display(),
        dictionary.len()
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("crackserver: failed to start runtime: {err}");
            process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let server = match Server::bind(args.port, args.maxconn, dictionary, Arc::new(DesCrypt)).await
        {
            Ok(server) => server,
            Err(err) => {
                eprintln!("crackserver: {err}");
                process::exit(4);
            }
        };

        match server.local_port() {
            // tests parse this line, so it bypasses the logger
            Ok(port) => eprintln!("{port}"),
            Err(err) => {
                eprintln!("crackserver: {err}");
                process::exit(4);
            }
        }

        server.run().await
    });

    if let Err(err) = result {
        match err {
            ServerError::Listen(_) => {
                eprintln!("crackserver: {err}");
                process::exit(4);
            }
            err => {
                eprintln!("crackserver: {err}");
                process::exit(1);
            }
        }
    }
}
