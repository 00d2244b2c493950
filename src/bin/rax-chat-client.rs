//! RAX Chat Client
//!
//! Prints every line from the server and forwards stdin lines to it.
//! Typing `/quit` sends the command and exits.

use log::{debug, error, info};
use std::process;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

use rax_chat::ServerConfig;

const QUIT_COMMAND: &str = "/quit";

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(78);
        }
    };

    let addr = config.socket_addr();
    let stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to connect to {}: {}", addr, e);
            process::exit(1);
        }
    };
    info!("Connected to {}", addr);

    let (read_half, write_half) = stream.into_split();
    tokio::spawn(forward_input(write_half));

    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => println!("{}", line),
            Ok(None) => break,
            Err(e) => {
                debug!("Connection error: {}", e);
                break;
            }
        }
    }

    info!("Disconnected from {}", addr);
    // stdin is read on a blocking thread; exit instead of waiting on it
    process::exit(0);
}

async fn forward_input(mut writer: OwnedWriteHalf) {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match input.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to read input: {}", e);
                break;
            }
        };

        if let Err(e) = writer.write_all(format!("{}\n", line).as_bytes()).await {
            debug!("Failed to send: {}", e);
            break;
        }

        if line == QUIT_COMMAND {
            let _ = writer.shutdown().await;
            process::exit(0);
        }
    }

    let _ = writer.shutdown().await;
}
