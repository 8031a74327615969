use std::io::{self, Read};

use tracing_subscriber::EnvFilter;

/// Run with `RUST_LOG=multimime=debug` and the `tracing-recover` /
/// `tracing-discard` features to see what the walker tolerated or skipped.
pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input).unwrap();

    match multimime::get_all_parts(&input[..]) {
        Ok(parts) => {
            for part in &parts {
                println!("{} ({} bytes)", part.media_type(), part.content().len());
            }
        }
        Err(err) => {
            for part in &err.parts {
                println!("{} ({} bytes)", part.media_type(), part.content().len());
            }
            eprintln!("error: {}", err.error);
        }
    }
}
