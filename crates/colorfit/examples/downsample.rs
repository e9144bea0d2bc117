//! Copy standard input to standard output, fitting colors to the terminal.
//!
//! The optional argument overrides the rank resolved from the environment,
//! e.g., `cargo run --example downsample -- 16 < styled.txt`. Set `RUST_LOG`
//! to `colorfit=debug` to see how the rank was resolved.

use std::io::{self, ErrorKind, Read, Write};

use colorfit::{Rank, Transcoder};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let stdout = io::stdout();
    let rank = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<Rank>()
            .map_err(|err| io::Error::new(ErrorKind::InvalidInput, err))?,
        None => Rank::for_stream(&stdout),
    };
    info!(%rank, "downsampling standard input");

    let mut transcoder = Transcoder::new(stdout.lock(), rank);
    let mut stdin = io::stdin().lock();
    let mut buffer = [0; 4_096];

    loop {
        let count = match stdin.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        transcoder.write_all(&buffer[..count])?;
    }

    transcoder.finish()?;
    Ok(())
}
