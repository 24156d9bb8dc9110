//! Line sources for the question loop.

use std::io::{self, BufRead};
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;

/// Something the session can await question lines from. `Ok(None)` means
/// the input is closed. Waiting must be cancel safe.
pub trait LineSource {
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>>;
}

impl<R> LineSource for Lines<R>
where
    R: AsyncBufRead + Unpin,
{
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>> {
        Lines::next_line(self)
    }
}

impl LineSource for mpsc::Receiver<io::Result<String>> {
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>> {
        async move { self.recv().await.transpose() }
    }
}

/// Read `reader` line by line on a dedicated OS thread.
///
/// A blocked read on that thread never holds up runtime shutdown, so the
/// process can exit while the terminal is still waiting for input.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let spawned = std::thread::Builder::new()
        .name("question-input".into())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        });
    if let Err(error) = spawned {
        tracing::warn!("cannot start input reader: {error}");
    }
    rx
}

pub fn stdin_lines() -> mpsc::Receiver<io::Result<String>> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}
