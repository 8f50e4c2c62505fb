use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::OnceLock;

use tracing::Level;

use crate::constants::LOG_FILE_ENV;

static LOG_FILE: OnceLock<Option<File>> = OnceLock::new();

/// The file named by `TERMWIN_LOG`, opened for append on first use.
fn log_file() -> Option<&'static File> {
    LOG_FILE
        .get_or_init(|| {
            let path = std::env::var_os(LOG_FILE_ENV)?;
            OpenOptions::new().create(true).append(true).open(path).ok()
        })
        .as_ref()
}

/// Where log lines go while a session owns the screen. Stdout and stderr are
/// part of the composited display, so the only choices are a file or nothing.
pub enum DelegatingWriter {
    File(&'static File),
    Sink(io::Sink),
}

impl DelegatingWriter {
    fn new() -> Self {
        log_file().map_or_else(|| DelegatingWriter::Sink(io::sink()), DelegatingWriter::File)
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            DelegatingWriter::File(file) => file.write(buf),
            DelegatingWriter::Sink(sink) => sink.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            DelegatingWriter::File(file) => file.flush(),
            DelegatingWriter::Sink(sink) => sink.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new()
    }
}

/// Install a tracing subscriber writing to the file named by `TERMWIN_LOG`,
/// or discarding output when it is unset. Safe to call multiple times;
/// subsequent calls are no-ops for the global subscriber.
pub fn init_default() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(SubscriberMakeWriter)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}
