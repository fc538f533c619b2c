//! Syslog sink for `tracing-subscriber`
//!
//! Each formatted event becomes one datagram on the local syslog socket in
//! the BSD format `<PRI>TAG[PID]: MESSAGE`, user facility.

use std::io::{self, Write};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Local syslog socket
pub const SYSLOG_SOCKET: &str = "/dev/log";

/// `LOG_USER`
const FACILITY_USER: u8 = 1;

/// Writer factory handing out one buffered line per event
///
/// A send that fails (syslogd restarted and re-created its socket) reconnects
/// to the same path and retries once.
#[derive(Debug, Clone)]
pub struct Syslog {
    path: PathBuf,
    socket: Arc<Mutex<UnixDatagram>>,
    tag: String,
}

fn open(path: &Path) -> io::Result<UnixDatagram> {
    let socket = UnixDatagram::unbound()?;
    socket.connect(path)?;
    Ok(socket)
}

impl Syslog {
    /// Connect to the syslog socket at `path`
    pub fn connect(path: impl AsRef<Path>, tag: &str) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let socket = open(&path)?;
        Ok(Self {
            path,
            socket: Arc::new(Mutex::new(socket)),
            tag: format!("{}[{}]", tag, std::process::id()),
        })
    }

    fn send(&self, datagram: &[u8]) -> io::Result<()> {
        let mut socket = self.socket.lock().unwrap_or_else(|e| e.into_inner());
        if socket.send(datagram).is_ok() {
            return Ok(());
        }
        *socket = open(&self.path)?;
        socket.send(datagram).map(|_| ())
    }
}

/// syslog severity for a tracing level
fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

fn priority(level: &Level) -> u8 {
    FACILITY_USER * 8 + severity(level)
}

/// One event's bytes, sent when dropped
pub struct SyslogLine<'a> {
    syslog: &'a Syslog,
    priority: u8,
    buf: Vec<u8>,
}

impl SyslogLine<'_> {
    fn datagram(&self) -> Vec<u8> {
        let body = String::from_utf8_lossy(&self.buf);
        format!("<{}>{}: {}", self.priority, self.syslog.tag, body.trim_end()).into_bytes()
    }
}

impl Write for SyslogLine<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogLine<'_> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        // Nowhere left to report a failed log write
        let _ = self.syslog.send(&self.datagram());
    }
}

impl<'a> MakeWriter<'a> for Syslog {
    type Writer = SyslogLine<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SyslogLine {
            syslog: self,
            priority: priority(&Level::INFO),
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SyslogLine {
            syslog: self,
            priority: priority(meta.level()),
            buf: Vec::new(),
        }
    }
}
