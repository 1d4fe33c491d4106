//! Physical link to the unit.
//!
//! Every transaction opens the serial port, writes one request frame,
//! waits the settle interval, reads whatever the unit has answered and
//! closes the port again. Holding the port open across requests is not
//! done: the unit may drop off the line and a fresh open recovers.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::LinkError;

/// Upper bound on a single reply read.
pub const READ_BUFFER_LEN: usize = 256;

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// One request/reply exchange with the unit.
///
/// Implementations own the whole open → write → read → close cycle for a
/// single call; callers serialise calls.
pub trait Link: Send {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, LinkError>;
}

/// Where and how to reach the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path, e.g. `/dev/ttyUSB0`.
    pub port: String,
    pub baud_rate: u32,

    /// Delay between writing a request and reading the reply.
    pub settle: Duration,

    /// Bound on the read once the settle interval has passed.
    pub read_timeout: Duration,
}

impl SerialSettings {
    pub fn new(port: impl Into<String>) -> Self {
        SerialSettings {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle: DEFAULT_SETTLE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// [`Link`] over a local serial port (9600 8N1 by default).
#[derive(Debug, Clone)]
pub struct SerialLink {
    settings: SerialSettings,
}

impl SerialLink {
    pub fn new(settings: SerialSettings) -> Self {
        SerialLink { settings }
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

impl Link for SerialLink {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, LinkError> {
        let mut port = serialport::new(self.settings.port.as_str(), self.settings.baud_rate)
            .timeout(self.settings.read_timeout)
            .open()
            .map_err(|e| LinkError::Unavailable {
                port: self.settings.port.clone(),
                source: e.into(),
            })?;

        trace!(port = %self.settings.port, "serial port opened");

        // The port is closed when `port` drops, on every path out of here.
        transact(&mut *port, request, self.settings.settle)
    }
}

/// Write `request`, wait `settle`, then perform one bounded read.
///
/// The read bound comes from the port's own timeout.
pub fn transact<P>(port: &mut P, request: &[u8], settle: Duration) -> Result<Vec<u8>, LinkError>
where
    P: Read + Write + ?Sized,
{
    match port.write(request) {
        Ok(0) => return Err(LinkError::NothingWritten),
        Ok(n) if n < request.len() => {
            port.write_all(&request[n..]).map_err(LinkError::WriteFailed)?;
        }
        Ok(_) => {}
        Err(e) => return Err(LinkError::WriteFailed(e)),
    }
    port.flush().map_err(LinkError::WriteFailed)?;

    if !settle.is_zero() {
        thread::sleep(settle);
    }

    let mut buf = [0u8; READ_BUFFER_LEN];
    match port.read(&mut buf) {
        Ok(0) => Err(LinkError::NoResponse),
        Ok(n) => Ok(buf[..n].to_vec()),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => Err(LinkError::NoResponse),
        Err(e) => {
            debug!(error = %e, "reading response failed");
            Err(LinkError::NoResponse)
        }
    }
}
