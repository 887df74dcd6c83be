use tracing::debug;

use crate::sample::{self, Sample};
use crate::transport::Transport;
use crate::window::SampleWindow;

/// The one live telemetry session: owns the transport and the sample
/// history, constructed once at startup and driven by the render timer.
pub struct Session {
    transport: Box<dyn Transport>,
    window: SampleWindow,
    frame_count: u64,
}

impl Session {
    pub fn new(transport: Box<dyn Transport>, capacity: usize) -> Self {
        Session {
            transport,
            window: SampleWindow::new(capacity),
            frame_count: 0,
        }
    }

    /// One poll step of the render tick: read at most one line, parse it,
    /// and append on success. Returns the new sample, if any.
    ///
    /// Everything that can go wrong here — no data yet, a banner line, a
    /// malformed line, a transient read error — is absorbed as `None`; the
    /// next tick simply tries again.
    pub fn poll(&mut self) -> Option<Sample> {
        let line = match self.transport.poll_line() {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(err) => {
                debug!(%err, "transport read failed, skipping tick");
                return None;
            }
        };

        let parsed = sample::parse(&line)?;
        self.window.push(&parsed);
        self.frame_count += 1;
        Some(parsed)
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Total samples received since startup, unbounded by the window.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
