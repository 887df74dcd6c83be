use druid::Data;

/// Application state
#[derive(Clone, Data)]
pub struct AppState {
    /// Name of the serial port the session is attached to
    pub port: String,
    /// Enable debug mode
    pub debug: bool,
    /// Polling paused
    pub paused: bool,
}
