use std::io::Read;
use std::thread;
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort, SerialPortType};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("serial read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte-stream source of telemetry lines.
///
/// `poll_line` must never block waiting for the device: when no complete
/// line has arrived it returns `Ok(None)` and the caller tries again on the
/// next tick.
pub trait Transport {
    fn poll_line(&mut self) -> Result<Option<String>, TransportError>;
}

/// Serial connection to the sensor board.
///
/// Opened with DTR and RTS deasserted so that attaching to the port does not
/// reset the microcontroller, and flushed on drop so shutdown leaves no
/// bytes buffered whichever way the render loop ended.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    pending: Vec<u8>,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud: u32) -> Result<Self, TransportError> {
        let mut port = serialport::new(port_name, baud)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|source| TransportError::Open {
                port: port_name.to_string(),
                source,
            })?;

        // Keep the control lines low; toggling them reboots the board.
        port.write_data_terminal_ready(false)?;
        port.write_request_to_send(false)?;

        // Let the device settle, then drop anything that was buffered
        // before we attached.
        thread::sleep(Duration::from_millis(500));
        port.clear(ClearBuffer::All)?;

        info!(port = port_name, baud, "serial connection established");
        Ok(SerialTransport {
            port,
            pending: Vec::new(),
        })
    }
}

impl Transport for SerialTransport {
    fn poll_line(&mut self) -> Result<Option<String>, TransportError> {
        // Only pull bytes the driver already holds, never wait for more.
        let available = self.port.bytes_to_read()? as usize;
        if available > 0 {
            let mut chunk = vec![0u8; available];
            let n = self.port.read(&mut chunk)?;
            self.pending.extend_from_slice(&chunk[..n]);
        }

        let Some(newline) = self.pending.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        let raw: Vec<u8> = self.pending.drain(..=newline).collect();

        // Non-text bytes get the malformed-line treatment: skip and move on.
        match String::from_utf8(raw) {
            Ok(line) => Ok(Some(
                line.trim_end_matches(|c| c == '\r' || c == '\n').to_string(),
            )),
            Err(_) => {
                debug!("dropped undecodable serial line");
                Ok(None)
            }
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        // Runs on interrupted exit as well as normal shutdown: discard
        // buffered bytes and close without touching the control lines.
        let _ = self.port.clear(ClearBuffer::All);
        info!("serial connection closed");
    }
}

/// Human-readable description of a detected port.
fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .clone()
            .unwrap_or_else(|| "USB serial device".to_string()),
        SerialPortType::BluetoothPort => "Bluetooth serial port".to_string(),
        SerialPortType::PciPort => "PCI serial port".to_string(),
        SerialPortType::Unknown => "unknown device".to_string(),
    }
}

/// Prints every detected serial port with its description, for the operator
/// to pick an alternative when the configured port cannot be opened.
pub fn print_available_ports() {
    match serialport::available_ports() {
        Ok(ports) if !ports.is_empty() => {
            eprintln!("Detected serial ports:");
            let mut ports = ports;
            ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));
            for port in ports {
                eprintln!("  {}: {}", port.port_name, describe(&port.port_type));
            }
        }
        Ok(_) => eprintln!("No serial ports detected."),
        Err(err) => eprintln!("Could not enumerate serial ports: {err}"),
    }
}

/// Picks the first port that looks like the sensor board, matching the
/// usual Arduino/ESP32 USB bridge descriptions.
pub fn find_sensor_port() -> Option<String> {
    let ports = serialport::available_ports().ok()?;
    ports.into_iter().find_map(|port| match &port.port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("");
            if product.contains("Arduino") || product.contains("CH340") || product.contains("USB")
            {
                Some(port.port_name)
            } else {
                None
            }
        }
        _ => None,
    })
}
