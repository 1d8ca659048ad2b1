use std::time::Duration;

/// Connection parameters for [`crate::transport::TcpTransport::connect`].
///
/// Process-spawning and port-forwarding to an Android device are the
/// embedding application's concern; the core only ever dials a TCP
/// endpoint that already speaks JDWP (typically one end of an `adb
/// forward`).
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub host: String,
    pub port: u16,
    pub handshake_timeout: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        ConnectConfig {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl ConnectConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ConnectConfig {
            host: host.into(),
            port,
            ..Default::default()
        }
    }
}
