//! Client configuration.
//!
//! - [`ClientConfig`] - what a [`RoomClient`](crate::room::RoomClient) does after joining
//! - [`SignalingConfig`] - protoo peer timeouts and buffering
//! - [`ProducerCodecOptions`] - per-produce tweaks written into the SDP answer
//!
//! ```rust
//! use ortc_client_core::config::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .with_display_name("alice")
//!     .with_consume(false)
//!     .with_request_timeout_ms(5_000);
//!
//! assert_eq!(config.display_name, "alice");
//! assert!(config.produce);
//! assert!(!config.consume);
//! assert_eq!(config.request_timeout().as_millis(), 5_000);
//! ```

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identification sent to the server in the `join` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub flag: String,
    pub name: String,
    pub version: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            flag: "rust".to_string(),
            name: "ortc-client".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name shown to other peers
    pub display_name: String,
    /// Create a send transport on join
    pub produce: bool,
    /// Create a receive transport on join
    pub consume: bool,
    /// Ask the server for TCP-only ICE candidates
    pub force_tcp: bool,
    /// Negotiate an SCTP association and open the chat data producer
    pub enable_data_channels: bool,
    /// Signaling request timeout in milliseconds
    pub request_timeout_ms: u64,
    pub device: DeviceInfo,
}

impl ClientConfig {
    /// Defaults: produce and consume enabled, data channels enabled, UDP
    /// allowed, 15 second request timeout and a random 8 character display name.
    pub fn new() -> Self {
        Self {
            display_name: random_display_name(),
            produce: true,
            consume: true,
            force_tcp: false,
            enable_data_channels: true,
            request_timeout_ms: 15_000,
            device: DeviceInfo::default(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_produce(mut self, produce: bool) -> Self {
        self.produce = produce;
        self
    }

    pub fn with_consume(mut self, consume: bool) -> Self {
        self.consume = consume;
        self
    }

    pub fn with_force_tcp(mut self, force_tcp: bool) -> Self {
        self.force_tcp = force_tcp;
        self
    }

    pub fn with_data_channels(mut self, enabled: bool) -> Self {
        self.enable_data_channels = enabled;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn random_display_name() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// Protoo peer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalingConfig {
    /// How long a request waits for its response
    pub request_timeout_ms: u64,
    /// Capacity of the outbound message channel
    pub outbound_capacity: usize,
}

impl SignalingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self { request_timeout_ms: 15_000, outbound_capacity: 64 }
    }
}

impl From<&ClientConfig> for SignalingConfig {
    fn from(config: &ClientConfig) -> Self {
        Self { request_timeout_ms: config.request_timeout_ms, ..Self::default() }
    }
}

/// Codec tweaks applied to the answer's fmtp lines for one producer.
///
/// `None` leaves the negotiated value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerCodecOptions {
    pub opus_stereo: Option<bool>,
    pub opus_fec: Option<bool>,
    pub opus_dtx: Option<bool>,
    pub opus_max_playback_rate: Option<u32>,
    pub opus_max_average_bitrate: Option<u32>,
    pub opus_ptime: Option<u32>,
    /// Keep generic NACK feedback for opus in the answer
    pub opus_nack: Option<bool>,
    pub video_google_start_bitrate: Option<u32>,
    pub video_google_max_bitrate: Option<u32>,
    pub video_google_min_bitrate: Option<u32>,
}
