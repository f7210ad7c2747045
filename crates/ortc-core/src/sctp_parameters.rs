//! SCTP capability and parameter types for data channels.

use serde::{Deserialize, Serialize};

/// Number of SCTP streams the local stack supports.
pub const SCTP_NUM_STREAMS: NumSctpStreams = NumSctpStreams { os: 1024, mis: 1024 };

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumSctpStreams {
    /// Initially requested outgoing streams.
    #[serde(rename = "OS", default)]
    pub os: u16,
    /// Maximum incoming streams.
    #[serde(rename = "MIS", default)]
    pub mis: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SctpCapabilities {
    pub num_streams: NumSctpStreams,
}

/// SCTP association parameters announced by the server for a transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SctpParameters {
    #[serde(default)]
    pub port: u16,
    #[serde(rename = "OS", default)]
    pub os: u16,
    #[serde(rename = "MIS", default)]
    pub mis: u16,
    #[serde(default)]
    pub max_message_size: u32,
}

/// Per data channel stream settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SctpStreamParameters {
    pub stream_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_packet_life_time: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retransmits: Option<u16>,
}

impl SctpStreamParameters {
    /// Effective ordering; validated parameters always carry a value.
    pub fn is_ordered(&self) -> bool {
        self.ordered.unwrap_or(true)
    }
}
