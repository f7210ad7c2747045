//! Request and response payloads of the room protocol.

use crate::config::DeviceInfo;
use ortc_core::{
    DtlsParameters, MediaKind, RtpCapabilities, RtpParameters, SctpCapabilities, SctpStreamParameters,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebRtcTransportRequest {
    pub force_tcp: bool,
    pub producing: bool,
    pub consuming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sctp_capabilities: Option<SctpCapabilities>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectWebRtcTransportRequest {
    pub transport_id: String,
    pub dtls_parameters: DtlsParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartIceRequest {
    pub transport_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceMessage {
    pub transport_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
    #[serde(default)]
    pub app_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceDataMessage {
    pub transport_id: String,
    pub sctp_stream_parameters: SctpStreamParameters,
    pub label: String,
    pub protocol: String,
    #[serde(default)]
    pub app_data: Value,
}

/// `{ id }`, the answer to `produce` and `produceData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

/// Payload of `closeProducer`, `pauseProducer` and `resumeProducer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerIdRequest {
    pub producer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub display_name: String,
    pub device: DeviceInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtp_capabilities: Option<RtpCapabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sctp_capabilities: Option<SctpCapabilities>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub device: Option<DeviceInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinResponse {
    #[serde(default)]
    pub peers: Vec<PeerInfo>,
}

/// Server request asking this client to consume a producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConsumerRequest {
    pub peer_id: String,
    pub producer_id: String,
    pub id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
    #[serde(rename = "type", default)]
    pub consumer_type: String,
    #[serde(default)]
    pub app_data: Value,
    #[serde(default)]
    pub producer_paused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataConsumerRequest {
    #[serde(default)]
    pub peer_id: Option<String>,
    pub data_producer_id: String,
    pub id: String,
    pub sctp_stream_parameters: SctpStreamParameters,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub app_data: Value,
}

/// Payload of `consumerClosed`, `consumerPaused` and `consumerResumed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerIdNotification {
    pub consumer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerClosedNotification {
    pub peer_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_transport_request_shape() {
        let request = CreateWebRtcTransportRequest {
            force_tcp: false,
            producing: true,
            consuming: false,
            sctp_capabilities: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "forceTcp": false, "producing": true, "consuming": false })
        );
    }

    #[test]
    fn test_new_consumer_request_from_server() {
        let request: NewConsumerRequest = serde_json::from_value(json!({
            "peerId": "peer-1",
            "producerId": "producer-1",
            "id": "consumer-1",
            "kind": "audio",
            "rtpParameters": {
                "mid": "0",
                "codecs": [{ "mimeType": "audio/opus", "payloadType": 100, "clockRate": 48000, "channels": 2 }],
                "encodings": [{ "ssrc": 1111 }],
                "rtcp": { "cname": "remote" }
            },
            "type": "simple",
            "appData": { "source": "mic" },
            "producerPaused": false
        }))
        .unwrap();

        assert_eq!(request.kind, MediaKind::Audio);
        assert_eq!(request.consumer_type, "simple");
        assert_eq!(request.rtp_parameters.encodings[0].ssrc, Some(1111));
        assert_eq!(request.app_data["source"], "mic");
    }

    #[test]
    fn test_join_response_defaults() {
        let response: JoinResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.peers.is_empty());

        let response: JoinResponse =
            serde_json::from_value(json!({ "peers": [{ "id": "p1", "displayName": "bob" }] })).unwrap();
        assert_eq!(response.peers[0].display_name, "bob");
        assert_eq!(response.peers[0].device, None);
    }
}
