//! A participant in a server room.
//!
//! [`RoomClient`] runs the join sequence against the server and keeps the
//! resulting transports, producers and peers:
//!
//! 1. `getRouterRtpCapabilities` and [`Device::load`]
//! 2. `createWebRtcTransport` for sending and/or receiving
//! 3. `join` with the device's receive capabilities
//! 4. the `chat` data producer, when data channels are enabled
//!
//! Server-initiated frames (`newConsumer`, `peerClosed`, ...) are handed to
//! [`RoomClient::handle_request`] and [`RoomClient::handle_notification`] by
//! whoever reads the socket. Everything observable is published as a
//! [`RoomEvent`].

use crate::config::ClientConfig;
use crate::consumer::Consumer;
use crate::device::Device;
use crate::error::{ClientError, ClientResult};
use crate::events::{ConnectionState, ProduceDataRequest, ProduceRequest, TransportListener};
use crate::handler::HandlerFactory;
use crate::producer::{DataProducer, Producer};
use crate::signaling::{
    self, methods, ConnectWebRtcTransportRequest, ConsumerIdNotification, CreateWebRtcTransportRequest,
    IdResponse, JoinRequest, JoinResponse, NewConsumerRequest, NewDataConsumerRequest, PeerClosedNotification,
    PeerInfo, ProduceDataMessage, ProduceMessage, ProducerIdRequest, ProtooNotification, ProtooRequest,
    ProtooResponse, RestartIceRequest, SignalingChannel,
};
use crate::transport::{ConsumeDataOptions, ConsumeOptions, ProduceDataOptions, ProduceOptions, Transport};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::join_all;
use ortc_core::{DtlsParameters, IceParameters, RtpCapabilities};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 256;
const CHAT_LABEL: &str = "chat";

#[derive(Debug, Clone)]
pub enum RoomEvent {
    PeerJoined(PeerInfo),
    PeerLeft { peer_id: String },
    NewConsumer { peer_id: String, consumer: Arc<Consumer> },
    ConsumerClosed { consumer_id: String },
    TransportStateChanged { transport_id: String, state: ConnectionState },
    /// A notification this client does not interpret.
    Notification { method: String, data: Value },
}

/// Forwards transport callbacks to the server.
struct SignalingListener {
    signaling: Arc<dyn SignalingChannel>,
    events: broadcast::Sender<RoomEvent>,
}

#[async_trait]
impl TransportListener for SignalingListener {
    async fn on_connect(&self, transport_id: &str, dtls_parameters: DtlsParameters) -> ClientResult<()> {
        let _: Value = signaling::request(
            self.signaling.as_ref(),
            methods::CONNECT_WEBRTC_TRANSPORT,
            &ConnectWebRtcTransportRequest { transport_id: transport_id.to_string(), dtls_parameters },
        )
        .await?;
        Ok(())
    }

    async fn on_produce(&self, transport_id: &str, request: ProduceRequest) -> ClientResult<String> {
        let response: IdResponse = signaling::request(
            self.signaling.as_ref(),
            methods::PRODUCE,
            &ProduceMessage {
                transport_id: transport_id.to_string(),
                kind: request.kind,
                rtp_parameters: request.rtp_parameters,
                app_data: request.app_data,
            },
        )
        .await?;
        Ok(response.id)
    }

    async fn on_produce_data(&self, transport_id: &str, request: ProduceDataRequest) -> ClientResult<String> {
        let response: IdResponse = signaling::request(
            self.signaling.as_ref(),
            methods::PRODUCE_DATA,
            &ProduceDataMessage {
                transport_id: transport_id.to_string(),
                sctp_stream_parameters: request.sctp_stream_parameters,
                label: request.label,
                protocol: request.protocol,
                app_data: request.app_data,
            },
        )
        .await?;
        Ok(response.id)
    }

    async fn on_connection_state_change(&self, transport_id: &str, state: ConnectionState) {
        if state == ConnectionState::Failed {
            warn!(transport_id, "transport connection failed");
        }
        let _ = self.events.send(RoomEvent::TransportStateChanged { transport_id: transport_id.to_string(), state });
    }
}

pub struct RoomClient {
    config: ClientConfig,
    signaling: Arc<dyn SignalingChannel>,
    device: Device,
    listener: Arc<SignalingListener>,
    events: broadcast::Sender<RoomEvent>,
    send_transport: RwLock<Option<Arc<Transport>>>,
    recv_transport: RwLock<Option<Arc<Transport>>>,
    peers: DashMap<String, PeerInfo>,
    chat: Mutex<Option<Arc<DataProducer>>>,
    joined: AtomicBool,
    closed: AtomicBool,
}

impl RoomClient {
    pub fn new(config: ClientConfig, signaling: Arc<dyn SignalingChannel>, factory: Arc<dyn HandlerFactory>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let listener = Arc::new(SignalingListener { signaling: Arc::clone(&signaling), events: events.clone() });
        let device = Device::with_info(factory, config.device.clone());
        Self {
            config,
            signaling,
            device,
            listener,
            events,
            send_transport: RwLock::new(None),
            recv_transport: RwLock::new(None),
            peers: DashMap::new(),
            chat: Mutex::new(None),
            joined: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn send_transport(&self) -> Option<Arc<Transport>> {
        self.send_transport.read().clone()
    }

    pub fn recv_transport(&self) -> Option<Arc<Transport>> {
        self.recv_transport.read().clone()
    }

    pub fn peers(&self) -> Vec<PeerInfo> {
        self.peers.iter().map(|p| p.value().clone()).collect()
    }

    pub fn chat_data_producer(&self) -> Option<Arc<DataProducer>> {
        self.chat.lock().clone()
    }

    /// Join the room; returns the peers already in it.
    pub async fn join(&self) -> ClientResult<Vec<PeerInfo>> {
        self.ensure_open("join")?;
        if self.joined.swap(true, Ordering::AcqRel) {
            return Err(ClientError::invalid_state("join", "already joined"));
        }

        match self.run_join().await {
            Ok(peers) => Ok(peers),
            Err(e) => {
                error!(error = %e, "join failed");
                self.joined.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    async fn run_join(&self) -> ClientResult<Vec<PeerInfo>> {
        info!(display_name = %self.config.display_name, "joining room");

        let router_rtp_capabilities: RtpCapabilities =
            signaling::request(self.signaling.as_ref(), methods::GET_ROUTER_RTP_CAPABILITIES, &json!({})).await?;
        self.device.load(&router_rtp_capabilities).await?;

        let sctp_capabilities = if self.config.enable_data_channels {
            Some(self.device.sctp_capabilities()?)
        } else {
            None
        };

        if self.config.produce {
            let transport = self.create_transport(true, sctp_capabilities).await?;
            *self.send_transport.write() = Some(transport);
        }
        if self.config.consume {
            let transport = self.create_transport(false, sctp_capabilities).await?;
            *self.recv_transport.write() = Some(transport);
        }

        let rtp_capabilities = if self.config.consume { Some(self.device.rtp_capabilities()?) } else { None };
        let response: JoinResponse = signaling::request(
            self.signaling.as_ref(),
            methods::JOIN,
            &JoinRequest {
                display_name: self.config.display_name.clone(),
                device: self.device.device_info().clone(),
                rtp_capabilities,
                sctp_capabilities,
            },
        )
        .await?;

        for peer in &response.peers {
            self.peers.insert(peer.id.clone(), peer.clone());
        }
        info!(peers = response.peers.len(), "joined room");

        if self.config.produce && self.config.enable_data_channels {
            self.enable_chat().await?;
        }

        Ok(response.peers)
    }

    async fn create_transport(
        &self,
        producing: bool,
        sctp_capabilities: Option<ortc_core::SctpCapabilities>,
    ) -> ClientResult<Arc<Transport>> {
        let options = signaling::request(
            self.signaling.as_ref(),
            methods::CREATE_WEBRTC_TRANSPORT,
            &CreateWebRtcTransportRequest {
                force_tcp: self.config.force_tcp,
                producing,
                consuming: !producing,
                sctp_capabilities,
            },
        )
        .await?;

        let listener: Arc<dyn TransportListener> = Arc::clone(&self.listener) as Arc<dyn TransportListener>;
        let transport = if producing {
            self.device.create_send_transport(options, listener).await?
        } else {
            self.device.create_recv_transport(options, listener).await?
        };
        Ok(Arc::new(transport))
    }

    pub async fn produce(&self, options: ProduceOptions) -> ClientResult<Arc<Producer>> {
        self.send_transport_or_err("produce")?.produce(options).await
    }

    pub async fn close_producer(&self, producer_id: &str) -> ClientResult<()> {
        self.send_transport_or_err("close_producer")?.close_producer(producer_id).await?;
        self.producer_request(methods::CLOSE_PRODUCER, producer_id).await
    }

    pub async fn pause_producer(&self, producer_id: &str) -> ClientResult<()> {
        self.send_transport_or_err("pause_producer")?.pause_producer(producer_id).await?;
        self.producer_request(methods::PAUSE_PRODUCER, producer_id).await
    }

    pub async fn resume_producer(&self, producer_id: &str) -> ClientResult<()> {
        self.send_transport_or_err("resume_producer")?.resume_producer(producer_id).await?;
        self.producer_request(methods::RESUME_PRODUCER, producer_id).await
    }

    /// Open the unordered `chat` data producer.
    pub async fn enable_chat(&self) -> ClientResult<Arc<DataProducer>> {
        if let Some(chat) = self.chat_data_producer() {
            return Ok(chat);
        }
        let chat = self
            .send_transport_or_err("enable_chat")?
            .produce_data(ProduceDataOptions {
                ordered: false,
                max_retransmits: Some(1),
                label: CHAT_LABEL.to_string(),
                app_data: json!({ "info": "my-chat-DataProducer" }),
                ..Default::default()
            })
            .await?;
        *self.chat.lock() = Some(Arc::clone(&chat));
        Ok(chat)
    }

    pub async fn send_chat(&self, text: &str) -> ClientResult<()> {
        let chat = self
            .chat_data_producer()
            .ok_or_else(|| ClientError::invalid_state("send_chat", "chat data producer not enabled"))?;
        chat.send(text.as_bytes().to_vec()).await
    }

    /// Ask the server for fresh ICE credentials for every transport.
    pub async fn restart_ice(&self) -> ClientResult<()> {
        for transport in [self.send_transport(), self.recv_transport()].into_iter().flatten() {
            let ice_parameters: IceParameters = signaling::request(
                self.signaling.as_ref(),
                methods::RESTART_ICE,
                &RestartIceRequest { transport_id: transport.id().to_string() },
            )
            .await?;
            transport.restart_ice(ice_parameters).await?;
        }
        Ok(())
    }

    /// Answer a server request.
    pub async fn handle_request(&self, request: ProtooRequest) -> ProtooResponse {
        debug!(method = %request.method, id = request.id, "server request");
        let result = match request.method.as_str() {
            methods::NEW_CONSUMER => self.on_new_consumer(request.data).await,
            methods::NEW_DATA_CONSUMER => self.on_new_data_consumer(request.data).await,
            other => {
                warn!(method = other, "unknown server request");
                return ProtooResponse::error(request.id, 403, format!("unknown method {other}"));
            }
        };

        match result {
            Ok(()) => ProtooResponse::success(request.id, json!({})),
            Err(e) => {
                error!(method = %request.method, error = %e, "server request failed");
                ProtooResponse::error(request.id, 500, e.to_string())
            }
        }
    }

    async fn on_new_consumer(&self, data: Value) -> ClientResult<()> {
        if !self.config.consume {
            return Err(ClientError::invalid_state(methods::NEW_CONSUMER, "not consuming"));
        }
        let request: NewConsumerRequest = serde_json::from_value(data)?;
        let transport = self.recv_transport_or_err(methods::NEW_CONSUMER)?;

        let mut app_data = request.app_data;
        if let Value::Object(map) = &mut app_data {
            map.insert("peerId".to_string(), Value::String(request.peer_id.clone()));
        }

        let consumer = transport
            .consume(ConsumeOptions {
                id: request.id,
                producer_id: request.producer_id,
                kind: request.kind,
                rtp_parameters: request.rtp_parameters,
                stream_id: Some(request.peer_id.clone()),
                app_data,
            })
            .await?;
        if request.producer_paused {
            debug!(consumer_id = consumer.id(), "producer is paused, pausing consumer");
            transport.pause_consumer(consumer.id()).await?;
        }

        let _ = self.events.send(RoomEvent::NewConsumer { peer_id: request.peer_id, consumer });
        Ok(())
    }

    async fn on_new_data_consumer(&self, data: Value) -> ClientResult<()> {
        if !self.config.enable_data_channels {
            return Err(ClientError::invalid_state(methods::NEW_DATA_CONSUMER, "data channels disabled"));
        }
        let request: NewDataConsumerRequest = serde_json::from_value(data)?;
        self.recv_transport_or_err(methods::NEW_DATA_CONSUMER)?
            .consume_data(ConsumeDataOptions {
                id: request.id,
                data_producer_id: request.data_producer_id,
                sctp_stream_parameters: request.sctp_stream_parameters,
                label: request.label,
                protocol: request.protocol,
                app_data: request.app_data,
            })
            .await?;
        Ok(())
    }

    /// Apply a server notification.
    pub async fn handle_notification(&self, notification: ProtooNotification) -> ClientResult<()> {
        debug!(method = %notification.method, "server notification");
        match notification.method.as_str() {
            methods::NEW_PEER => {
                let peer: PeerInfo = serde_json::from_value(notification.data)?;
                self.peers.insert(peer.id.clone(), peer.clone());
                let _ = self.events.send(RoomEvent::PeerJoined(peer));
            }
            methods::PEER_CLOSED => {
                let PeerClosedNotification { peer_id } = serde_json::from_value(notification.data)?;
                self.peers.remove(&peer_id);
                let _ = self.events.send(RoomEvent::PeerLeft { peer_id });
            }
            methods::CONSUMER_CLOSED => {
                let ConsumerIdNotification { consumer_id } = serde_json::from_value(notification.data)?;
                if let Some(transport) = self.recv_transport() {
                    match transport.close_consumer(&consumer_id).await {
                        Ok(()) | Err(ClientError::NotFound { .. }) => {}
                        Err(e) => return Err(e),
                    }
                }
                let _ = self.events.send(RoomEvent::ConsumerClosed { consumer_id });
            }
            methods::CONSUMER_PAUSED | methods::CONSUMER_RESUMED => {
                let ConsumerIdNotification { consumer_id } = serde_json::from_value(notification.data)?;
                if let Some(transport) = self.recv_transport() {
                    if notification.method == methods::CONSUMER_PAUSED {
                        transport.pause_consumer(&consumer_id).await?;
                    } else {
                        transport.resume_consumer(&consumer_id).await?;
                    }
                }
            }
            _ => {
                let _ = self.events.send(RoomEvent::Notification {
                    method: notification.method,
                    data: notification.data,
                });
            }
        }
        Ok(())
    }

    /// Close both transports. Idempotent.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("leaving room");
        *self.chat.lock() = None;
        let send = self.send_transport.write().take();
        let recv = self.recv_transport.write().take();
        join_all([send, recv].into_iter().flatten().map(|transport| async move { transport.close().await })).await;
        self.peers.clear();
    }

    async fn producer_request(&self, method: &str, producer_id: &str) -> ClientResult<()> {
        let _: Value = signaling::request(
            self.signaling.as_ref(),
            method,
            &ProducerIdRequest { producer_id: producer_id.to_string() },
        )
        .await?;
        Ok(())
    }

    fn send_transport_or_err(&self, operation: &str) -> ClientResult<Arc<Transport>> {
        self.ensure_open(operation)?;
        self.send_transport().ok_or_else(|| ClientError::invalid_state(operation, "no send transport"))
    }

    fn recv_transport_or_err(&self, operation: &str) -> ClientResult<Arc<Transport>> {
        self.ensure_open(operation)?;
        self.recv_transport().ok_or_else(|| ClientError::invalid_state(operation, "no receive transport"))
    }

    fn ensure_open(&self, operation: &str) -> ClientResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(ClientError::invalid_state(operation, "room client is closed"))
        } else {
            Ok(())
        }
    }
}
