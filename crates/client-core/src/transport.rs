//! Send and receive transports.
//!
//! A [`Transport`] pairs one server-side WebRTC transport with one local
//! peer connection. Every operation that renegotiates holds the handler
//! lock for its whole duration, so offer/answer rounds on a transport never
//! interleave. Operations on different transports run independently.

use crate::config::ProducerCodecOptions;
use crate::consumer::{Consumer, DataConsumer};
use crate::error::{ClientError, ClientResult};
use crate::events::{ConnectionState, ProduceDataRequest, ProduceRequest, TransportListener};
use crate::handler::{
    Handler, HandlerBackend, HandlerReceiveOptions, HandlerRunOptions, HandlerSendDataChannelOptions,
    HandlerSendOptions, HandlerSendResult, MediaTrack,
};
use crate::producer::{DataProducer, Producer};
use dashmap::DashMap;
use ortc_core::ortc::{self, ExtendedRtpCapabilities};
use ortc_core::{
    DtlsParameters, IceCandidate, IceParameters, MediaKind, NegotiationError, RtpCodecCapability,
    RtpEncodingParameters, RtpParameters, SctpParameters, SctpStreamParameters,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use crate::handler::TransportDirection;

/// Server transport parameters, as returned by `createWebRtcTransport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    pub id: String,
    pub ice_parameters: IceParameters,
    pub ice_candidates: Vec<IceCandidate>,
    pub dtls_parameters: DtlsParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sctp_parameters: Option<SctpParameters>,
}

#[derive(Debug, Clone)]
pub struct ProduceOptions {
    pub track: MediaTrack,
    /// Empty for a single encoding read from the local offer.
    pub encodings: Vec<RtpEncodingParameters>,
    pub codec_options: Option<ProducerCodecOptions>,
    pub codec: Option<RtpCodecCapability>,
    pub app_data: serde_json::Value,
}

impl ProduceOptions {
    pub fn new(track: MediaTrack) -> Self {
        Self { track, encodings: Vec::new(), codec_options: None, codec: None, app_data: serde_json::Value::Null }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceDataOptions {
    pub ordered: bool,
    pub max_packet_life_time: Option<u16>,
    pub max_retransmits: Option<u16>,
    pub label: String,
    pub protocol: String,
    pub app_data: serde_json::Value,
}

impl Default for ProduceDataOptions {
    fn default() -> Self {
        Self {
            ordered: true,
            max_packet_life_time: None,
            max_retransmits: None,
            label: String::new(),
            protocol: String::new(),
            app_data: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsumeOptions {
    pub id: String,
    pub producer_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
    pub stream_id: Option<String>,
    pub app_data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ConsumeDataOptions {
    pub id: String,
    pub data_producer_id: String,
    pub sctp_stream_parameters: SctpStreamParameters,
    pub label: String,
    pub protocol: String,
    pub app_data: serde_json::Value,
}

pub struct Transport {
    id: String,
    direction: TransportDirection,
    extended: Arc<ExtendedRtpCapabilities>,
    has_sctp: bool,
    handler: tokio::sync::Mutex<Handler>,
    listener: Arc<dyn TransportListener>,
    closed: Arc<AtomicBool>,
    connection_state: Arc<RwLock<ConnectionState>>,
    state_task: Mutex<Option<JoinHandle<()>>>,
    producers: DashMap<String, Arc<Producer>>,
    consumers: DashMap<String, Arc<Consumer>>,
    data_producers: DashMap<String, Arc<DataProducer>>,
    data_consumers: DashMap<String, Arc<DataConsumer>>,
}

impl Transport {
    pub(crate) fn new(
        direction: TransportDirection,
        options: TransportOptions,
        extended: Arc<ExtendedRtpCapabilities>,
        backend: Arc<dyn HandlerBackend>,
        listener: Arc<dyn TransportListener>,
    ) -> ClientResult<Self> {
        if let Some(sctp) = &options.sctp_parameters {
            ortc::validate_sctp_parameters(sctp)?;
        }

        let id = options.id;
        let has_sctp = options.sctp_parameters.is_some();
        let events = backend.take_connection_state_events();

        let handler = Handler::new(
            backend,
            Arc::clone(&listener),
            HandlerRunOptions {
                transport_id: id.clone(),
                direction,
                ice_parameters: options.ice_parameters,
                ice_candidates: options.ice_candidates,
                dtls_parameters: options.dtls_parameters,
                sctp_parameters: options.sctp_parameters,
                extended_rtp_capabilities: &extended,
            },
        );

        let closed = Arc::new(AtomicBool::new(false));
        let connection_state = Arc::new(RwLock::new(ConnectionState::New));

        let state_task = events.map(|mut events| {
            let id = id.clone();
            let listener = Arc::clone(&listener);
            let closed = Arc::clone(&closed);
            let connection_state = Arc::clone(&connection_state);
            tokio::spawn(async move {
                while let Some(state) = events.recv().await {
                    if closed.load(Ordering::Acquire) {
                        break;
                    }
                    debug!(transport_id = %id, %state, "connection state changed");
                    *connection_state.write() = state;
                    listener.on_connection_state_change(&id, state).await;
                }
            })
        });

        info!(transport_id = %id, %direction, "transport created");

        Ok(Self {
            id,
            direction,
            extended,
            has_sctp,
            handler: tokio::sync::Mutex::new(handler),
            listener,
            closed,
            connection_state,
            state_task: Mutex::new(state_task),
            producers: DashMap::new(),
            consumers: DashMap::new(),
            data_producers: DashMap::new(),
            data_consumers: DashMap::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn direction(&self) -> TransportDirection {
        self.direction
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection_state.read()
    }

    pub fn producer(&self, id: &str) -> Option<Arc<Producer>> {
        self.producers.get(id).map(|p| Arc::clone(p.value()))
    }

    pub fn producers(&self) -> Vec<Arc<Producer>> {
        self.producers.iter().map(|p| Arc::clone(p.value())).collect()
    }

    pub fn consumer(&self, id: &str) -> Option<Arc<Consumer>> {
        self.consumers.get(id).map(|c| Arc::clone(c.value()))
    }

    pub fn consumers(&self) -> Vec<Arc<Consumer>> {
        self.consumers.iter().map(|c| Arc::clone(c.value())).collect()
    }

    pub fn data_producer(&self, id: &str) -> Option<Arc<DataProducer>> {
        self.data_producers.get(id).map(|p| Arc::clone(p.value()))
    }

    pub fn data_consumer(&self, id: &str) -> Option<Arc<DataConsumer>> {
        self.data_consumers.get(id).map(|c| Arc::clone(c.value()))
    }

    /// Start sending a track.
    ///
    /// The track is negotiated locally first, then announced through
    /// [`TransportListener::on_produce`]. If the server refuses it, the local
    /// section is torn down again.
    pub async fn produce(&self, options: ProduceOptions) -> ClientResult<Arc<Producer>> {
        self.ensure(TransportDirection::Send, "produce")?;
        let kind = options.track.kind;
        if !ortc::can_send(kind, &self.extended) {
            return Err(NegotiationError::UnsupportedKind { kind: kind.to_string() }.into());
        }

        let mut handler = self.handler.lock().await;
        let HandlerSendResult { local_id, mut rtp_parameters } = handler
            .send(HandlerSendOptions {
                track: options.track.clone(),
                encodings: options.encodings,
                codec_options: options.codec_options,
                codec: options.codec,
            })
            .await?;

        let announced = match ortc::validate_rtp_parameters(&mut rtp_parameters) {
            Ok(()) => {
                self.listener
                    .on_produce(
                        &self.id,
                        ProduceRequest {
                            kind,
                            rtp_parameters: rtp_parameters.clone(),
                            app_data: options.app_data.clone(),
                        },
                    )
                    .await
            }
            Err(e) => Err(e.into()),
        };

        let id = match announced {
            Ok(id) => id,
            Err(e) => {
                if let Err(stop_err) = handler.stop_sending(&local_id).await {
                    warn!(mid = %local_id, error = %stop_err, "failed to undo local send");
                }
                return Err(e);
            }
        };
        drop(handler);

        let producer = Arc::new(Producer::new(id.clone(), local_id, options.track, rtp_parameters, options.app_data));
        self.producers.insert(id, Arc::clone(&producer));
        info!(transport_id = %self.id, producer_id = producer.id(), %kind, "producer created");
        Ok(producer)
    }

    /// Stop sending a producer's track.
    ///
    /// The producer stays registered until the renegotiation succeeds, so a
    /// failed close can be retried.
    pub async fn close_producer(&self, producer_id: &str) -> ClientResult<()> {
        let mut handler = self.handler.lock().await;
        let producer = self.producer(producer_id).ok_or_else(|| ClientError::not_found("producer", producer_id))?;
        if !self.closed() {
            handler.stop_sending(producer.local_id()).await?;
        }
        drop(handler);

        self.producers.remove(producer_id);
        producer.mark_closed();
        debug!(transport_id = %self.id, producer_id, "producer closed");
        Ok(())
    }

    pub async fn pause_producer(&self, producer_id: &str) -> ClientResult<()> {
        let producer = self.open_producer(producer_id, "pause_producer")?;
        if producer.paused() {
            return Ok(());
        }
        self.handler.lock().await.pause_sending(producer.local_id()).await?;
        producer.set_paused(true);
        Ok(())
    }

    pub async fn resume_producer(&self, producer_id: &str) -> ClientResult<()> {
        let producer = self.open_producer(producer_id, "resume_producer")?;
        if !producer.paused() {
            return Ok(());
        }
        self.handler.lock().await.resume_sending(producer.local_id()).await?;
        producer.set_paused(false);
        Ok(())
    }

    pub async fn produce_data(&self, options: ProduceDataOptions) -> ClientResult<Arc<DataProducer>> {
        self.ensure(TransportDirection::Send, "produce_data")?;
        if !self.has_sctp {
            return Err(ClientError::invalid_state("produce_data", "SCTP not enabled on this transport"));
        }

        let mut handler = self.handler.lock().await;
        let mut sctp_stream_parameters = handler
            .send_data_channel(HandlerSendDataChannelOptions {
                ordered: options.ordered,
                max_packet_life_time: options.max_packet_life_time,
                max_retransmits: options.max_retransmits,
                label: options.label.clone(),
                protocol: options.protocol.clone(),
            })
            .await?;
        ortc::validate_sctp_stream_parameters(&mut sctp_stream_parameters)?;

        let id = self
            .listener
            .on_produce_data(
                &self.id,
                ProduceDataRequest {
                    sctp_stream_parameters: sctp_stream_parameters.clone(),
                    label: options.label.clone(),
                    protocol: options.protocol.clone(),
                    app_data: options.app_data.clone(),
                },
            )
            .await?;
        let backend = handler.backend();
        drop(handler);

        let data_producer = Arc::new(DataProducer::new(
            id.clone(),
            sctp_stream_parameters,
            options.label,
            options.protocol,
            options.app_data,
            backend,
        ));
        self.data_producers.insert(id, Arc::clone(&data_producer));
        info!(transport_id = %self.id, data_producer_id = data_producer.id(), "data producer created");
        Ok(data_producer)
    }

    pub fn close_data_producer(&self, data_producer_id: &str) -> ClientResult<()> {
        let (_, data_producer) = self
            .data_producers
            .remove(data_producer_id)
            .ok_or_else(|| ClientError::not_found("data producer", data_producer_id))?;
        data_producer.mark_closed();
        Ok(())
    }

    /// Start receiving a server producer.
    pub async fn consume(&self, options: ConsumeOptions) -> ClientResult<Arc<Consumer>> {
        self.ensure(TransportDirection::Recv, "consume")?;

        let mut rtp_parameters = options.rtp_parameters;
        if !ortc::can_receive(&rtp_parameters, &self.extended)? {
            let mime_type = rtp_parameters.codecs.first().map(|c| c.mime_type.clone()).unwrap_or_default();
            return Err(NegotiationError::NoMatchingCodec { mime_type }.into());
        }
        ortc::validate_rtp_parameters(&mut rtp_parameters)?;

        let local_id = self
            .handler
            .lock()
            .await
            .receive(HandlerReceiveOptions {
                track_id: options.id.clone(),
                kind: options.kind,
                rtp_parameters: rtp_parameters.clone(),
                stream_id: options.stream_id,
            })
            .await?;

        let consumer = Arc::new(Consumer::new(
            options.id.clone(),
            options.producer_id,
            local_id,
            options.kind,
            rtp_parameters,
            options.app_data,
        ));
        self.consumers.insert(options.id, Arc::clone(&consumer));
        info!(transport_id = %self.id, consumer_id = consumer.id(), kind = %consumer.kind(), "consumer created");
        Ok(consumer)
    }

    pub async fn close_consumer(&self, consumer_id: &str) -> ClientResult<()> {
        let mut handler = self.handler.lock().await;
        let consumer = self.consumer(consumer_id).ok_or_else(|| ClientError::not_found("consumer", consumer_id))?;
        if !self.closed() {
            handler.stop_receiving(consumer.local_id()).await?;
        }
        drop(handler);

        self.consumers.remove(consumer_id);
        consumer.mark_closed();
        debug!(transport_id = %self.id, consumer_id, "consumer closed");
        Ok(())
    }

    pub async fn pause_consumer(&self, consumer_id: &str) -> ClientResult<()> {
        let consumer = self.open_consumer(consumer_id, "pause_consumer")?;
        if consumer.paused() {
            return Ok(());
        }
        self.handler.lock().await.pause_receiving(consumer.local_id()).await?;
        consumer.set_paused(true);
        Ok(())
    }

    pub async fn resume_consumer(&self, consumer_id: &str) -> ClientResult<()> {
        let consumer = self.open_consumer(consumer_id, "resume_consumer")?;
        if !consumer.paused() {
            return Ok(());
        }
        self.handler.lock().await.resume_receiving(consumer.local_id()).await?;
        consumer.set_paused(false);
        Ok(())
    }

    pub async fn consume_data(&self, options: ConsumeDataOptions) -> ClientResult<Arc<DataConsumer>> {
        self.ensure(TransportDirection::Recv, "consume_data")?;
        if !self.has_sctp {
            return Err(ClientError::invalid_state("consume_data", "SCTP not enabled on this transport"));
        }

        let mut sctp_stream_parameters = options.sctp_stream_parameters;
        ortc::validate_sctp_stream_parameters(&mut sctp_stream_parameters)?;

        self.handler
            .lock()
            .await
            .receive_data_channel(&sctp_stream_parameters, &options.label, &options.protocol)
            .await?;

        let data_consumer = Arc::new(DataConsumer::new(
            options.id.clone(),
            options.data_producer_id,
            sctp_stream_parameters,
            options.label,
            options.protocol,
            options.app_data,
        ));
        self.data_consumers.insert(options.id, Arc::clone(&data_consumer));
        Ok(data_consumer)
    }

    /// Apply new server ICE credentials.
    pub async fn restart_ice(&self, ice_parameters: IceParameters) -> ClientResult<()> {
        self.ensure_open("restart_ice")?;
        self.handler.lock().await.restart_ice(ice_parameters).await
    }

    /// Close the transport and everything on it. Idempotent.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(transport_id = %self.id, "closing transport");

        if let Some(task) = self.state_task.lock().take() {
            task.abort();
        }
        self.handler.lock().await.close().await;
        *self.connection_state.write() = ConnectionState::Closed;

        for entry in self.producers.iter() {
            entry.value().mark_closed();
        }
        for entry in self.consumers.iter() {
            entry.value().mark_closed();
        }
        for entry in self.data_producers.iter() {
            entry.value().mark_closed();
        }
        for entry in self.data_consumers.iter() {
            entry.value().mark_closed();
        }
        self.producers.clear();
        self.consumers.clear();
        self.data_producers.clear();
        self.data_consumers.clear();
    }

    fn open_producer(&self, producer_id: &str, operation: &str) -> ClientResult<Arc<Producer>> {
        self.ensure_open(operation)?;
        self.producer(producer_id).ok_or_else(|| ClientError::not_found("producer", producer_id))
    }

    fn open_consumer(&self, consumer_id: &str, operation: &str) -> ClientResult<Arc<Consumer>> {
        self.ensure_open(operation)?;
        self.consumer(consumer_id).ok_or_else(|| ClientError::not_found("consumer", consumer_id))
    }

    fn ensure_open(&self, operation: &str) -> ClientResult<()> {
        if self.closed() {
            Err(ClientError::invalid_state(operation, format!("transport {} is closed", self.id)))
        } else {
            Ok(())
        }
    }

    fn ensure(&self, direction: TransportDirection, operation: &str) -> ClientResult<()> {
        self.ensure_open(operation)?;
        if self.direction != direction {
            return Err(ClientError::invalid_state(
                operation,
                format!("not allowed on a {} transport", self.direction),
            ));
        }
        Ok(())
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if let Some(task) = self.state_task.get_mut().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("id", &self.id)
            .field("direction", &self.direction)
            .field("closed", &self.closed())
            .field("producers", &self.producers.len())
            .field("consumers", &self.consumers.len())
            .finish()
    }
}
