//! The local endpoint: what this client can send and receive.
//!
//! A [`Device`] is loaded once with the router's RTP capabilities. Loading
//! probes the local stack through the [`HandlerFactory`], intersects both
//! capability sets and caches the result for the transports it creates.
//!
//! ```text
//!  Unloaded ──load()──► Loading ──ok──► Loaded
//!      ▲                   │
//!      └──────error────────┘
//! ```

use crate::config::DeviceInfo;
use crate::error::{ClientError, ClientResult};
use crate::events::TransportListener;
use crate::handler::{sdp_utils, HandlerFactory, TransportDirection};
use crate::transport::{Transport, TransportOptions};
use ortc_core::ortc::{self, ExtendedRtpCapabilities};
use ortc_core::{MediaKind, RtpCapabilities, SctpCapabilities};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

const UNLOADED: u8 = 0;
const LOADING: u8 = 1;
const LOADED: u8 = 2;

#[derive(Debug)]
struct LoadedCapabilities {
    extended: Arc<ExtendedRtpCapabilities>,
    recv_rtp_capabilities: RtpCapabilities,
    sctp_capabilities: SctpCapabilities,
    can_produce_audio: bool,
    can_produce_video: bool,
}

pub struct Device {
    factory: Arc<dyn HandlerFactory>,
    info: DeviceInfo,
    state: AtomicU8,
    loaded: OnceLock<LoadedCapabilities>,
}

impl Device {
    pub fn new(factory: Arc<dyn HandlerFactory>) -> Self {
        Self::with_info(factory, DeviceInfo::default())
    }

    pub fn with_info(factory: Arc<dyn HandlerFactory>, info: DeviceInfo) -> Self {
        Self { factory, info, state: AtomicU8::new(UNLOADED), loaded: OnceLock::new() }
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn loaded(&self) -> bool {
        self.state.load(Ordering::Acquire) == LOADED
    }

    /// Load the router's RTP capabilities.
    ///
    /// Loading an already loaded device is a no-op. A concurrent load fails
    /// with a state error; a failed load leaves the device unloaded.
    pub async fn load(&self, router_rtp_capabilities: &RtpCapabilities) -> ClientResult<()> {
        match self.state.compare_exchange(UNLOADED, LOADING, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => {}
            Err(LOADED) => {
                debug!("device already loaded");
                return Ok(());
            }
            Err(_) => return Err(ClientError::invalid_state("load", "device is already loading")),
        }

        match self.compute(router_rtp_capabilities).await {
            Ok(capabilities) => {
                info!(
                    can_produce_audio = capabilities.can_produce_audio,
                    can_produce_video = capabilities.can_produce_video,
                    codecs = capabilities.extended.codecs.len(),
                    "device loaded"
                );
                // Only the winner of the compare-exchange reaches this point.
                let _ = self.loaded.set(capabilities);
                self.state.store(LOADED, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.state.store(UNLOADED, Ordering::Release);
                Err(e)
            }
        }
    }

    async fn compute(&self, router_rtp_capabilities: &RtpCapabilities) -> ClientResult<LoadedCapabilities> {
        let mut router = router_rtp_capabilities.clone();
        ortc::validate_rtp_capabilities(&mut router)?;

        let offer = self.factory.capability_offer().await?;
        let mut native = sdp_utils::extract_rtp_capabilities(&ortc_sdp_core::parse(&offer)?);
        ortc::add_nack_support_for_opus(&mut native);
        ortc::validate_rtp_capabilities(&mut native)?;

        let extended = ortc::get_extended_rtp_capabilities(&native, &router);
        let mut recv_rtp_capabilities = ortc::get_recv_rtp_capabilities(&extended);
        ortc::validate_rtp_capabilities(&mut recv_rtp_capabilities)?;

        let sctp_capabilities = self.factory.sctp_capabilities();
        ortc::validate_sctp_capabilities(&sctp_capabilities)?;

        Ok(LoadedCapabilities {
            can_produce_audio: ortc::can_send(MediaKind::Audio, &extended),
            can_produce_video: ortc::can_send(MediaKind::Video, &extended),
            extended: Arc::new(extended),
            recv_rtp_capabilities,
            sctp_capabilities,
        })
    }

    /// Capabilities to announce to the server for consuming.
    pub fn rtp_capabilities(&self) -> ClientResult<RtpCapabilities> {
        Ok(self.capabilities("rtp_capabilities")?.recv_rtp_capabilities.clone())
    }

    pub fn sctp_capabilities(&self) -> ClientResult<SctpCapabilities> {
        Ok(self.capabilities("sctp_capabilities")?.sctp_capabilities)
    }

    pub fn can_produce(&self, kind: MediaKind) -> ClientResult<bool> {
        let capabilities = self.capabilities("can_produce")?;
        Ok(match kind {
            MediaKind::Audio => capabilities.can_produce_audio,
            MediaKind::Video => capabilities.can_produce_video,
        })
    }

    pub fn extended_rtp_capabilities(&self) -> ClientResult<Arc<ExtendedRtpCapabilities>> {
        Ok(Arc::clone(&self.capabilities("extended_rtp_capabilities")?.extended))
    }

    pub async fn create_send_transport(
        &self,
        options: TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> ClientResult<Transport> {
        self.create_transport(TransportDirection::Send, options, listener).await
    }

    pub async fn create_recv_transport(
        &self,
        options: TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> ClientResult<Transport> {
        self.create_transport(TransportDirection::Recv, options, listener).await
    }

    async fn create_transport(
        &self,
        direction: TransportDirection,
        options: TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> ClientResult<Transport> {
        let capabilities = self.capabilities("create_transport")?;
        let backend = self.factory.create_backend(direction).await?;
        Transport::new(
            direction,
            options,
            Arc::clone(&capabilities.extended),
            backend,
            listener,
        )
    }

    fn capabilities(&self, operation: &str) -> ClientResult<&LoadedCapabilities> {
        match self.loaded.get() {
            Some(capabilities) if self.loaded() => Ok(capabilities),
            _ => Err(ClientError::invalid_state(operation, "device not loaded")),
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("info", &self.info).field("loaded", &self.loaded()).finish()
    }
}
