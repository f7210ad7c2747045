//! Grammars for the `a=` attributes WebRTC negotiation relies on.
//!
//! Each module exposes a `parse_*` function taking the attribute value (the
//! text after `a=<name>:`) and a matching `write_*` function producing it back.

pub mod candidate;
pub mod common;
pub mod dtls;
pub mod extmap;
pub mod fmtp;
pub mod group;
pub mod rid;
pub mod rtcp_fb;
pub mod rtpmap;
pub mod sctp;
pub mod ssrc;

pub use candidate::{parse_candidate, write_candidate};
pub use dtls::{parse_fingerprint, parse_setup};
pub use extmap::{parse_extmap, write_extmap, ENCRYPT_URI};
pub use fmtp::{parse_fmtp, parse_params, write_params};
pub use group::{parse_group, parse_msid_semantic, write_group, write_msid_semantic};
pub use rid::{parse_rid, parse_simulcast, write_rid, write_simulcast};
pub use rtcp_fb::{parse_rtcp_fb, write_rtcp_fb};
pub use rtpmap::{parse_rtpmap, write_rtpmap};
pub use sctp::{
    parse_max_message_size, parse_rtcp, parse_sctp_port, parse_sctpmap, write_rtcp, write_sctpmap,
};
pub use ssrc::{parse_ssrc, parse_ssrc_group, write_ssrc, write_ssrc_group};
