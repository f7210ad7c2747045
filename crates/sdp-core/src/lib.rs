//! # ortc-sdp-core
//!
//! Structured SDP for WebRTC offer/answer.
//!
//! The crate converts between SDP text and a [`SessionDescription`] tree
//! holding exactly the members a WebRTC endpoint negotiates with: media
//! sections, codecs (`rtpmap`, `fmtp`, `rtcp-fb`), header extensions, ICE and
//! DTLS attributes, SSRC and simulcast signalling, and SCTP association
//! parameters. Unmodelled attributes are carried through untouched.
//!
//! ```
//! use ortc_sdp_core::{parse, write};
//!
//! let text = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n\
//!             m=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=mid:0\r\na=rtpmap:111 opus/48000/2\r\n";
//! let sdp = parse(text).unwrap();
//! assert_eq!(sdp.media[0].rtp[0].codec, "opus");
//! assert_eq!(parse(&write(&sdp)).unwrap(), sdp);
//! ```

pub mod attributes;
pub mod error;
pub mod parser;
pub mod session;
pub mod writer;

pub use attributes::{parse_params, write_params};
pub use error::{Result, SdpError};
pub use parser::parse;
pub use session::*;
pub use writer::write;
