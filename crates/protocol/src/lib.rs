//! Wire-level building blocks shared by the Directive server and its clients.
//!
//! - [`framing`] reads and writes `Content-Length: N\r\n\r\n<json>` frames.
//! - [`jsonrpc`] holds the request/response/error shapes carried inside a frame.

pub mod framing;
pub mod jsonrpc;

pub use framing::{encode_frame, read_frame, write_frame, MAX_MESSAGE_BYTES};
pub use jsonrpc::{codes, Outcome, Request, Response, RpcError, JSONRPC_VERSION};
