//! Request/reply tokenization service.
//!
//! Clients send one JSON request per line carrying Python source text; the
//! service answers with one JSON reply per line carrying the token stream,
//! or an error object when the request cannot be served. A failed request
//! never ends the session.

#![warn(missing_docs)]

pub mod proto;
pub mod service;

pub use proto::{ErrorReply, TokenRecord, TokenizeReply, TokenizeRequest};
pub use service::{handle_request, serve_stream, Service, ServiceError, ServiceHandle};
