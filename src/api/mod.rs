//! HTTP plumbing shared by every API call: the JSON client and the
//! normalized response envelope.

mod client;
mod envelope;

pub use client::ApiClient;
pub use envelope::ApiEnvelope;
