//! Wire protocol for the QA run core.
//!
//! This crate defines the JSON shapes exchanged over HTTP: the execution stream's
//! per-event envelope (`event`, `envelope`), and the request/response bodies for the
//! execute/stop/generate endpoints (`request`, `response`). It has no dependency on
//! `qa-core`; `qa-core` and `qa-serve` bridge their internal types into these shapes
//! at the boundary.

pub mod envelope;
pub mod event;
pub mod request;
pub mod response;

pub use envelope::EnvelopeState;
pub use event::{AllCompleteSummary, ProtocolEvent};
pub use request::{
    AccountRequirement, ExecuteRequest, GenerateRequest, GenerateStatusQuery, SettingsSnapshot,
    StopRequest, TestCaseInput,
};
pub use response::{
    DraftSummary, ErrorResponse, GenerateResponse, GenerateStatusResponse, JobSummary,
    NotificationSummary, StopResponse,
};
