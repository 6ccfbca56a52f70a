// Port Layer - Interfaces for external dependencies

pub mod check_recorder;
pub mod request_sender;
pub mod time_provider;

// Re-exports
pub use check_recorder::CheckRecorder;
pub use request_sender::{FormRequest, RequestSender, SendError, SendOutcome, FORM_CONTENT_TYPE};
pub use time_provider::TimeProvider;
