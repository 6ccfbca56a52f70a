// Domain Layer - Pure request construction and check evaluation

pub mod check;
pub mod error;
pub mod payload;
pub mod scenario;

// Re-exports
pub use check::{CheckOutcome, IterationContext, IterationReport};
pub use error::DomainError;
pub use payload::{ItemPayload, NameStrategy, PayloadTemplate, FIELD_NAMES};
pub use scenario::{Scenario, ScenarioKind, Target};
