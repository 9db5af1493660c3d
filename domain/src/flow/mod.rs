//! Diagnostic flows
//!
//! A flow is an ordered, explainable chain of tool calls anchored at one
//! resource and shaped by a [`Scenario`]. The planner lives in the
//! application layer; this module holds what it produces.

pub mod entities;
pub mod mesh;
pub mod scenario;

pub use entities::{DEFAULT_MAX_STEPS, FlowEntry, FlowResult, FlowStep, StepError};
pub use mesh::MeshKind;
pub use scenario::{Scenario, UnknownScenario};
