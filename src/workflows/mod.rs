// Workflow policy for service orders
// Supplies stage ordering and validity; transitions are unrestricted

pub mod policy;

pub use policy::{PolicyError, WorkflowPolicy, DEFAULT_STAGES};
