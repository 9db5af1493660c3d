//! Use cases (application services)

pub mod run_flow;
