//! Application-level configuration.
//!
//! - [`ExecutionParams`]: generation loop control (model, tool rounds)

pub mod execution_params;

pub use execution_params::ExecutionParams;
