//! Tool backends
//!
//! - [`ToolManager`]: loads backends by kind ([`ToolLoader`](docent_application::ToolLoader))
//! - [`ApiTool`]: the `api_tool` HTTP backend

mod api;
mod registry;

pub use api::{ApiTool, ApiToolConfig};
pub use registry::{ToolFactory, ToolManager};
