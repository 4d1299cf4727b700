pub mod pipeline;
pub mod portfolio_service;
pub mod render_adapter;

pub use pipeline::*;
pub use portfolio_service::*;
pub use render_adapter::*;
