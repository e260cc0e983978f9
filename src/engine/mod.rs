pub mod common;
pub mod filter;
pub mod peaks;
pub mod pipeline;
pub mod properties;
pub mod timing;
pub mod upsample;
