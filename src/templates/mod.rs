//! Templates Module
//!
//! Certificate HTML templates loaded once at startup.

mod cache;
mod watermark;

pub use cache::TemplateCache;
pub use watermark::add_watermark;
