//! blockdesk - workspace session core for a block-based visual editor
//!
//! Module layout:
//! - kernel: headless session core (config store, persistence bridge, plugin
//!   registry, toolbox localizer, lifecycle manager)
//! - kernel::services: ports (toolkit, storage, location, controls, preview)
//!   and adapters (in-memory, headless toolkit, settings, web)

pub mod kernel;
