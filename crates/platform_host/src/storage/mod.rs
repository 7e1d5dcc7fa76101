//! Origin-scoped storage contracts and adapters.

pub mod events;
pub mod key_value;
pub mod memory;
