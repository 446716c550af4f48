//! Hook catalog and the event value passed to listeners.

pub mod definitions;
pub mod event;

pub use definitions::HookKind;
pub use event::HookEvent;
