//! # PageHub Addon Framework
//!
//! - [`hooks`]: the fixed hook catalog and the event passed to listeners
//! - [`manager`]: in-process runtime that loads, enables and dispatches to addons
//! - [`installer`]: on-disk package install, update with rollback, and uninstall
//! - [`builtin`]: addons compiled into the host

pub mod addon;
pub mod builtin;
pub mod descriptor;
pub mod dynamic;
pub mod hooks;
pub mod installer;
pub mod manager;

pub use addon::{Addon, AddonDescriptor, AddonIdentity, HookListener};
pub use hooks::{HookEvent, HookKind};
pub use installer::{AddonInstaller, InstallError, InstalledAddon};
pub use manager::{AddonManager, DispatchReport};
