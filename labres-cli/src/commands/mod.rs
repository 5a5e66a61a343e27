//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `resource`: Register, remove, maintain and list resources
//! - `reserve`: Request a resource
//! - `approve` / `reject`: Decide on a pending request
//! - `cancel`: Cancel or revoke a reservation
//! - `extend`: Extend an approved reservation
//! - `release` / `cancel-release`: Give dates back and withdraw the offer
//! - `list`: List reservations
//! - `releases`: List releases
//! - `notifications`: Show and acknowledge outbox events
//! - `show-data-dir`: Show resolved data directory path
//! - `validate`: Validate configuration file
//! - `completions`: Generate shell completions

pub mod cancel;
pub mod completions;
pub mod decide;
pub mod extend;
pub mod list;
pub mod notifications;
pub mod release;
pub mod releases;
pub mod reserve;
pub mod resource;
pub mod show_data_dir;
pub mod validate;

pub use cancel::CancelCommand;
pub use completions::CompletionsCommand;
pub use decide::{ApproveCommand, RejectCommand};
pub use extend::ExtendCommand;
pub use list::ListCommand;
pub use notifications::NotificationsCommand;
pub use release::{CancelReleaseCommand, ReleaseCommand};
pub use releases::ReleasesCommand;
pub use reserve::ReserveCommand;
pub use resource::ResourceCommand;
pub use show_data_dir::ShowDataDirCommand;
pub use validate::ValidateCommand;
