//! Core of tiltsave: finds the files that make up one Tilt Brush sketch
//! session, renames them together, and archives the working root.
//!
//! Stages run strictly in order, each on the paths the previous one wrote:
//! discovery → aggregation → rename transaction → format conversion → migration.

mod aggregate;
pub mod config;
pub mod constants;
mod convert;
mod discovery;
mod error;
mod layout;
mod migrate;
mod name;
mod record;
mod rename;
mod save;

pub use aggregate::*;
pub use config::Settings;
pub use convert::*;
pub use discovery::*;
pub use error::*;
pub use layout::*;
pub use migrate::*;
pub use name::*;
pub use record::*;
pub use rename::*;
pub use save::*;
