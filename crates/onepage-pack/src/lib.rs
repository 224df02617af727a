//! Build-and-pack pipeline for single-page sites.
//!
//! Runs the project's bundler, then turns its HTML entry point into one
//! self-contained, timestamped artifact.

pub mod artifact;
pub mod audit;
pub mod clock;
pub mod invoker;
pub mod packager;

pub use artifact::{list_artifacts, Artifact};
pub use audit::{AuditReport, ExternalRef, RefSource};
pub use clock::{Clock, FixedClock, SystemClock};
pub use invoker::{BuildInvoker, ShellInvoker};
pub use packager::{PackConfig, PackError, PackMode, PackResult, Packager};
