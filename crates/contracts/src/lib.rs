//! # Contracts
//!
//! Frozen interface contracts shared by every pipeline crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Conduit model
//! - A conduit is owned by the engine and closed exactly once
//! - Stages receive an [`Inlet`] to read and an [`Outlet`] to write; they never close
//! - Items move by value, the sender gives up access on send

mod conduit;
mod error;
mod records;
mod settings;
mod stage;

pub use conduit::{Closer, Conduit, Inlet, Outlet, MIN_CAPACITY};
pub use error::*;
pub use records::*;
pub use settings::*;
pub use stage::{LocalStage, Stage};
