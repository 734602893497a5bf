//! # System Interaction Layer
//!
//! The boundary between discovery and the operating system: turning a resolved
//! launcher and a project into a running IDE process.
//!
//! ## Modules
//!
//! - **`launcher`**: Builds launch requests (executable, quoted project path,
//!   working directory, elevation) and spawns them detached from the caller.

pub mod launcher;
