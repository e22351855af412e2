//! Stepgate Core
//!
//! Shared data model and collaborator contracts for the step-up
//! authentication gate. The decision policy lives in `stepgate-policy`;
//! the asynchronous challenge plumbing lives in `stepgate-challenge`.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
