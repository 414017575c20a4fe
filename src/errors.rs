//! Error Types
//!
//! Every failure this crate surfaces itself is a configuration mistake: the
//! stage either rejects a call immediately or succeeds deterministically.
//! Device-side failures (pipeline or texture creation) are reported through
//! wgpu's device error handler and are fatal for the build — there is no
//! partial or degraded pipeline.
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, GBufferError>`.

use thiserror::Error;

/// The error type for G-buffer stage configuration.
#[derive(Error, Debug)]
pub enum GBufferError {
    /// The fixed output ceiling was reached; the registry was not mutated.
    #[error("cannot add output \"{name}\": maximum output count of {max} reached")]
    TooManyOutputs {
        /// Name of the output that was rejected
        name: String,
        /// The fixed ceiling
        max: usize,
    },

    /// An output with this name is already registered; the registry was not
    /// mutated. Duplicate names are rejected rather than overwritten so a
    /// misconfigured recipe set fails loudly.
    #[error("an output named \"{0}\" is already registered")]
    DuplicateOutput(String),

    /// Lookup of a name that was never registered.
    #[error("no output named \"{0}\" is registered")]
    OutputNotFound(String),

    /// A per-frame or resolution-dependent operation was called before
    /// [`build`](crate::stage::GBufferStage::build).
    #[error("the G-buffer stage has not been built")]
    NotBuilt,
}

/// Alias for `Result<T, GBufferError>`.
pub type Result<T> = std::result::Result<T, GBufferError>;
