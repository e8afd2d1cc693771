//! Inference engine modules.
//!
//! The training loop alternates two phases until the posterior means stop
//! moving: an M-step that recomputes every Beta/Dirichlet posterior from
//! the prior with responsibility-weighted counts, and an E-step that
//! recomputes soft class assignments for unlabeled instances from the
//! posteriors just committed. Labeled instances keep a fixed one-hot
//! assignment for the whole run.

pub mod posterior;
pub mod responsibility;
pub mod train;

pub use posterior::{ModelPosterior, LOG_CLAMP_EPS};
pub use responsibility::Responsibilities;
pub use train::{train, Termination, TrainOptions, TrainResult};
