//! Configuration loading and validation.

pub mod priors;

pub use priors::{load_priors, Priors};
