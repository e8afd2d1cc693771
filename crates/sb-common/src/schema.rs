//! Model artifact schema versioning.

/// Current schema version for serialized model artifacts.
///
/// Bump on any incompatible change to the artifact layout; loaders reject
/// artifacts written under a different version.
pub const SCHEMA_VERSION: u32 = 1;
