mod reference;

/// A sha256 digest used throughout the tests.
pub const DIGEST: &str = "sha256:d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240";

/// The hex portion of [`DIGEST`].
pub const HEX: &str = "d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240";
