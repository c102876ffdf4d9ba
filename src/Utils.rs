/// Synthesis task files (JSON, optionally under a SYNTHESIS header)
pub mod load_from_file;
/// Terminal and file logging
pub mod logger;
