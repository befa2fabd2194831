//! Project-wide constants.

use std::time::Duration;

/// Default location of the compiled HTDP binary, relative to the cwd.
pub const DEFAULT_BINARY: &str = "./htdp";

/// Default wall-clock budget for a single engine invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Earliest epoch the HTDP velocity models are valid for (decimal year).
pub const MIN_EPOCH: f64 = 1906.0;

/// Longest point name the engine keeps.
pub const MAX_POINT_NAME_CHARS: usize = 24;

/// Prefix of the temporary working directory created per invocation.
pub const WORK_DIR_PREFIX: &str = "htdp_";

/// File names inside the working directory.
pub const INPUT_FILE_NAME: &str = "points.txt";
pub const OUTPUT_FILE_NAME: &str = "results.txt";
