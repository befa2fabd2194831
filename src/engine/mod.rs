pub mod htdp;
pub mod mock;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::{self, TransformationResult};
use crate::consts::{INPUT_FILE_NAME, OUTPUT_FILE_NAME};
use crate::error::EngineError;
use crate::request::TransformationRequest;
use crate::script;

/// Everything one completed engine run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineExecution {
    pub stdout: String,
    pub stderr: String,
    pub results: Vec<TransformationResult>,
}

/// The boundary the service talks to. One call = one isolated engine run.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn invoke(
        &self,
        request: &TransformationRequest,
        timeout: Duration,
    ) -> Result<EngineExecution, EngineError>;
}

/// The files and stdin answers for one run inside `work_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub script: Vec<String>,
    pub input_file: String,
}

impl RunPlan {
    pub fn new(request: &TransformationRequest, work_dir: &Path) -> Self {
        let input_path = work_dir.join(INPUT_FILE_NAME);
        let output_path = work_dir.join(OUTPUT_FILE_NAME);
        let script = script::build_script(
            &output_path,
            request.input_frame(),
            request.output_frame(),
            request.input_epoch(),
            request.output_epoch(),
            &input_path,
        );
        Self {
            input_file: codec::encode_points(request.points()),
            input_path,
            output_path,
            script,
        }
    }

    /// The exact bytes fed to the engine's stdin.
    pub fn stdin(&self) -> String {
        script::render(&self.script)
    }
}
