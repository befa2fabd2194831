//! The operations a hosting layer exposes: health, frame listing, transform.
//!
//! This is the only place typed errors become the transport shape
//! ([`ServiceError`]: kind + message, plus the transcript for engine failures).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{Engine, EngineExecution, RunPlan};
use crate::error::{EngineError, ErrorKind, ValidationError, Violation};
use crate::frames::{self, FrameEntry, FrameRegistry};
use crate::request::{RawTransformationRequest, TransformationRequest};

/// Static readiness signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// A failure as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ServiceError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            violations: Vec::new(),
            stdout: None,
            stderr: None,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ServiceError {}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self {
            violations: err.violations.clone(),
            ..Self::new(ErrorKind::Validation, err.to_string())
        }
    }
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            EngineError::ExecutionFailed { stdout, stderr, .. } => Self {
                stdout: Some(stdout),
                stderr: Some(stderr),
                ..Self::new(kind, message)
            },
            _ => Self::new(kind, message),
        }
    }
}

/// Health, frames and transform over one engine.
pub struct Service {
    engine: Arc<dyn Engine>,
    registry: &'static FrameRegistry,
    timeout: Duration,
}

impl Service {
    pub fn new(engine: Arc<dyn Engine>, timeout: Duration) -> Self {
        Self {
            engine,
            registry: frames::registry(),
            timeout,
        }
    }

    pub fn health(&self) -> Health {
        Health {
            status: "ok".to_string(),
        }
    }

    pub fn frames(&self) -> Vec<FrameEntry> {
        self.registry.list()
    }

    /// Parse a JSON request payload. Malformed JSON is a validation failure.
    pub fn parse_payload(&self, payload: &str) -> Result<RawTransformationRequest, ServiceError> {
        serde_json::from_str(payload).map_err(|e| {
            ServiceError::new(ErrorKind::Validation, format!("malformed request payload: {e}"))
        })
    }

    pub fn validate(&self, raw: &RawTransformationRequest) -> Result<TransformationRequest, ServiceError> {
        Ok(raw.validate_with(self.registry)?)
    }

    /// Validate, then run the engine once. Validation failures never spawn it.
    pub async fn transform(
        &self,
        raw: &RawTransformationRequest,
    ) -> Result<EngineExecution, ServiceError> {
        let request = self.validate(raw)?;
        self.engine
            .invoke(&request, self.timeout)
            .await
            .map_err(|err| {
                warn!(kind = %err.kind(), error = %err, "transformation failed");
                ServiceError::from(err)
            })
    }

    /// What a run would feed the engine, without running it.
    pub fn plan(
        &self,
        raw: &RawTransformationRequest,
        work_dir: &Path,
    ) -> Result<RunPlan, ServiceError> {
        let request = self.validate(raw)?;
        Ok(RunPlan::new(&request, work_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TransformationResult;
    use crate::engine::mock::MockEngine;
    use crate::error::EngineUnavailable;
    use std::path::PathBuf;

    const DENVER: &str = r#"{
        "input_frame": 1,
        "output_frame": "itrf2014",
        "input_epoch": 2005.0,
        "output_epoch": 2020.0,
        "points": [{"name": "Denver", "latitude": 39.0, "longitude": -104.0, "ellipsoid_height": 1600.0}]
    }"#;

    fn service(outcomes: Vec<Result<EngineExecution, EngineError>>) -> (Service, Arc<MockEngine>) {
        let engine = Arc::new(MockEngine::new(outcomes));
        (
            Service::new(engine.clone(), Duration::from_secs(5)),
            engine,
        )
    }

    #[test]
    fn health_is_ok() {
        let (svc, _) = service(vec![]);
        assert_eq!(svc.health().status, "ok");
        let json = serde_json::to_string(&svc.health()).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }

    #[test]
    fn frames_are_listed_in_index_order() {
        let (svc, _) = service(vec![]);
        let frames = svc.frames();
        assert_eq!(frames.first().map(|f| f.index), Some(1));
        assert_eq!(frames.last().map(|f| f.index), Some(26));
    }

    #[tokio::test]
    async fn transform_returns_engine_execution() {
        let execution = EngineExecution {
            stdout: "banner".into(),
            stderr: String::new(),
            results: vec![TransformationResult {
                name: "Denver".into(),
                latitude: 39.0000001,
                longitude: -104.0000002,
                ellipsoid_height: 1599.98,
            }],
        };
        let (svc, engine) = service(vec![Ok(execution.clone())]);

        let raw = svc.parse_payload(DENVER).unwrap();
        let got = svc.transform(&raw).await.unwrap();
        assert_eq!(got, execution);
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_engine() {
        let (svc, engine) = service(vec![]);
        let mut raw = svc.parse_payload(DENVER).unwrap();
        raw.input_epoch = 1900.0;
        raw.points.clear();

        let err = svc.transform(&raw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.violations.len(), 2);
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn malformed_payload_is_validation_error() {
        let (svc, _) = service(vec![]);
        let err = svc.parse_payload("{\"input_frame\": ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("malformed"));
    }

    #[tokio::test]
    async fn execution_failure_carries_transcript() {
        let (svc, _) = service(vec![Err(EngineError::ExecutionFailed {
            code: Some(1),
            stdout: "menu text".into(),
            stderr: "forrtl: severe".into(),
        })]);
        let raw = svc.parse_payload(DENVER).unwrap();

        let err = svc.transform(&raw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EngineFailed);
        assert_eq!(err.stdout.as_deref(), Some("menu text"));
        assert_eq!(err.stderr.as_deref(), Some("forrtl: severe"));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "engine-failed");
    }

    #[tokio::test]
    async fn other_engine_errors_map_to_kinds() {
        let (svc, _) = service(vec![
            Err(EngineUnavailable::NotFound(PathBuf::from("./htdp")).into()),
            Err(EngineError::Timeout {
                limit: Duration::from_secs(5),
            }),
            Err(EngineError::MissingOutputFile(PathBuf::from("results.txt"))),
        ]);
        let raw = svc.parse_payload(DENVER).unwrap();

        let kinds = [
            ErrorKind::EngineUnavailable,
            ErrorKind::EngineTimeout,
            ErrorKind::MissingOutput,
        ];
        for expected in kinds {
            let err = svc.transform(&raw).await.unwrap_err();
            assert_eq!(err.kind, expected);
            assert!(err.stdout.is_none());
            let json = serde_json::to_value(&err).unwrap();
            assert!(json.get("stdout").is_none());
        }
    }

    #[test]
    fn plan_uses_given_work_dir() {
        let (svc, engine) = service(vec![]);
        let raw = svc.parse_payload(DENVER).unwrap();
        let plan = svc.plan(&raw, Path::new("/scratch")).unwrap();
        assert_eq!(plan.script[1], "/scratch/results.txt");
        assert_eq!(plan.script[3], "25");
        assert_eq!(engine.calls(), 0);
    }
}
