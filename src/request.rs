//! Transformation requests: the raw payload and its validated form.
//!
//! Validation runs every check and reports all violations at once, so a
//! caller fixing a payload sees the whole list in one round trip. Nothing in
//! here touches the engine.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_POINT_NAME_CHARS, MIN_EPOCH};
use crate::error::{ValidationError, Violation};
use crate::frames::{self, FrameId, FrameRegistry};

/// A point as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub ellipsoid_height: f64,
}

/// A transformation request as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransformationRequest {
    pub input_frame: FrameId,
    pub output_frame: FrameId,
    pub input_epoch: f64,
    pub output_epoch: f64,
    #[serde(default)]
    pub points: Vec<RawPoint>,
}

/// A validated geodetic position. Longitude is positive east.
#[derive(Debug, Clone, PartialEq)]
pub struct GeodeticPoint {
    name: String,
    latitude: f64,
    longitude: f64,
    ellipsoid_height: f64,
}

impl GeodeticPoint {
    pub fn new(
        name: &str,
        latitude: f64,
        longitude: f64,
        ellipsoid_height: f64,
    ) -> Result<Self, ValidationError> {
        let raw = RawPoint {
            name: name.to_string(),
            latitude,
            longitude,
            ellipsoid_height,
        };
        let mut violations = Vec::new();
        let point = check_point(&raw, "point", &mut violations);
        match point {
            Some(point) if violations.is_empty() => Ok(point),
            _ => Err(ValidationError { violations }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn ellipsoid_height(&self) -> f64 {
        self.ellipsoid_height
    }
}

/// A request that passed validation. Frames are resolved menu indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationRequest {
    input_frame: u32,
    output_frame: u32,
    input_epoch: f64,
    output_epoch: f64,
    points: Vec<GeodeticPoint>,
}

impl TransformationRequest {
    pub fn input_frame(&self) -> u32 {
        self.input_frame
    }

    pub fn output_frame(&self) -> u32 {
        self.output_frame
    }

    pub fn input_epoch(&self) -> f64 {
        self.input_epoch
    }

    pub fn output_epoch(&self) -> f64 {
        self.output_epoch
    }

    pub fn points(&self) -> &[GeodeticPoint] {
        &self.points
    }
}

impl RawTransformationRequest {
    /// Validate against the process-wide frame registry.
    pub fn validate(&self) -> Result<TransformationRequest, ValidationError> {
        self.validate_with(frames::registry())
    }

    pub fn validate_with(
        &self,
        registry: &FrameRegistry,
    ) -> Result<TransformationRequest, ValidationError> {
        let mut violations = Vec::new();

        let input_frame = check_frame(registry, &self.input_frame, "input_frame", &mut violations);
        let output_frame =
            check_frame(registry, &self.output_frame, "output_frame", &mut violations);
        check_epoch(self.input_epoch, "input_epoch", &mut violations);
        check_epoch(self.output_epoch, "output_epoch", &mut violations);

        if self.points.is_empty() {
            violations.push(Violation::new("points", "at least one point is required"));
        }
        let points: Vec<GeodeticPoint> = self
            .points
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| check_point(raw, &format!("points[{i}]"), &mut violations))
            .collect();

        match (input_frame, output_frame) {
            (Some(input_frame), Some(output_frame)) if violations.is_empty() => {
                Ok(TransformationRequest {
                    input_frame,
                    output_frame,
                    input_epoch: self.input_epoch,
                    output_epoch: self.output_epoch,
                    points,
                })
            }
            _ => Err(ValidationError { violations }),
        }
    }
}

fn check_frame(
    registry: &FrameRegistry,
    id: &FrameId,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<u32> {
    registry
        .resolve(id)
        .map_err(|err| violations.push(Violation::new(field, err.to_string())))
        .ok()
}

fn check_epoch(epoch: f64, field: &str, violations: &mut Vec<Violation>) {
    if !epoch.is_finite() || epoch < MIN_EPOCH {
        violations.push(Violation::new(
            field,
            format!("epoch must be {MIN_EPOCH:.1} or later (HTDP model validity constraint)"),
        ));
    }
}

fn check_point(raw: &RawPoint, prefix: &str, violations: &mut Vec<Violation>) -> Option<GeodeticPoint> {
    let before = violations.len();

    let name = raw.name.trim();
    let name_chars = name.chars().count();
    if name_chars > MAX_POINT_NAME_CHARS {
        violations.push(Violation::new(
            format!("{prefix}.name"),
            format!("must be at most {MAX_POINT_NAME_CHARS} characters (got {name_chars})"),
        ));
    }
    // One point per line in the input file.
    if name.chars().any(char::is_control) {
        violations.push(Violation::new(
            format!("{prefix}.name"),
            "must not contain control characters such as line breaks",
        ));
    }
    check_range(raw.latitude, -90.0, 90.0, &format!("{prefix}.latitude"), violations);
    check_range(raw.longitude, -360.0, 360.0, &format!("{prefix}.longitude"), violations);
    if !raw.ellipsoid_height.is_finite() {
        violations.push(Violation::new(
            format!("{prefix}.ellipsoid_height"),
            "must be a finite number",
        ));
    }

    (violations.len() == before).then(|| GeodeticPoint {
        name: name.to_string(),
        latitude: raw.latitude,
        longitude: raw.longitude,
        ellipsoid_height: raw.ellipsoid_height,
    })
}

fn check_range(value: f64, min: f64, max: f64, field: &str, violations: &mut Vec<Violation>) {
    if !(min..=max).contains(&value) {
        violations.push(Violation::new(
            field,
            format!("must be between {min} and {max} degrees (got {value})"),
        ));
    }
}
