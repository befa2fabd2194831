//! Point files exchanged with HTDP.
//!
//! Both files use positive-WEST longitude; everything else in this crate is
//! positive-east. The flip happens exactly once on the way in
//! ([`encode_points`]) and once on the way out ([`parse_data_line`]).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::request::GeodeticPoint;

/// Banner prefixes HTDP writes between data rows.
const BANNER_MARKERS: &[&str] = &["TRANSFORMING", "***"];

/// Minimum tokens on a data row: lat, west lon, height, name.
const MIN_DATA_TOKENS: usize = 4;

/// One transformed point read back from the engine. Longitude is positive east.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ellipsoid_height: f64,
}

/// Render points as `lat,westLon,height,name` lines, one per point.
pub fn encode_points(points: &[GeodeticPoint]) -> String {
    let mut out = String::new();
    for point in points {
        // 0.0 - x keeps a zero longitude from printing as -0.000...
        let west_longitude = 0.0 - point.longitude();
        out.push_str(&format!(
            "{:.12},{:.12},{:.4},{}\n",
            point.latitude(),
            west_longitude,
            point.ellipsoid_height(),
            point.name()
        ));
    }
    out
}

/// Lines HTDP uses as section headers rather than data.
pub fn is_banner(line: &str) -> bool {
    BANNER_MARKERS.iter().any(|marker| line.starts_with(marker))
}

/// Noise policy for the output file: a line is data only if it is not a
/// banner, has at least four tokens and its first three parse as numbers.
/// Anything else is narrative text and yields `None`. Must stay lenient:
/// HTDP mixes free text into the same file.
pub fn parse_data_line(line: &str) -> Option<TransformationResult> {
    let line = line.trim();
    if line.is_empty() || is_banner(line) {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_DATA_TOKENS {
        return None;
    }

    let latitude = tokens[0].parse::<f64>().ok()?;
    let west_longitude = tokens[1].parse::<f64>().ok()?;
    let ellipsoid_height = tokens[2].parse::<f64>().ok()?;

    Some(TransformationResult {
        name: tokens[3..].join(" "),
        latitude,
        longitude: -west_longitude,
        ellipsoid_height,
    })
}

/// Decode every data row of an output file, in file order.
pub fn decode_output(text: &str) -> Vec<TransformationResult> {
    text.lines().filter_map(parse_data_line).collect()
}

/// Read and decode the engine's output file. Invalid UTF-8 is replaced, not
/// rejected. An existing file with no data rows decodes to an empty list.
pub async fn read_output_file(path: &Path) -> Result<Vec<TransformationResult>, EngineError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EngineError::MissingOutputFile(path.to_path_buf()));
        }
        Err(e) => {
            return Err(EngineError::io(format!("failed to read {}", path.display()), e));
        }
    };
    Ok(decode_output(&String::from_utf8_lossy(&bytes)))
}
