use std::fs;
use std::path::Path;
use std::vec::IntoIter;

use serde::Deserialize;

use crate::capture::domain::landmark_source::{CapturedFrame, LandmarkSource};
use crate::shared::error::TraceError;
use crate::shared::landmark_frame::{LandmarkFrame, LandmarkPoint};

#[derive(Deserialize)]
struct TraceFile {
    frames: Vec<RawFrame>,
}

#[derive(Deserialize)]
struct RawFrame {
    timestamp_ms: i64,
    #[serde(default)]
    landmarks: Vec<Vec<f64>>,
}

/// Replays a recorded landmark trace.
///
/// The file holds `{"frames": [{"timestamp_ms": 0, "landmarks": [[x, y, z], ...]}]}`.
/// Points may omit `z`. A frame with no landmarks stands for "no face".
/// Frames are validated as they are read: coordinates must be finite and
/// timestamps must not go backwards.
pub struct JsonTraceReader {
    frames: IntoIter<RawFrame>,
    frame_count: usize,
    index: usize,
    last_timestamp_ms: Option<i64>,
}

impl JsonTraceReader {
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let text = fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = Self::from_json(&text)?;
        log::info!(
            "Opened trace {} ({} frames)",
            path.display(),
            reader.frame_count
        );
        Ok(reader)
    }

    pub fn from_json(text: &str) -> Result<Self, TraceError> {
        let trace: TraceFile = serde_json::from_str(text).map_err(TraceError::Parse)?;
        Ok(Self {
            frame_count: trace.frames.len(),
            frames: trace.frames.into_iter(),
            index: 0,
            last_timestamp_ms: None,
        })
    }

    /// Total frames in the trace, including ones already read.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn convert(&mut self, raw: RawFrame) -> Result<CapturedFrame, TraceError> {
        let index = self.index;
        self.index += 1;

        if let Some(last) = self.last_timestamp_ms {
            if raw.timestamp_ms < last {
                return Err(malformed(
                    index,
                    format!("timestamp {} precedes {last}", raw.timestamp_ms),
                ));
            }
        }
        self.last_timestamp_ms = Some(raw.timestamp_ms);

        let points = raw
            .landmarks
            .iter()
            .enumerate()
            .map(|(i, coords)| {
                to_point(coords).map_err(|reason| malformed(index, format!("landmark {i}: {reason}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CapturedFrame {
            timestamp_ms: raw.timestamp_ms,
            landmarks: LandmarkFrame::new(points),
        })
    }
}

impl LandmarkSource for JsonTraceReader {
    fn next_frame(&mut self) -> Option<Result<CapturedFrame, TraceError>> {
        let raw = self.frames.next()?;
        Some(self.convert(raw))
    }
}

fn to_point(coords: &[f64]) -> Result<LandmarkPoint, String> {
    let (x, y, z) = match *coords {
        [x, y] => (x, y, 0.0),
        [x, y, z] => (x, y, z),
        _ => return Err(format!("expected 2 or 3 coordinates, got {}", coords.len())),
    };
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err("non-finite coordinate".to_string());
    }
    Ok(LandmarkPoint::new(x, y, z))
}

fn malformed(index: usize, reason: String) -> TraceError {
    TraceError::MalformedFrame { index, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(reader: &mut JsonTraceReader) -> Vec<Result<CapturedFrame, TraceError>> {
        std::iter::from_fn(|| reader.next_frame()).collect()
    }

    #[test]
    fn test_reads_frames_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"frames": [
                {{"timestamp_ms": 0, "landmarks": [[0.1, 0.2, 0.0], [0.3, 0.4]]}},
                {{"timestamp_ms": 33, "landmarks": []}},
                {{"timestamp_ms": 66}}
            ]}}"#
        )
        .unwrap();

        let mut reader = JsonTraceReader::open(file.path()).unwrap();
        assert_eq!(reader.frame_count(), 3);

        let frames: Vec<CapturedFrame> = read_all(&mut reader)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].landmarks.len(), 2);
        assert_eq!(
            frames[0].landmarks.get(1),
            Some(&LandmarkPoint::new(0.3, 0.4, 0.0))
        );
        assert!(frames[1].landmarks.is_empty());
        assert!(frames[2].landmarks.is_empty());
        assert_eq!(frames[2].timestamp_ms, 66);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonTraceReader::open(&dir.path().join("absent.json")).err().unwrap();
        assert!(matches!(err, TraceError::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = JsonTraceReader::from_json("{\"frames\": [").err().unwrap();
        assert!(matches!(err, TraceError::Parse(_)));
    }

    #[test]
    fn test_wrong_arity_is_malformed() {
        let mut reader = JsonTraceReader::from_json(
            r#"{"frames": [{"timestamp_ms": 0, "landmarks": [[0.1]]}]}"#,
        )
        .unwrap();
        let err = reader.next_frame().unwrap().unwrap_err();
        assert!(matches!(err, TraceError::MalformedFrame { index: 0, .. }));
    }

    #[test]
    fn test_backwards_timestamp_is_malformed() {
        let mut reader = JsonTraceReader::from_json(
            r#"{"frames": [{"timestamp_ms": 100}, {"timestamp_ms": 50}]}"#,
        )
        .unwrap();
        let results = read_all(&mut reader);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(TraceError::MalformedFrame { index: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        assert!(to_point(&[f64::NAN, 0.0]).is_err());
        assert!(to_point(&[0.0, f64::INFINITY, 0.0]).is_err());
        assert!(to_point(&[0.5, 0.5]).is_ok());
    }
}
