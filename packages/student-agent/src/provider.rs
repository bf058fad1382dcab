//! Landmark sources for the frame loop.
//!
//! The agent does not run a face-mesh model itself; it consumes frames from
//! any [`LandmarkProvider`]. The bundled provider reads newline-delimited JSON,
//! one frame per line: `{"width":640,"height":480,"points":[[x,y,z],...]}`.
//! `"points":null`, or a bare `null` line, marks a frame with no face.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use attention_signals::{LandmarkFrame, Point3D};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read landmarks: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: malformed landmark frame: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// A malformed line is skipped; an I/O failure ends the stream.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// What the camera saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Face(LandmarkFrame),
    NoFace,
}

impl Capture {
    pub fn frame(&self) -> Option<&LandmarkFrame> {
        match self {
            Self::Face(frame) => Some(frame),
            Self::NoFace => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Xyz([f64; 3]),
    Xy([f64; 2]),
    Named(Point3D),
}

impl From<RawPoint> for Point3D {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Xyz([x, y, z]) => Point3D::new(x, y, z),
            RawPoint::Xy([x, y]) => Point3D::new(x, y, 0.0),
            RawPoint::Named(p) => p,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    width: u32,
    height: u32,
    points: Option<Vec<RawPoint>>,
}

impl From<RawFrame> for Capture {
    fn from(raw: RawFrame) -> Self {
        match raw.points {
            Some(points) => Capture::Face(LandmarkFrame::new(
                raw.width,
                raw.height,
                points.into_iter().map(Point3D::from).collect(),
            )),
            None => Capture::NoFace,
        }
    }
}

pub trait LandmarkProvider: Send {
    /// Next frame, or `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Capture>, ProviderError>;
}

pub struct NdjsonLandmarkProvider<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> NdjsonLandmarkProvider<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl NdjsonLandmarkProvider<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ProviderError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead + Send> LandmarkProvider for NdjsonLandmarkProvider<R> {
    fn next_frame(&mut self) -> Result<Option<Capture>, ProviderError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let parsed: Option<RawFrame> = serde_json::from_str(text)
                .map_err(|source| ProviderError::Parse { line: self.line, source })?;
            return Ok(Some(parsed.map_or(Capture::NoFace, Capture::from)));
        }
    }
}

/// Opens `path` as an NDJSON provider; `-` reads standard input.
pub fn open_provider(path: &Path) -> Result<Box<dyn LandmarkProvider>, ProviderError> {
    if path.as_os_str() == "-" {
        Ok(Box::new(NdjsonLandmarkProvider::new(BufReader::new(io::stdin()))))
    } else {
        Ok(Box::new(NdjsonLandmarkProvider::open(path)?))
    }
}
