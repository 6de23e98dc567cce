//! Frame capture state machine. The actual buffering and encoding is done by
//! a [`FrameSink`]; this module only decides when frames go into it.
//!
//! While a capture runs, time is frame-locked: frame `n` sits at
//! `n / framerate` seconds on the recording's timeline, however long the
//! browser took to render it.

use crate::config::CaptureConfig;
use crate::error::Result;

/// Position of one captured frame on the recording's timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStamp {
    pub index: u64,
    pub timestamp_us: f64,
}

/// Destination for captured frames.
pub trait FrameSink {
    /// Begins a new capture buffer.
    fn start(&mut self) -> Result<()>;
    /// Appends the frame that was just rendered.
    fn capture(&mut self, stamp: FrameStamp) -> Result<()>;
    /// Finalizes the buffer and persists it under `file_name`.
    fn save(&mut self, file_name: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureStatus {
    Idle,
    Capturing {
        started_at_ms: f64,
        /// Loop time (seconds) of the first captured frame.
        origin_seconds: f64,
        frames: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSummary {
    pub file_name: String,
    pub frames: u64,
    pub started_at_ms: f64,
    /// Length of the recorded timeline: `frames / framerate`.
    pub duration_ms: f64,
    /// Wall time between start and stop.
    pub wall_ms: f64,
}

pub struct Recorder<S> {
    sink: S,
    settings: CaptureConfig,
    status: CaptureStatus,
}

impl<S: FrameSink> Recorder<S> {
    pub fn new(sink: S, settings: CaptureConfig) -> Self {
        Self {
            sink,
            settings,
            status: CaptureStatus::Idle,
        }
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.status, CaptureStatus::Capturing { .. })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn framerate(&self) -> f64 {
        self.settings.framerate.max(1) as f64
    }

    /// Loop time of the next frame to be captured, or `None` when idle.
    pub fn locked_elapsed(&self) -> Option<f64> {
        match self.status {
            CaptureStatus::Idle => None,
            CaptureStatus::Capturing {
                origin_seconds,
                frames,
                ..
            } => Some(origin_seconds + frames as f64 / self.framerate()),
        }
    }

    /// Starts buffering. `elapsed_seconds` becomes the loop time of the first
    /// captured frame. Returns `Ok(false)` without touching the sink when a
    /// capture is already running.
    pub fn start(&mut self, now_ms: f64, elapsed_seconds: f64) -> Result<bool> {
        if self.is_capturing() {
            return Ok(false);
        }
        self.sink.start()?;
        self.status = CaptureStatus::Capturing {
            started_at_ms: now_ms,
            origin_seconds: elapsed_seconds,
            frames: 0,
        };
        log::info!(
            "capture started ({} @ {} fps)",
            self.settings.format,
            self.settings.framerate
        );
        Ok(true)
    }

    /// Forwards the current frame to the sink while capturing.
    pub fn capture_frame(&mut self) -> Result<bool> {
        let framerate = self.framerate();
        let CaptureStatus::Capturing { frames, .. } = &mut self.status else {
            return Ok(false);
        };
        let stamp = FrameStamp {
            index: *frames,
            timestamp_us: *frames as f64 * 1_000_000.0 / framerate,
        };
        self.sink.capture(stamp)?;
        *frames += 1;
        if self.settings.verbose {
            log::debug!("captured frame {} at {:.0}us", stamp.index, stamp.timestamp_us);
        }
        Ok(true)
    }

    /// Ends the capture and saves it. Returns `Ok(None)` when idle. The
    /// capturing flag is cleared before saving, so a failed save does not
    /// leave the recorder stuck.
    pub fn stop(&mut self, now_ms: f64) -> Result<Option<CaptureSummary>> {
        let CaptureStatus::Capturing {
            started_at_ms,
            frames,
            ..
        } = self.status
        else {
            return Ok(None);
        };
        self.status = CaptureStatus::Idle;

        let file_name = format!(
            "capture-{}.{}",
            started_at_ms.max(0.0) as u64,
            self.settings.format
        );
        self.sink.save(&file_name)?;

        let summary = CaptureSummary {
            file_name,
            frames,
            started_at_ms,
            duration_ms: frames as f64 * 1000.0 / self.framerate(),
            wall_ms: (now_ms - started_at_ms).max(0.0),
        };
        log::info!(
            "capture saved: {} ({} frames, {:.2}s at {} fps)",
            summary.file_name,
            summary.frames,
            summary.duration_ms / 1000.0,
            self.settings.framerate
        );
        Ok(Some(summary))
    }
}
