use petal_core::vision::{is_blurry, Classifier, Frame, FrameSource, VisionError};
use petal_store::{CareGuideStore, StoreError, NO_INFO};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Vision(#[from] VisionError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// What the shell shows for the current flower.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub label: String,
    /// `None` when the flower was picked by hand from search.
    pub confidence: Option<f32>,
    pub care: Option<String>,
    pub blurry: Option<bool>,
}

impl Recognition {
    pub fn manual(store: &CareGuideStore, name: &str) -> Result<Recognition, StoreError> {
        Ok(Recognition {
            label: name.to_string(),
            confidence: None,
            care: store.lookup(name)?,
            blurry: None,
        })
    }

    pub fn detected_line(&self) -> String {
        match self.confidence {
            Some(confidence) => format!("Detected: {} ({:.2})", self.label, confidence),
            None => format!("Detected: {} (Manual)", self.label),
        }
    }

    pub fn care_line(&self) -> String {
        format!("Care Tips: {}", self.care.as_deref().unwrap_or(NO_INFO))
    }

    pub fn quality_line(&self) -> Option<String> {
        self.blurry.map(quality_line)
    }

    /// Text handed to the speech worker.
    pub fn readout(&self) -> String {
        format!("{}. {}", self.detected_line(), self.care_line())
    }
}

pub fn quality_line(blurry: bool) -> String {
    if blurry {
        "Image Quality: Blurry".to_string()
    } else {
        "Image Quality: OK".to_string()
    }
}

pub fn recognize(
    classifier: &dyn Classifier,
    store: &CareGuideStore,
    blur_threshold: f64,
    frame: &Frame,
) -> Result<Recognition, SessionError> {
    let prediction = classifier.predict(frame)?;
    let blurry = is_blurry(frame, blur_threshold);
    let care = store.lookup(&prediction.label)?;
    Ok(Recognition {
        label: prediction.label,
        confidence: Some(prediction.confidence),
        care,
        blurry: Some(blurry),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// No frame this tick; keep showing whatever was shown before.
    Idle,
    /// A frame arrived but nothing can classify it.
    Quality(bool),
    Recognized(Recognition),
    Failed(String),
}

/// Limits how often frames are pulled and skips re-classifying the file that
/// was classified last.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: Duration,
    last_run: Option<Instant>,
    last_path: Option<PathBuf>,
}

impl FrameGate {
    pub fn new(interval: Duration) -> FrameGate {
        FrameGate {
            interval,
            last_run: None,
            last_path: None,
        }
    }

    /// Forgets the last classified file, so a new source starts fresh.
    pub fn reset(&mut self) {
        self.last_run = None;
        self.last_path = None;
    }

    fn open(&mut self, now: Instant) -> bool {
        let due = self
            .last_run
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last_run = Some(now);
        }
        due
    }

    fn is_repeat(&mut self, frame: &Frame) -> bool {
        match &frame.path {
            Some(path) if self.last_path.as_ref() == Some(path) => true,
            path => {
                self.last_path = path.clone();
                false
            }
        }
    }
}

/// Runs one frame through the pipeline. Collaborator failures come back as
/// `Tick::Failed` so the caller's loop keeps running.
pub fn run_tick(
    source: &mut dyn FrameSource,
    classifier: Option<&dyn Classifier>,
    store: &CareGuideStore,
    blur_threshold: f64,
    gate: &mut FrameGate,
    now: Instant,
) -> Tick {
    if !gate.open(now) {
        return Tick::Idle;
    }
    let frame = match source.next_frame() {
        Ok(Some(frame)) => frame,
        Ok(None) => return Tick::Idle,
        Err(err) => {
            warn!(error = %err, "skipping frame");
            return Tick::Failed(err.to_string());
        }
    };
    if gate.is_repeat(&frame) {
        return Tick::Idle;
    }
    let Some(classifier) = classifier else {
        return Tick::Quality(is_blurry(&frame, blur_threshold));
    };
    match recognize(classifier, store, blur_threshold, &frame) {
        Ok(recognition) => {
            debug!(label = %recognition.label, "recognized frame");
            Tick::Recognized(recognition)
        }
        Err(err) => {
            warn!(error = %err, "recognition failed");
            Tick::Failed(err.to_string())
        }
    }
}
