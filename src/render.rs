//! Presentation boundary.
//!
//! The engine never formats markup. It emits `RenderEvent`s to a
//! `RenderSink`, and the UI layer decides how they look.

use serde::Serialize;
use std::io::Write;

use crate::catalog::Recommendation;
use crate::classify::Prediction;
use crate::detect::BoundingBox;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    NoModelSelected,
    NoFaceDetected,
    FaceTooSmall,
    LowConfidence,
    AnalysisError,
    InvalidInput,
    InitializationFailed,
    ModelActivated,
    AnalysisRunning,
    AnalysisStopped,
    SourceChanged,
    ManualSelection,
}

impl AdvisoryKind {
    /// Warnings and errors, as opposed to status notices.
    pub fn is_warning(self) -> bool {
        !matches!(
            self,
            AdvisoryKind::ModelActivated
                | AdvisoryKind::AnalysisRunning
                | AdvisoryKind::AnalysisStopped
                | AdvisoryKind::SourceChanged
                | AdvisoryKind::ManualSelection
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenderEvent {
    ShowAdvisory {
        kind: AdvisoryKind,
        detail: String,
    },
    /// Every class of the active model, best first.
    ShowRankedResults {
        model: String,
        predictions: Vec<Prediction>,
    },
    ShowRecommendation(Recommendation),
    /// Live overlay: outline of the face a pass located.
    ShowFace { bbox: BoundingBox },
}

impl RenderEvent {
    pub fn advisory(kind: AdvisoryKind, detail: impl Into<String>) -> Self {
        RenderEvent::ShowAdvisory {
            kind,
            detail: detail.into(),
        }
    }

    pub fn advisory_kind(&self) -> Option<AdvisoryKind> {
        match self {
            RenderEvent::ShowAdvisory { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Subscriber on the presentation side.
pub trait RenderSink {
    fn render(&mut self, event: RenderEvent);
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn render(&mut self, event: RenderEvent) {
        (**self).render(event)
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<RenderEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn last(&self) -> Option<&RenderEvent> {
        self.events.last()
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, event: RenderEvent) {
        self.events.push(event);
    }
}

/// Writes one JSON object per event.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn render(&mut self, event: RenderEvent) {
        let written = serde_json::to_writer(&mut self.out, &event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::error!("failed to write render event: {}", e);
        }
    }
}
