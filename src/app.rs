//! The controller: owns the session, the loaded collaborators and the render
//! sink, and turns user actions into pipeline passes.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::capture::Camera;
use crate::catalog::{Catalog, Category, Recommendation};
use crate::classify::ModelSlot;
use crate::detect::FaceLocator;
use crate::error::StyleError;
use crate::frame::Frame;
use crate::loader::ModelLoader;
use crate::pipeline::{PassOutcome, PassReport, Pipeline};
use crate::render::{AdvisoryKind, RenderEvent, RenderSink};
use crate::session::{CaptureSource, PassTicket, Session, SourceChange, Toggle};

pub struct StyleMate<S: RenderSink> {
    loader: Box<dyn ModelLoader>,
    catalog: Arc<Catalog>,
    sink: S,
    session: Session,
    pipeline: Option<Pipeline>,
    camera: Option<Camera>,
    upload: Option<Frame>,
}

impl<S: RenderSink> StyleMate<S> {
    pub fn new(loader: Box<dyn ModelLoader>, catalog: Catalog, sink: S) -> Self {
        Self {
            loader,
            catalog: Arc::new(catalog),
            sink,
            session: Session::new(),
            pipeline: None,
            camera: None,
            upload: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_initialized(&self) -> bool {
        self.pipeline.is_some()
    }

    /// True when models are loaded but no face detector is.
    pub fn is_degraded(&self) -> bool {
        self.pipeline
            .as_ref()
            .map(|p| p.locator().is_degraded())
            .unwrap_or(false)
    }

    /// Load classifiers and detector. Idempotent once it has succeeded.
    pub fn initialize(&mut self) -> Result<()> {
        self.ensure_pipeline().map_err(|e| self.initialization_failed(e))
    }

    /// Start, pause or resume the live loop.
    pub fn toggle_running(&mut self) -> Result<Toggle> {
        let toggle = self.session.request_toggle();
        match toggle {
            Toggle::Ignored => {}
            Toggle::Start => {
                let started = self.start_live();
                let outcome = started.as_ref().map(|_| ()).map_err(|e| e.to_string());
                if !self.session.finish_start(outcome) {
                    return Ok(Toggle::Ignored);
                }
                started.map_err(|e| self.initialization_failed(e))?;
                self.advise(AdvisoryKind::AnalysisRunning, "Live analysis running.");
            }
            Toggle::Pause => {
                if let Some(camera) = self.camera.as_mut() {
                    camera.pause();
                }
                self.advise(AdvisoryKind::AnalysisStopped, "Analysis stopped.");
            }
            Toggle::Resume => {
                if let Some(camera) = self.camera.as_mut() {
                    camera.resume();
                }
                self.advise(AdvisoryKind::AnalysisRunning, "Live analysis running.");
            }
        }
        Ok(toggle)
    }

    /// Stop the live loop (e.g. on interrupt). Returns false if it was idle.
    pub fn stop(&mut self) -> bool {
        if !self.session.stop_live() {
            return false;
        }
        if let Some(camera) = self.camera.as_mut() {
            camera.pause();
        }
        self.advise(AdvisoryKind::AnalysisStopped, "Analysis stopped.");
        true
    }

    /// One live tick: grab a frame, run a pass, render if still current.
    ///
    /// `Ok(None)` when the loop is not running or the pass went stale.
    pub fn tick(&mut self) -> Result<Option<PassOutcome>> {
        let Some((ticket, report)) = self.begin_live_pass()? else {
            return Ok(None);
        };
        let outcome = report.outcome.clone();
        Ok(self.complete_pass(&ticket, report).then_some(outcome))
    }

    /// Run a live pass without rendering it.
    pub fn begin_live_pass(&mut self) -> Result<Option<(PassTicket, PassReport)>> {
        let Some(ticket) = self.session.live_ticket() else {
            return Ok(None);
        };
        let frame = match self.camera.as_mut().map(Camera::next_frame) {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                let err = StyleError::initialization("capture", &e);
                self.session.halt_live(err.to_string());
                self.advise(AdvisoryKind::InitializationFailed, err.to_string());
                return Err(err.into());
            }
            None => return Err(anyhow!("live loop is running without a capture source")),
        };
        let pipeline = self
            .pipeline
            .as_mut()
            .ok_or_else(|| anyhow!("live loop is running without loaded models"))?;
        let report = pipeline.run(ticket.slot(), &frame);
        Ok(Some((ticket, report)))
    }

    /// Render a pass's events if the state that issued it still holds.
    ///
    /// Live passes that located a face lead with a `ShowFace` overlay.
    pub fn complete_pass(&mut self, ticket: &PassTicket, report: PassReport) -> bool {
        if !self.session.is_current(ticket) {
            log::debug!("discarding stale pass result {:?}", report.outcome);
            return false;
        }
        log::debug!("pass outcome {:?}", report.outcome);
        if ticket.source() == CaptureSource::Live && !self.is_degraded() {
            if let Some(bbox) = report.face {
                self.sink.render(RenderEvent::ShowFace { bbox });
            }
        }
        for event in report.events {
            self.sink.render(event);
        }
        true
    }

    pub fn switch_source(&mut self, source: CaptureSource) -> SourceChange {
        let change = self.session.switch_source(source);
        if let SourceChange::Switched { stopped_live } = change {
            if stopped_live {
                if let Some(camera) = self.camera.as_mut() {
                    camera.pause();
                }
            }
            self.upload = None;
            let detail = match source {
                CaptureSource::Live => "Live capture selected. Start the analysis to begin.",
                CaptureSource::Upload => "Upload mode selected. Upload an image to analyse.",
            };
            self.advise(AdvisoryKind::SourceChanged, detail);
        }
        change
    }

    /// Activate a classifier slot. Allowed before initialization.
    pub fn switch_model(&mut self, slot: ModelSlot) -> bool {
        if !self.session.switch_model(slot) {
            return false;
        }
        self.advise(
            AdvisoryKind::ModelActivated,
            format!("Model {} ({}) is active.", slot.index(), slot.display_name()),
        );
        true
    }

    pub fn switch_model_index(&mut self, index: u8) -> Result<bool> {
        let slot = ModelSlot::from_index(index).ok_or_else(|| {
            StyleError::InvalidInput(format!("model slot must be 1 or 2, got {}", index))
        })?;
        Ok(self.switch_model(slot))
    }

    /// Accept uploaded bytes. Switches to upload mode if needed.
    pub fn load_upload(&mut self, bytes: &[u8]) -> Result<[u8; 32]> {
        if self.session.source() != CaptureSource::Upload {
            self.switch_source(CaptureSource::Upload);
        }
        match Frame::decode(bytes) {
            Ok(frame) => {
                let fingerprint = frame.fingerprint();
                log::info!(
                    "upload {}x{} fingerprint {}",
                    frame.width(),
                    frame.height(),
                    &hex::encode(fingerprint)[..16]
                );
                self.session.mark_upload_ready(fingerprint);
                self.upload = Some(frame);
                Ok(fingerprint)
            }
            Err(e) => {
                self.upload = None;
                self.session.clear_upload();
                let detail = match e.downcast_ref::<StyleError>() {
                    Some(StyleError::InvalidInput(message)) => message.clone(),
                    _ => format!("{:#}", e),
                };
                self.advise(AdvisoryKind::InvalidInput, detail);
                Err(e)
            }
        }
    }

    pub fn load_upload_path<P: AsRef<Path>>(&mut self, path: P) -> Result<[u8; 32]> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        self.load_upload(&bytes)
    }

    /// One-shot pass over the loaded upload with the active slot.
    pub fn process_upload(&mut self) -> Result<PassOutcome> {
        if self.session.active_slot().is_none() {
            self.advise(
                AdvisoryKind::NoModelSelected,
                "Select a model before starting the analysis.",
            );
            return Err(StyleError::NoModelSelected.into());
        }
        let Some(frame) = self.upload.clone() else {
            let err = StyleError::InvalidInput("no uploaded image; select a file first".to_string());
            self.advise(AdvisoryKind::InvalidInput, err.to_string());
            return Err(err.into());
        };
        self.initialize()?;

        let ticket = self
            .session
            .upload_ticket()
            .ok_or_else(|| anyhow!("upload pass requested outside upload mode"))?;
        let pipeline = self
            .pipeline
            .as_mut()
            .ok_or_else(|| anyhow!("pipeline not initialized"))?;
        let report = pipeline.run(ticket.slot(), &frame);
        let outcome = report.outcome.clone();
        if self.complete_pass(&ticket, report) {
            if let Some(slot) = ticket.slot() {
                self.session.mark_upload_processed(slot);
            }
        }
        Ok(outcome)
    }

    /// Manual override: straight to the catalog, whatever the session state.
    pub fn manual_select(&mut self, category: Category, label: &str) -> Result<Recommendation> {
        let recommendation = self.catalog.lookup(category, label)?;
        self.advise(
            AdvisoryKind::ManualSelection,
            format!("Manually selected: {}", label),
        );
        self.sink
            .render(RenderEvent::ShowRecommendation(recommendation.clone()));
        Ok(recommendation)
    }

    fn start_live(&mut self) -> std::result::Result<(), StyleError> {
        self.ensure_pipeline()?;
        if self.camera.is_none() {
            let camera = self
                .loader
                .open_capture()
                .map_err(|e| StyleError::initialization("capture", &e))?;
            self.camera = Some(camera);
        }
        if let Some(camera) = self.camera.as_mut() {
            if let Err(e) = camera.start() {
                // Reopen on the next start so a source that appears later is picked up.
                self.camera = None;
                return Err(StyleError::initialization("capture", &e));
            }
        }
        Ok(())
    }

    fn ensure_pipeline(&mut self) -> std::result::Result<(), StyleError> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        let classifiers = self
            .loader
            .load_classifiers()
            .map_err(|e| StyleError::initialization("classifier models", &e))?;
        let detector = self
            .loader
            .load_detector()
            .and_then(|loaded| match loaded {
                Some(mut detector) => detector.warm_up().map(|_| Some(detector)),
                None => Ok(None),
            });
        let locator = match detector {
            Ok(Some(detector)) => FaceLocator::new(detector),
            Ok(None) => {
                log::warn!("no face detector configured; analysing full images");
                FaceLocator::without_detector()
            }
            Err(e) => {
                log::warn!("face detector failed to load ({:#}); analysing full images", e);
                FaceLocator::without_detector()
            }
        };
        self.pipeline = Some(Pipeline::new(locator, classifiers, self.catalog.clone()));
        log::info!("models initialized");
        if self.session.active_slot().is_none() {
            self.switch_model(ModelSlot::FaceShape);
        }
        Ok(())
    }

    fn initialization_failed(&mut self, err: StyleError) -> anyhow::Error {
        log::error!("{}", err);
        self.advise(AdvisoryKind::InitializationFailed, err.to_string());
        err.into()
    }

    fn advise(&mut self, kind: AdvisoryKind, detail: impl Into<String>) {
        self.sink.render(RenderEvent::advisory(kind, detail));
    }
}
