//! Session and mode state.
//!
//! One `Session` per controller. It records the capture source, the active
//! classifier slot and the live-capture state machine:
//!
//! ```text
//! Stopped ──toggle──▶ Starting ──loaded──▶ Running ◀──toggle──▶ Paused
//!    ▲                    │                   │
//!    │                    └──load error──▶ Failed ──toggle──▶ Starting
//!    └────────── switch to upload ────────────┘
//! ```
//!
//! Every transition bumps an epoch. A pipeline pass captures a `PassTicket`
//! when it begins; its results are rendered only if the ticket is still
//! current when the pass completes.

use serde::Serialize;

use crate::classify::ModelSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    Live,
    Upload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveState {
    Stopped,
    /// Model, detector and capture loads in flight.
    Starting,
    Running,
    Paused,
    /// Initialization failed; only a new start request leaves this state.
    Failed(String),
}

/// What a start/stop toggle asks the controller to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// Not in live mode, or a start is already in flight.
    Ignored,
    /// Entered `Starting`; the controller must load and call `finish_start`.
    Start,
    Pause,
    Resume,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceChange {
    Unchanged,
    Switched { stopped_live: bool },
}

/// Upload-mode progress for the current image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadState {
    Empty,
    Ready { fingerprint: [u8; 32] },
    Processed { fingerprint: [u8; 32], slot: ModelSlot },
}

/// Identity of the state that issued a pipeline pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassTicket {
    epoch: u64,
    source: CaptureSource,
    slot: Option<ModelSlot>,
}

impl PassTicket {
    pub fn source(&self) -> CaptureSource {
        self.source
    }

    pub fn slot(&self) -> Option<ModelSlot> {
        self.slot
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    active_slot: Option<ModelSlot>,
    source: CaptureSource,
    live: LiveState,
    upload: UploadState,
    epoch: u64,
}

impl Session {
    /// Live source, stopped, no slot selected.
    pub fn new() -> Self {
        Self {
            active_slot: None,
            source: CaptureSource::Live,
            live: LiveState::Stopped,
            upload: UploadState::Empty,
            epoch: 0,
        }
    }

    pub fn active_slot(&self) -> Option<ModelSlot> {
        self.active_slot
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }

    pub fn live_state(&self) -> &LiveState {
        &self.live
    }

    pub fn upload_state(&self) -> UploadState {
        self.upload
    }

    pub fn is_running(&self) -> bool {
        self.live == LiveState::Running
    }

    pub fn switch_source(&mut self, source: CaptureSource) -> SourceChange {
        if self.source == source {
            return SourceChange::Unchanged;
        }
        let stopped_live = matches!(
            self.live,
            LiveState::Running | LiveState::Starting | LiveState::Paused
        );
        if stopped_live {
            self.live = LiveState::Stopped;
        }
        self.source = source;
        self.upload = UploadState::Empty;
        self.bump();
        log::info!("capture source -> {:?}", source);
        SourceChange::Switched { stopped_live }
    }

    /// Select a slot. Returns false when it was already active.
    ///
    /// A processed upload drops back to `Ready`: the new slot needs a fresh
    /// process action.
    pub fn switch_model(&mut self, slot: ModelSlot) -> bool {
        if self.active_slot == Some(slot) {
            return false;
        }
        self.active_slot = Some(slot);
        if let UploadState::Processed { fingerprint, .. } = self.upload {
            self.upload = UploadState::Ready { fingerprint };
        }
        self.bump();
        log::info!("active model -> {} ({})", slot.index(), slot.display_name());
        true
    }

    pub fn request_toggle(&mut self) -> Toggle {
        if self.source != CaptureSource::Live {
            return Toggle::Ignored;
        }
        let toggle = match self.live {
            LiveState::Starting => return Toggle::Ignored,
            LiveState::Running => {
                self.live = LiveState::Paused;
                Toggle::Pause
            }
            LiveState::Paused => {
                self.live = LiveState::Running;
                Toggle::Resume
            }
            LiveState::Stopped | LiveState::Failed(_) => {
                self.live = LiveState::Starting;
                Toggle::Start
            }
        };
        self.bump();
        toggle
    }

    /// Complete a `Toggle::Start`. Ignored if the session left `Starting`
    /// meanwhile (e.g. the user switched to upload mode).
    pub fn finish_start(&mut self, outcome: Result<(), String>) -> bool {
        if self.live != LiveState::Starting {
            return false;
        }
        self.live = match outcome {
            Ok(()) => LiveState::Running,
            Err(message) => LiveState::Failed(message),
        };
        self.bump();
        true
    }

    /// Stop the live loop outright. Returns false if it was not active.
    pub fn stop_live(&mut self) -> bool {
        if !matches!(
            self.live,
            LiveState::Running | LiveState::Paused | LiveState::Starting
        ) {
            return false;
        }
        self.live = LiveState::Stopped;
        self.bump();
        true
    }

    /// Capture broke mid-run; a new start is required.
    pub fn halt_live(&mut self, message: String) {
        self.live = LiveState::Failed(message);
        self.bump();
    }

    /// Ticket for a live tick, if the loop is running.
    pub fn live_ticket(&self) -> Option<PassTicket> {
        if self.source == CaptureSource::Live && self.is_running() {
            Some(self.ticket())
        } else {
            None
        }
    }

    /// Ticket for a one-shot upload pass.
    pub fn upload_ticket(&self) -> Option<PassTicket> {
        if self.source == CaptureSource::Upload {
            Some(self.ticket())
        } else {
            None
        }
    }

    /// True while the state that issued `ticket` is still in force.
    pub fn is_current(&self, ticket: &PassTicket) -> bool {
        if ticket.epoch != self.epoch || ticket.source != self.source {
            return false;
        }
        match ticket.source {
            CaptureSource::Live => self.is_running(),
            CaptureSource::Upload => true,
        }
    }

    pub fn mark_upload_ready(&mut self, fingerprint: [u8; 32]) {
        self.upload = UploadState::Ready { fingerprint };
    }

    pub fn mark_upload_processed(&mut self, slot: ModelSlot) {
        if let UploadState::Ready { fingerprint } | UploadState::Processed { fingerprint, .. } =
            self.upload
        {
            self.upload = UploadState::Processed { fingerprint, slot };
        }
    }

    pub fn clear_upload(&mut self) {
        self.upload = UploadState::Empty;
    }

    fn ticket(&self) -> PassTicket {
        PassTicket {
            epoch: self.epoch,
            source: self.source,
            slot: self.active_slot,
        }
    }

    fn bump(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_session() -> Session {
        let mut session = Session::new();
        assert_eq!(session.request_toggle(), Toggle::Start);
        assert!(session.finish_start(Ok(())));
        session
    }

    #[test]
    fn start_then_toggle_pauses_and_resumes() {
        let mut session = running_session();
        assert!(session.is_running());
        assert_eq!(session.request_toggle(), Toggle::Pause);
        assert_eq!(session.live_state(), &LiveState::Paused);
        assert_eq!(session.request_toggle(), Toggle::Resume);
        assert!(session.is_running());
    }

    #[test]
    fn start_failure_requires_new_start() {
        let mut session = Session::new();
        session.request_toggle();
        session.finish_start(Err("model missing".to_string()));
        assert_eq!(session.live_state(), &LiveState::Failed("model missing".to_string()));
        assert!(session.live_ticket().is_none());
        assert_eq!(session.request_toggle(), Toggle::Start);
    }

    #[test]
    fn toggle_while_starting_is_ignored() {
        let mut session = Session::new();
        session.request_toggle();
        assert_eq!(session.request_toggle(), Toggle::Ignored);
    }

    #[test]
    fn switching_to_upload_stops_live_loop() {
        let mut session = running_session();
        assert_eq!(
            session.switch_source(CaptureSource::Upload),
            SourceChange::Switched { stopped_live: true }
        );
        assert_eq!(session.live_state(), &LiveState::Stopped);
        assert!(session.live_ticket().is_none());
        assert_eq!(session.request_toggle(), Toggle::Ignored);
        assert_eq!(
            session.switch_source(CaptureSource::Upload),
            SourceChange::Unchanged
        );
    }

    #[test]
    fn ticket_goes_stale_after_transition() {
        let mut session = running_session();
        let ticket = session.live_ticket().unwrap();
        assert!(session.is_current(&ticket));
        session.request_toggle();
        assert!(!session.is_current(&ticket));

        let mut session = running_session();
        let ticket = session.live_ticket().unwrap();
        session.switch_model(ModelSlot::PersonalTone);
        assert!(!session.is_current(&ticket));
    }

    #[test]
    fn model_switch_invalidates_processed_upload() {
        let mut session = Session::new();
        session.switch_source(CaptureSource::Upload);
        session.switch_model(ModelSlot::FaceShape);
        session.mark_upload_ready([3u8; 32]);
        session.mark_upload_processed(ModelSlot::FaceShape);
        assert_eq!(
            session.upload_state(),
            UploadState::Processed {
                fingerprint: [3u8; 32],
                slot: ModelSlot::FaceShape
            }
        );
        assert!(session.switch_model(ModelSlot::PersonalTone));
        assert_eq!(
            session.upload_state(),
            UploadState::Ready {
                fingerprint: [3u8; 32]
            }
        );
        assert!(!session.switch_model(ModelSlot::PersonalTone));
    }
}
