// SPDX-License-Identifier: GPL-3.0-only

//! Component state and messages

use crate::backends::camera::{
    CaptureSessionManager, MediaDeviceInfo, MediaDevices, PermissionState, PreviewSurface,
};
use crate::config::Config;
use crate::debug::{DebugLog, TapCounter};
use crate::egress::{ExportOutcome, RollUpload, ShareSheet, UploadOutcome};
use crate::errors::EgressError;
use crate::film::{FilmRoll, Photo};
use crate::flash::Flash;
use crate::input::{RotaryEvent, SubscriptionId};
use crate::pipelines::photo::{
    FilterPreset, FilterSelector, PhotoDeveloper, PhotoEncoder, ShotPipeline, ShotTiming,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;

/// Which screen the device shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Viewfinder,
    Gallery,
}

/// A dismissible notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }
}

/// Everything that can happen to the component
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Camera =====
    /// Stop and reacquire the camera
    RestartCamera,
    /// Manual playback retry after the preview failed to start
    TapToPlay,
    /// Clock advanced; drains frames and rotary events, fires deadlines
    Tick,

    // ===== Capture =====
    Shutter,
    ToggleFlash,
    Rotary(RotaryEvent),

    // ===== Film / gallery =====
    ReloadFilm,
    OpenGallery,
    CloseGallery,
    /// Move the gallery selection (newer = -1, older = +1)
    GalleryStep(i32),
    ExportPhoto(u64),
    DownloadPhoto(u64),
    UploadPhoto(u64),
    UploadRoll,
    ExportFinished(u64, Result<ExportOutcome, EgressError>),
    DownloadFinished(u64, Result<PathBuf, EgressError>),
    UploadFinished(u64, Result<UploadOutcome, EgressError>),
    RollUploadFinished(Vec<RollUpload>),

    // ===== System =====
    /// Hidden tap target; five quick taps toggle the debug console
    DebugTap,
    DismissNotice,
    DismissQr,
}

/// The camera component
pub struct CameraApp {
    pub(crate) config: Config,
    /// Where setting changes are written back; nothing is persisted when unset
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) sessions: CaptureSessionManager,
    pub(crate) surface: PreviewSurface,
    pub(crate) devices: Vec<MediaDeviceInfo>,
    /// Preview failed to start; offer tap-to-play
    pub(crate) needs_tap_to_play: bool,
    pub(crate) mounted: bool,

    pub(crate) shot: ShotPipeline,
    pub(crate) developer: PhotoDeveloper,
    pub(crate) filters: FilterSelector,
    pub(crate) flash: Flash,
    pub(crate) film: FilmRoll,

    pub(crate) screen: Screen,
    pub(crate) gallery_index: usize,
    pub(crate) share_sheet: Arc<dyn ShareSheet>,
    pub(crate) egress_in_flight: usize,
    pub(crate) notice: Option<Notice>,
    pub(crate) qr: Option<UploadOutcome>,

    pub(crate) debug_log: DebugLog,
    pub(crate) taps: TapCounter,
    pub(crate) debug_visible: bool,
    pub(crate) rotary: Option<(SubscriptionId, UnboundedReceiver<RotaryEvent>)>,
}

impl CameraApp {
    pub fn new(
        config: Config,
        devices: Box<dyn MediaDevices>,
        share_sheet: Arc<dyn ShareSheet>,
        flash: Flash,
    ) -> Self {
        let developer = PhotoDeveloper::new(PhotoEncoder::new(config.jpeg_quality));
        Self {
            sessions: CaptureSessionManager::new(devices),
            surface: PreviewSurface::new(),
            devices: Vec::new(),
            needs_tap_to_play: false,
            mounted: false,
            shot: ShotPipeline::new(ShotTiming::default()),
            developer,
            filters: FilterSelector::new(),
            flash,
            film: FilmRoll::default(),
            screen: Screen::default(),
            gallery_index: 0,
            share_sheet,
            egress_in_flight: 0,
            notice: None,
            qr: None,
            debug_log: DebugLog::default(),
            taps: TapCounter::default(),
            debug_visible: false,
            rotary: None,
            config,
            config_path: None,
        }
    }

    /// Persist setting changes (the flash toggle) to `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Replace the shot timing (tests use short delays)
    pub fn with_shot_timing(mut self, timing: ShotTiming) -> Self {
        self.shot = ShotPipeline::new(timing);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn film(&self) -> &FilmRoll {
        &self.film
    }

    pub fn current_filter(&self) -> &'static FilterPreset {
        self.filters.current()
    }

    pub fn filter_index(&self) -> usize {
        self.filters.index()
    }

    /// Select a catalog preset by name or label
    pub fn select_filter(&mut self, name: &str) -> bool {
        self.filters.select(name)
    }

    pub fn permission(&self) -> &PermissionState {
        self.sessions.permission()
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.surface
    }

    pub fn sessions(&self) -> &CaptureSessionManager {
        &self.sessions
    }

    pub fn devices(&self) -> &[MediaDeviceInfo] {
        &self.devices
    }

    pub fn needs_tap_to_play(&self) -> bool {
        self.needs_tap_to_play
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_developing(&self) -> bool {
        self.shot.is_developing()
    }

    pub fn shutter_active(&self, now: Instant) -> bool {
        self.shot.shutter_active(now)
    }

    pub fn flash_active(&self, now: Instant) -> bool {
        self.shot.flash_active(now)
    }

    pub fn flash_enabled(&self) -> bool {
        self.flash.is_enabled()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Photo selected in the gallery
    pub fn selected_photo(&self) -> Option<&Photo> {
        self.film.photos().get(self.gallery_index)
    }

    pub fn gallery_index(&self) -> usize {
        self.gallery_index
    }

    /// Reload is only offered once the roll has been used
    pub fn can_reload(&self) -> bool {
        self.film.is_used()
    }

    pub fn egress_in_flight(&self) -> bool {
        self.egress_in_flight > 0
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn qr(&self) -> Option<&UploadOutcome> {
        self.qr.as_ref()
    }

    pub fn debug_log(&self) -> &DebugLog {
        &self.debug_log
    }

    pub fn debug_visible(&self) -> bool {
        self.debug_visible
    }

    /// Earliest time the host must deliver a tick
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.shot.next_deadline(), self.taps.deadline()]
            .into_iter()
            .flatten()
            .min()
    }
}
