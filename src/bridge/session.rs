//! Live demo session - per-session state and JS entry points
//!
//! JavaScript owns the camera, the MediaPipe Hands detector, skeleton
//! drawing and speech playback. It pushes one frame of landmarks at a
//! time into this module and polls the debounced readout back out.

use std::cell::{Cell, RefCell};
use wasm_bindgen::prelude::*;

use crate::gesture::{
    classify, parse_hand_landmarks, Gesture, Handedness, NoHandPolicy, StableUpdate, Stabilizer,
    StabilizerConfig, HAND_LANDMARK_COUNT, LANDMARK_STRIDE,
};

/// Floats per hand frame in the JS bridge format
const HAND_FRAME_LEN: usize = HAND_LANDMARK_COUNT * LANDMARK_STRIDE;

// Readout strings owned by the session; the page just renders them
const HINT_STARTING: &str = "Starting…";
const HINT_SHOW_HAND: &str = "Show your hand in the frame";
const HINT_STOPPED: &str = "Click “Turn On Webcam” to start";

// ============================================================================
// SESSION STATE
// ============================================================================

/// One running demo session.
///
/// Constructed fresh on every start so no candidate label or
/// announcement timing leaks across sessions.
struct DemoSession {
    stabilizer: Stabilizer,
    detected_text: String,
    status_text: String,
    hint_text: String,
    /// Announcement waiting for the page to pick up and speak
    pending_speech: Option<String>,
}

impl DemoSession {
    fn new(policy: NoHandPolicy) -> Self {
        let config = StabilizerConfig {
            no_hand_policy: policy,
            ..StabilizerConfig::default()
        };

        Self {
            stabilizer: Stabilizer::new(config),
            detected_text: "READY".to_string(),
            status_text: "Starting".to_string(),
            hint_text: HINT_STARTING.to_string(),
            pending_speech: None,
        }
    }

    /// The camera and detector came up; start showing the live readout
    fn camera_ready(&mut self) {
        self.status_text = "Camera on".to_string();
        self.detected_text = Gesture::Detecting.text().to_string();
        self.hint_text = HINT_SHOW_HAND.to_string();
    }

    /// One detector frame with a hand present
    fn hand_frame(&mut self, data: &[f32], handedness: Handedness, now_ms: f64) {
        self.hint_text.clear();

        // A short buffer is an expected live-stream hiccup, not an
        // error: it classifies as no usable observation
        let gesture = match parse_hand_landmarks(data) {
            Some(landmarks) => classify(&landmarks, handedness),
            None => Gesture::NoHand,
        };

        let update = self.stabilizer.update(gesture, now_ms);
        self.apply(update);
    }

    /// One detector frame with no hand present.
    ///
    /// The stabilizer sees the gap through its no-hand policy; the
    /// status line always reports the absence afterwards.
    fn empty_frame(&mut self, now_ms: f64) {
        let update = self.stabilizer.update(Gesture::NoHand, now_ms);
        self.apply(update);

        self.hint_text = HINT_SHOW_HAND.to_string();
        self.status_text = "No hand detected".to_string();
    }

    fn apply(&mut self, update: Option<StableUpdate>) {
        if let Some(update) = update {
            self.detected_text = update.label.text().to_string();
            self.status_text = update.status;
            if let Some(text) = update.speech {
                self.pending_speech = Some(text);
            }
        }
    }
}

thread_local! {
    // Single-threaded in WASM; one session at a time
    static SESSION: RefCell<Option<DemoSession>> = RefCell::new(None);
    static NO_HAND_POLICY: Cell<NoHandPolicy> = Cell::new(NoHandPolicy::Bypass);
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Start a demo session. No-op while one is already running.
#[wasm_bindgen]
pub fn start_demo_session() {
    SESSION.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return;
        }

        let policy = NO_HAND_POLICY.with(|p| p.get());
        *slot = Some(DemoSession::new(policy));
        web_sys::console::log_1(&"🎥 Demo session started".into());
    });
}

/// Stop the demo session and return the readout to idle.
///
/// Late detector frames arriving after this call are discarded. A
/// later start constructs a brand-new session.
#[wasm_bindgen]
pub fn stop_demo_session() {
    SESSION.with(|slot| {
        if let Some(mut session) = slot.borrow_mut().take() {
            session.stabilizer.reset();
            web_sys::console::log_1(&"🛑 Demo session stopped".into());
        }
    });
}

/// Called from JavaScript once the camera and detector are running
#[wasm_bindgen]
pub fn mark_camera_ready() {
    SESSION.with(|slot| {
        if let Some(session) = slot.borrow_mut().as_mut() {
            session.camera_ready();
        }
    });
}

/// Called from JavaScript with a flat Float32Array of 63 values
/// (21 landmarks × x, y, z) and the detector's handedness label.
/// Ignored when no session is running.
#[wasm_bindgen]
pub fn process_hand_frame(data: &[f32], handedness_label: &str) {
    if data.len() < HAND_FRAME_LEN {
        web_sys::console::warn_1(
            &format!(
                "Invalid hand frame length: {} (expected {})",
                data.len(),
                HAND_FRAME_LEN
            )
            .into(),
        );
        // Still delivered: a malformed observation classifies as no hand
    }

    let now = js_sys::Date::now();
    let handedness = Handedness::from_label(handedness_label);

    SESSION.with(|slot| {
        if let Some(session) = slot.borrow_mut().as_mut() {
            session.hand_frame(data, handedness, now);
        }
    });
}

/// Called from JavaScript when a detector result has no hand in it
#[wasm_bindgen]
pub fn process_empty_frame() {
    let now = js_sys::Date::now();

    SESSION.with(|slot| {
        if let Some(session) = slot.borrow_mut().as_mut() {
            session.empty_frame(now);
        }
    });
}

/// Choose how no-hand frames feed the stabilizer. Applies to the
/// running session and to any session started afterwards.
#[wasm_bindgen]
pub fn set_no_hand_policy(treat_as_detecting: bool) {
    let policy = if treat_as_detecting {
        NoHandPolicy::TreatAsDetecting
    } else {
        NoHandPolicy::Bypass
    };

    NO_HAND_POLICY.with(|p| p.set(policy));
    SESSION.with(|slot| {
        if let Some(session) = slot.borrow_mut().as_mut() {
            session.stabilizer.set_no_hand_policy(policy);
        }
    });
}

// ============================================================================
// READOUT GETTERS (polled by JS)
// ============================================================================

/// Stable detected-gesture text for the main readout
#[wasm_bindgen]
pub fn get_detected_text() -> String {
    SESSION.with(|slot| match slot.borrow().as_ref() {
        Some(session) => session.detected_text.clone(),
        None => "READY".to_string(),
    })
}

/// Status line text
#[wasm_bindgen]
pub fn get_status_text() -> String {
    SESSION.with(|slot| match slot.borrow().as_ref() {
        Some(session) => session.status_text.clone(),
        None => "Idle".to_string(),
    })
}

/// Hint line text
#[wasm_bindgen]
pub fn get_hint_text() -> String {
    SESSION.with(|slot| match slot.borrow().as_ref() {
        Some(session) => session.hint_text.clone(),
        None => HINT_STOPPED.to_string(),
    })
}

/// Whether a demo session is currently running
#[wasm_bindgen]
pub fn is_session_running() -> bool {
    SESSION.with(|slot| slot.borrow().is_some())
}

/// Take the pending announcement, if any. The page owns actually
/// speaking it; the core only decides whether and when.
#[wasm_bindgen]
pub fn take_speech_text() -> Option<String> {
    SESSION.with(|slot| {
        slot.borrow_mut()
            .as_mut()
            .and_then(|session| session.pending_speech.take())
    })
}
