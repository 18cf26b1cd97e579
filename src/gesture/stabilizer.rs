//! Temporal stabilization of per-frame gesture classifications
//!
//! Debounces the jittery classifier stream: a category must hold for a
//! run of consecutive frames before it is confirmed to the UI, and
//! spoken announcements are rate limited on top of that.

use super::classify::Gesture;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// How a frame with no hand observation affects the stabilizer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoHandPolicy {
    /// Leave candidate and counter untouched
    Bypass,
    /// Feed the frame through as Detecting (breaks any other streak)
    TreatAsDetecting,
}

/// Stabilizer tuning
#[derive(Clone, Copy, Debug)]
pub struct StabilizerConfig {
    /// Consecutive frames before a category is confirmed
    pub confirm_frames: u32,
    /// Cap on the consecutive counter (no meaning past confirmation)
    pub count_cap: u32,
    /// Minimum gap between spoken announcements
    pub speech_cooldown_ms: f64,
    /// Policy for frames with no hand observation
    pub no_hand_policy: NoHandPolicy,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            confirm_frames: 8, // ~270ms at 30Hz
            count_cap: 60,
            speech_cooldown_ms: 4500.0,
            no_hand_policy: NoHandPolicy::Bypass,
        }
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// Stabilizer label domain: a gesture candidate or the idle sentinel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StableLabel {
    /// Initial/idle state, before any confirmation
    Ready,
    Gesture(Gesture),
}

impl StableLabel {
    /// Display text for the detected-gesture readout
    pub fn text(&self) -> &'static str {
        match self {
            StableLabel::Ready => "READY",
            StableLabel::Gesture(gesture) => gesture.text(),
        }
    }

    /// Whether a confirmation of this label may be spoken aloud
    fn announceable(&self) -> bool {
        match self {
            StableLabel::Ready => false,
            StableLabel::Gesture(gesture) => {
                *gesture != Gesture::Detecting && !gesture.text().is_empty()
            }
        }
    }
}

/// A confirmed stable-label update
#[derive(Clone, Debug, PartialEq)]
pub struct StableUpdate {
    /// Confirmed label
    pub label: StableLabel,
    /// Human-readable status line
    pub status: String,
    /// Text to announce when this confirmation is speech-eligible
    pub speech: Option<String>,
}

// ============================================================================
// STABILIZER
// ============================================================================

/// Hysteresis state machine over the per-frame category stream
///
/// One instance serves one demo session. Constructed fresh on session
/// start so no candidate or announcement timing carries over.
pub struct Stabilizer {
    config: StabilizerConfig,
    /// Current candidate label
    candidate: StableLabel,
    /// Consecutive frames the candidate has been observed
    consecutive: u32,
    /// Wall-clock of the last speech-eligible confirmation
    last_spoken_at: Option<f64>,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            candidate: StableLabel::Ready,
            consecutive: 0,
            last_spoken_at: None,
        }
    }

    /// Current candidate label (may not be confirmed yet)
    pub fn candidate(&self) -> StableLabel {
        self.candidate
    }

    /// Consecutive-hit count for the current candidate
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    /// Change the no-hand policy of a running stabilizer
    pub fn set_no_hand_policy(&mut self, policy: NoHandPolicy) {
        self.config.no_hand_policy = policy;
    }

    /// Feed one frame's classification.
    ///
    /// `now_ms` is the caller's wall clock in milliseconds; the
    /// stabilizer never reads time itself.
    ///
    /// Returns the stable-label update while the candidate is at or
    /// past the confirmation threshold, None while still debouncing.
    pub fn update(&mut self, gesture: Gesture, now_ms: f64) -> Option<StableUpdate> {
        let gesture = match gesture {
            Gesture::NoHand => match self.config.no_hand_policy {
                NoHandPolicy::Bypass => return None,
                NoHandPolicy::TreatAsDetecting => Gesture::Detecting,
            },
            gesture => gesture,
        };

        let label = StableLabel::Gesture(gesture);
        if label == self.candidate {
            self.consecutive = (self.consecutive + 1).min(self.config.count_cap);
        } else {
            self.candidate = label;
            self.consecutive = 1;
        }

        if self.consecutive < self.config.confirm_frames {
            return None;
        }

        let status = if gesture == Gesture::Detecting {
            "Hand detected".to_string()
        } else {
            format!("Hand detected: {}", label.text())
        };

        let speech = if label.announceable() && self.cooldown_elapsed(now_ms) {
            self.last_spoken_at = Some(now_ms);
            Some(label.text().to_string())
        } else {
            None
        };

        Some(StableUpdate {
            label,
            status,
            speech,
        })
    }

    fn cooldown_elapsed(&self, now_ms: f64) -> bool {
        match self.last_spoken_at {
            None => true,
            Some(at) => now_ms - at >= self.config.speech_cooldown_ms,
        }
    }

    /// Return to the idle state, clearing the announcement rate limit.
    ///
    /// Emits the READY update synchronously so the caller can apply it
    /// to the UI in the same step.
    pub fn reset(&mut self) -> StableUpdate {
        self.candidate = StableLabel::Ready;
        self.consecutive = 0;
        self.last_spoken_at = None;

        StableUpdate {
            label: StableLabel::Ready,
            status: "Idle".to_string(),
            speech: None,
        }
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{
        classify, HandLandmark, Handedness, HAND_LANDMARK_COUNT, INDEX_PIP, INDEX_TIP, MIDDLE_PIP,
        MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP,
    };

    /// Feed `gesture` for `frames` frames at 33ms spacing, returning
    /// the last update along with the timestamp after the run.
    fn feed(
        stabilizer: &mut Stabilizer,
        gesture: Gesture,
        frames: u32,
        start_ms: f64,
    ) -> (Option<StableUpdate>, f64) {
        let mut last = None;
        let mut now = start_ms;
        for _ in 0..frames {
            last = stabilizer.update(gesture, now);
            now += 33.0;
        }
        (last, now)
    }

    #[test]
    fn test_no_emission_before_threshold() {
        let mut stabilizer = Stabilizer::default();
        for frame in 0..7 {
            let update = stabilizer.update(Gesture::Hello, frame as f64 * 33.0);
            assert!(update.is_none(), "frame {} should not emit", frame);
        }
        assert_eq!(stabilizer.consecutive(), 7);
    }

    #[test]
    fn test_eighth_frame_confirms() {
        let mut stabilizer = Stabilizer::default();
        let (update, _) = feed(&mut stabilizer, Gesture::Hello, 8, 0.0);

        let update = update.expect("frame 8 must emit");
        assert_eq!(update.label, StableLabel::Gesture(Gesture::Hello));
        assert_eq!(update.status, "Hand detected: HELLO");
        assert_eq!(update.speech.as_deref(), Some("HELLO"));
    }

    #[test]
    fn test_detecting_status_has_no_label() {
        let mut stabilizer = Stabilizer::default();
        let (update, _) = feed(&mut stabilizer, Gesture::Detecting, 8, 0.0);

        let update = update.unwrap();
        assert_eq!(update.status, "Hand detected");
        // DETECTING is never announced
        assert!(update.speech.is_none());
    }

    #[test]
    fn test_category_switch_resets_counter() {
        let mut stabilizer = Stabilizer::default();
        let (_, now) = feed(&mut stabilizer, Gesture::Hello, 8, 0.0);

        // Switch frame: candidate replaced, no emission
        let update = stabilizer.update(Gesture::Yes, now);
        assert!(update.is_none());
        assert_eq!(stabilizer.candidate(), StableLabel::Gesture(Gesture::Yes));
        assert_eq!(stabilizer.consecutive(), 1);
    }

    #[test]
    fn test_alternating_categories_never_confirm() {
        let mut stabilizer = Stabilizer::default();
        for frame in 0..20 {
            let gesture = if frame % 2 == 0 {
                Gesture::Detecting
            } else {
                Gesture::Hello
            };
            let update = stabilizer.update(gesture, frame as f64 * 33.0);
            assert!(update.is_none(), "frame {} should not emit", frame);
        }
    }

    #[test]
    fn test_counter_caps_at_sixty() {
        let mut stabilizer = Stabilizer::default();
        feed(&mut stabilizer, Gesture::Hello, 200, 0.0);
        assert_eq!(stabilizer.consecutive(), 60);
    }

    #[test]
    fn test_speech_rate_limit() {
        let mut stabilizer = Stabilizer::default();

        // First confirmation announces
        let (update, now) = feed(&mut stabilizer, Gesture::Hello, 8, 0.0);
        assert!(update.unwrap().speech.is_some());

        // Re-confirmations inside the cooldown stay silent
        let update = stabilizer.update(Gesture::Hello, now).unwrap();
        assert!(update.speech.is_none());

        // Past the cooldown the same held label announces again
        let update = stabilizer.update(Gesture::Hello, now + 5000.0).unwrap();
        assert_eq!(update.speech.as_deref(), Some("HELLO"));
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let mut stabilizer = Stabilizer::default();
        let (update, _) = feed(&mut stabilizer, Gesture::Hello, 8, 0.0);
        let spoken_at = 7.0 * 33.0;
        assert!(update.unwrap().speech.is_some());

        // Exactly one cooldown later is eligible again
        let update = stabilizer
            .update(Gesture::Hello, spoken_at + 4500.0)
            .unwrap();
        assert!(update.speech.is_some());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut stabilizer = Stabilizer::default();
        feed(&mut stabilizer, Gesture::Hello, 12, 0.0);

        let update = stabilizer.reset();
        assert_eq!(update.label, StableLabel::Ready);
        assert_eq!(update.status, "Idle");
        assert!(update.speech.is_none());
        assert_eq!(stabilizer.candidate(), StableLabel::Ready);
        assert_eq!(stabilizer.consecutive(), 0);
    }

    #[test]
    fn test_reset_clears_speech_cooldown() {
        let mut stabilizer = Stabilizer::default();
        let (update, now) = feed(&mut stabilizer, Gesture::Hello, 8, 0.0);
        assert!(update.unwrap().speech.is_some());

        stabilizer.reset();

        // Well inside the pre-reset cooldown window, yet eligible
        let (update, _) = feed(&mut stabilizer, Gesture::Hello, 8, now);
        assert!(update.unwrap().speech.is_some());
    }

    #[test]
    fn test_no_hand_bypass_keeps_streak() {
        let mut stabilizer = Stabilizer::default();
        let (_, now) = feed(&mut stabilizer, Gesture::Hello, 5, 0.0);

        // A no-hand gap leaves the counter untouched
        assert!(stabilizer.update(Gesture::NoHand, now).is_none());
        assert_eq!(stabilizer.consecutive(), 5);

        // Three more HELLO frames complete the run of 8
        let (update, _) = feed(&mut stabilizer, Gesture::Hello, 3, now + 33.0);
        assert_eq!(
            update.unwrap().label,
            StableLabel::Gesture(Gesture::Hello)
        );
    }

    #[test]
    fn test_no_hand_as_detecting_breaks_streak() {
        let config = StabilizerConfig {
            no_hand_policy: NoHandPolicy::TreatAsDetecting,
            ..StabilizerConfig::default()
        };
        let mut stabilizer = Stabilizer::new(config);
        let (_, now) = feed(&mut stabilizer, Gesture::Hello, 5, 0.0);

        // The gap counts as Detecting and takes over the candidate
        assert!(stabilizer.update(Gesture::NoHand, now).is_none());
        assert_eq!(
            stabilizer.candidate(),
            StableLabel::Gesture(Gesture::Detecting)
        );
        assert_eq!(stabilizer.consecutive(), 1);
    }

    #[test]
    fn test_open_palm_stream_end_to_end() {
        // Classifier + stabilizer together: 8 open-palm frames confirm
        // HELLO with speech on the 8th
        let mut landmarks = [HandLandmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
        }; HAND_LANDMARK_COUNT];
        for (tip, pip) in [
            (INDEX_TIP, INDEX_PIP),
            (MIDDLE_TIP, MIDDLE_PIP),
            (RING_TIP, RING_PIP),
            (PINKY_TIP, PINKY_PIP),
        ] {
            landmarks[tip].y = 0.3;
            landmarks[pip].y = 0.5;
        }
        landmarks[THUMB_TIP].x = 0.7; // right of the IP joint
        landmarks[THUMB_IP].x = 0.5;

        let mut stabilizer = Stabilizer::default();
        let mut confirmed = None;
        for frame in 0..8 {
            let gesture = classify(&landmarks, Handedness::Right);
            assert_eq!(gesture, Gesture::Hello);
            confirmed = stabilizer.update(gesture, frame as f64 * 33.0);
            if frame < 7 {
                assert!(confirmed.is_none());
            }
        }

        let update = confirmed.expect("8th frame confirms");
        assert_eq!(update.label.text(), "HELLO");
        assert_eq!(update.status, "Hand detected: HELLO");
        assert_eq!(update.speech.as_deref(), Some("HELLO"));
    }
}
