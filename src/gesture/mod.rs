//! Gesture module - classification and temporal stabilization
//!
//! Re-exports only. All logic in submodules.

mod classify;
mod landmarks;
mod stabilizer;

pub use classify::{classify, Gesture};
pub use landmarks::{
    parse_hand_landmarks, HandLandmark, Handedness, HAND_LANDMARK_COUNT, INDEX_DIP, INDEX_MCP,
    INDEX_PIP, INDEX_TIP, LANDMARK_STRIDE, MIDDLE_DIP, MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP,
    PINKY_DIP, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_DIP, RING_MCP, RING_PIP, RING_TIP, THUMB_CMC,
    THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};
pub use stabilizer::{NoHandPolicy, StableLabel, StableUpdate, Stabilizer, StabilizerConfig};
