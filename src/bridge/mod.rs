//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod session;

pub use session::{
    get_detected_text, get_hint_text, get_status_text, is_session_running, mark_camera_ready,
    process_empty_frame, process_hand_frame, set_no_hand_policy, start_demo_session,
    stop_demo_session, take_speech_text,
};
