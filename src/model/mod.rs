pub mod game_state;
pub mod llm_decode;
pub mod message;
pub mod narrative;
pub mod phase;
pub mod snapshot;
pub mod whole_number;
