//! Configuration system for attest.
//! TOML-based, 4-layer resolution: overrides > env > project > defaults.
//! Passed explicitly through the call chain; nothing is read from globals
//! after `load` returns.

pub mod attest_config;
pub mod defaults;
pub mod extract_config;
pub mod generate_config;
pub mod loop_config;
pub mod run_config;
pub mod score_config;
pub mod verify_config;

pub use attest_config::{AttestConfig, ConfigOverrides};
pub use extract_config::ExtractConfig;
pub use generate_config::GenerateConfig;
pub use loop_config::LoopConfig;
pub use run_config::{GenerationMode, RunConfig};
pub use score_config::ScoreConfig;
pub use verify_config::VerifyConfig;
