//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod jobs;
pub mod netintel;
pub mod renderer;
pub mod reputation;
pub mod summarizer;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use netintel::ShodanClient;
pub use renderer::{ContainerRenderer, RenderError};
pub use reputation::VirusTotalReputation;
pub use summarizer::{OpenAiSummarizer, NO_THREAT_SUMMARY};
pub use traits::*;
