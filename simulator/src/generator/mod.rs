pub mod profile;
pub mod template;

pub use profile::{EchoProfile, SyntheticEcho};
