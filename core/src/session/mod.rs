pub mod biplane;
pub mod continuous;
pub mod scheduler;
pub mod view_session;

pub use biplane::{biplane_ejection_fraction, AnalysisResult, BiplaneOrchestrator};
pub use continuous::{finish_continuous, run_continuous, ContinuousSummary};
pub use scheduler::{cancel_pair, CancelHandle, CancelSignal, Immediate, Scheduler, TokioScheduler};
pub use view_session::{SessionPhase, TickOutcome, ViewMetrics, ViewSession};
