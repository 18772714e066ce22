//! # cascade-fx: frame-driven text effects
//!
//! The animation half of cascade. Each row of the screen gets a strip of
//! gradient noise, an optional progress indicator, and a line of text that
//! types itself out. Rows light up top to bottom: a row starts once the
//! noise of the row above has stopped.
//!
//! - **[`noise`]**: `GradientNoise`, random characters under a scrolling gradient
//! - **[`indicator`]**: `Pendulum` and `Traveling` progress markers
//! - **[`streamer`]**: `TextStreamer`, one character per cadence tick
//! - **[`pipeline`]**: `RowPipeline`, one row's effects and phases
//! - **[`animation`]**: `AnimationLoop`, ticks every row onto a `Surface`
//! - **[`config`]**: row and loop settings, validated before anything runs
//!
//! Every effect is driven by the frame number alone, with an explicitly
//! seeded random source, so a run with a fixed seed is reproducible.

pub mod animation;
pub mod clock;
pub mod config;
pub mod error;
pub mod indicator;
pub mod noise;
pub mod palette;
pub mod pipeline;
pub mod streamer;

pub use animation::{AnimationLoop, CancelToken, RunOutcome, TickOutcome};
pub use config::{
    DoneTrigger, IndicatorConfig, IndicatorKind, LoopConfig, NoiseConfig, RowConfig, RowLayout,
    Sequencing,
};
pub use error::ConfigError;
