//! Free-fly camera controller: held-key movement, pointer-locked look,
//! scroll speed control with an on-screen indicator, and eased fly-to.

pub mod fly;
pub mod indicator;
pub mod input;
pub mod transition;

pub use fly::{FlyCamera, FlySettings};
pub use indicator::SpeedIndicator;
pub use input::{KeyboardState, PointerState, RawKeyEvent};
pub use transition::{FocusTransition, TransitionSample, ease_cubic_in_out};
