//! A small window asking for confirmation before rebooting, shutting down,
//! suspending or logging out.

pub mod event_loop;
pub mod keysym;
pub mod launcher;
pub mod state;
pub mod surface;

pub use event_loop::{EventLoop, Flow, Surface, WindowEvent};
pub use launcher::{Launcher, Loginctl};
pub use state::{Action, AppState, Key};
