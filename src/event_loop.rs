use log::debug;

use crate::{
    launcher::Launcher,
    state::{AppState, Key},
};

/// A window system event, reduced to what the prompt cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window content must be drawn again
    Redraw,
    Key(Key),
    /// The window manager asked the window to close
    Close,
    Other,
}

pub trait Surface {
    type Error;

    /// Blocks until the next event is available.
    fn next_event(&mut self) -> Result<WindowEvent, Self::Error>;

    /// Draws `state` over the whole window.
    fn render(&mut self, state: AppState) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Running,
    Terminating,
}

pub struct EventLoop<S, L> {
    surface: S,
    launcher: L,
    state: AppState,
}

impl<S: Surface, L: Launcher> EventLoop<S, L> {
    pub fn new(surface: S, launcher: L) -> Self {
        Self {
            surface,
            launcher,
            state: AppState::Idle,
        }
    }

    pub const fn state(&self) -> AppState {
        self.state
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Handles a single event.
    pub fn dispatch(&mut self, event: WindowEvent) -> Result<Flow, S::Error> {
        match event {
            WindowEvent::Redraw => self.surface.render(self.state)?,
            WindowEvent::Key(key) if key.is_quit() => return Ok(Flow::Terminating),
            WindowEvent::Key(key) => {
                let next = self.state.step(key, &mut self.launcher);
                if next != self.state {
                    debug!("{:?} -> {:?} on {:?}", self.state, next, key);
                    self.state = next;
                    self.surface.render(self.state)?;
                }
            }
            WindowEvent::Close => return Ok(Flow::Terminating),
            WindowEvent::Other => (),
        }

        Ok(Flow::Running)
    }

    /// Runs until the user quits or the window is closed, returning the last state.
    pub fn run(&mut self) -> Result<AppState, S::Error> {
        loop {
            let event = self.surface.next_event()?;
            if self.dispatch(event)? == Flow::Terminating {
                return Ok(self.state);
            }
        }
    }
}
