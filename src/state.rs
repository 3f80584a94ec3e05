use strum::{Display, EnumIter, IntoEnumIterator};

use crate::launcher::Launcher;

/// A power action the prompt can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Reboot,
    Shutdown,
    Suspend,
    Logout,
}

/// A key, as seen by the state machine.
///
/// Window system specific key codes are resolved into this before reaching the
/// state machine, see [`crate::keysym`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable key, always lowercase
    Char(char),
    Return,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Idle,
    /// Waiting for a second key press before running the action
    Confirm(Action),
    /// The action's command has been launched
    InProgress(Action),
}

impl Action {
    /// The key selecting this action from the idle menu.
    pub const fn key(self) -> char {
        match self {
            Self::Reboot => 'r',
            Self::Shutdown => 's',
            Self::Suspend => 'u',
            Self::Logout => 'l',
        }
    }

    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Char(c) => Self::iter().find(|action| action.key() == c),
            _ => None,
        }
    }
}

impl Key {
    /// Quitting is handled by the event loop, never by [`AppState::transition`].
    pub const fn is_quit(self) -> bool {
        matches!(self, Self::Char('q') | Self::Escape)
    }

    pub const fn is_accept(self) -> bool {
        matches!(self, Self::Return)
    }
}

impl AppState {
    /// Every state, in menu order.
    pub fn iter() -> impl Iterator<Item = Self> {
        std::iter::once(Self::Idle)
            .chain(Action::iter().map(Self::Confirm))
            .chain(Action::iter().map(Self::InProgress))
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Idle => "r:reboot s:shutdown u:suspend l:logout",
            Self::Confirm(Action::Reboot) => "Press 'r' again to reboot",
            Self::Confirm(Action::Shutdown) => "Press 's' again to shut down",
            Self::Confirm(Action::Suspend) => "Press 'u' again to suspend",
            Self::Confirm(Action::Logout) => "Press 'l' again to log out",
            Self::InProgress(Action::Reboot) => "Rebooting...",
            Self::InProgress(Action::Shutdown) => "Shutting down...",
            Self::InProgress(Action::Suspend) => "Suspending...",
            Self::InProgress(Action::Logout) => "Logging out...",
        }
    }

    /// The action attached to this state, if any.
    pub const fn action(self) -> Option<Action> {
        match self {
            Self::Idle => None,
            Self::Confirm(action) | Self::InProgress(action) => Some(action),
        }
    }

    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress(_))
    }

    /// Computes the next state, without side effects.
    ///
    /// Any key that does not confirm an action cancels back to [`AppState::Idle`],
    /// including keys pressed after an action was launched: launching again
    /// always takes two key presses.
    pub fn transition(self, key: Key) -> Self {
        match self {
            Self::Idle => Action::from_key(key).map_or(Self::Idle, Self::Confirm),
            Self::Confirm(action) if key.is_accept() || key == Key::Char(action.key()) => {
                Self::InProgress(action)
            }
            Self::Confirm(_) | Self::InProgress(_) => Self::Idle,
        }
    }

    /// Like [`AppState::transition`], but launches the action when entering an
    /// in-progress state.
    pub fn step<L>(self, key: Key, launcher: &mut L) -> Self
    where
        L: Launcher + ?Sized,
    {
        let next = self.transition(key);
        if next.is_in_progress()
            && !self.is_in_progress()
            && let Some(action) = next.action()
        {
            launcher.launch(action);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [Key; 9] = [
        Key::Char('r'),
        Key::Char('s'),
        Key::Char('u'),
        Key::Char('l'),
        Key::Char('x'),
        Key::Char('q'),
        Key::Return,
        Key::Escape,
        Key::Other,
    ];

    #[derive(Default)]
    struct Recorder(Vec<Action>);

    impl Launcher for Recorder {
        fn launch(&mut self, action: Action) {
            self.0.push(action);
        }
    }

    #[test]
    fn idle_selects_action() {
        for action in Action::iter() {
            assert_eq!(
                AppState::Idle.transition(Key::Char(action.key())),
                AppState::Confirm(action)
            );
        }
    }

    #[test]
    fn idle_ignores_other_keys() {
        for key in [Key::Char('x'), Key::Return, Key::Other] {
            assert_eq!(AppState::Idle.transition(key), AppState::Idle);
        }
    }

    #[test]
    fn confirm_with_same_key_or_return() {
        for action in Action::iter() {
            let confirm = AppState::Confirm(action);
            assert_eq!(
                confirm.transition(Key::Char(action.key())),
                AppState::InProgress(action)
            );
            assert_eq!(confirm.transition(Key::Return), AppState::InProgress(action));
        }
    }

    #[test]
    fn other_action_key_cancels_confirmation() {
        assert_eq!(
            AppState::Confirm(Action::Reboot).transition(Key::Char('s')),
            AppState::Idle
        );
    }

    #[test]
    fn in_progress_resets_to_idle() {
        for action in Action::iter() {
            for key in ALL_KEYS {
                assert_eq!(AppState::InProgress(action).transition(key), AppState::Idle);
            }
        }
    }

    #[test]
    fn transition_is_deterministic() {
        for state in AppState::iter() {
            for key in ALL_KEYS {
                assert_eq!(state.transition(key), state.transition(key));
            }
        }
    }

    #[test]
    fn step_launches_only_when_entering_in_progress() {
        for state in AppState::iter() {
            for key in ALL_KEYS {
                let mut recorder = Recorder::default();
                let next = state.step(key, &mut recorder);

                assert_eq!(next, state.transition(key));
                match (state, next) {
                    (AppState::Confirm(_), AppState::InProgress(action)) => {
                        assert_eq!(recorder.0, [action]);
                    }
                    _ => assert!(recorder.0.is_empty(), "{state:?} + {key:?} launched"),
                }
            }
        }
    }

    #[test]
    fn only_idle_has_no_action() {
        for state in AppState::iter() {
            assert_eq!(state.action().is_none(), state == AppState::Idle, "{state:?}");
        }
        assert_eq!(
            AppState::Confirm(Action::Suspend).action(),
            Some(Action::Suspend)
        );
        assert_eq!(
            AppState::InProgress(Action::Logout).action(),
            Some(Action::Logout)
        );
    }

    #[test]
    fn every_state_has_a_distinct_message() {
        let messages: Vec<_> = AppState::iter().map(AppState::message).collect();
        assert_eq!(messages.len(), 9);
        for (i, message) in messages.iter().enumerate() {
            assert!(!messages[i + 1..].contains(message), "duplicate: {message}");
        }
    }

    #[test]
    fn action_keys_are_unique_and_not_quit() {
        for action in Action::iter() {
            assert_eq!(Action::from_key(Key::Char(action.key())), Some(action));
            assert!(!Key::Char(action.key()).is_quit());
        }
    }
}
