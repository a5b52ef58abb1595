//! Editor interaction state: idle versus "locating" a waypoint.
//!
//! At most one waypoint may be in locate mode across the whole editor
//! session. The machine owns that single slot explicitly; components ask it
//! what a map click means instead of consulting an ambient flag.

/// Current interaction state of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Map clicks only update the displayed current position.
    #[default]
    Idle,
    /// The next map click assigns a coordinate to this waypoint index.
    Locating(usize),
}

/// Owns the exclusive "locating" slot and its transitions.
///
/// # Examples
/// ```
/// use roadbook_core::{InteractionState, InteractionStateMachine};
///
/// let mut machine = InteractionStateMachine::new();
/// machine.request_locate(2);
/// assert_eq!(machine.state(), InteractionState::Locating(2));
/// // Toggling the same control cancels.
/// machine.request_locate(2);
/// assert_eq!(machine.state(), InteractionState::Idle);
/// ```
#[derive(Debug, Default)]
pub struct InteractionStateMachine {
    state: InteractionState,
}

impl InteractionStateMachine {
    /// Start in [`InteractionState::Idle`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: InteractionState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> InteractionState {
        self.state
    }

    /// Index being located, if any.
    #[must_use]
    pub const fn locating(&self) -> Option<usize> {
        match self.state {
            InteractionState::Idle => None,
            InteractionState::Locating(index) => Some(index),
        }
    }

    /// Handle the locate control for waypoint `index`.
    ///
    /// Toggles off when `index` is already being located and switches the
    /// target otherwise; switching never passes through an intermediate
    /// state with two locating indices because the slot is single-valued.
    /// Returns the new locating target.
    pub fn request_locate(&mut self, index: usize) -> Option<usize> {
        self.state = match self.state {
            InteractionState::Locating(current) if current == index => InteractionState::Idle,
            _ => InteractionState::Locating(index),
        };
        self.locating()
    }

    /// Resolve a map click: the locating index, leaving locate mode.
    ///
    /// Returns `None` when idle, in which case the click is display-only.
    pub fn take_click_target(&mut self) -> Option<usize> {
        let target = self.locating();
        self.state = InteractionState::Idle;
        target
    }

    /// React to removal of the waypoint at `index`.
    ///
    /// Removing the located waypoint, or any predecessor of it, leaves the
    /// stored index dangling or shifted, so locate mode is cancelled.
    /// Returns `true` when the state changed.
    pub fn notify_removed(&mut self, index: usize) -> bool {
        match self.state {
            InteractionState::Locating(current) if index <= current => {
                self.state = InteractionState::Idle;
                true
            }
            _ => false,
        }
    }

    /// React to two waypoints swapping positions.
    ///
    /// A swap involving the located index would silently retarget the next
    /// map click, so locate mode is cancelled instead. Returns `true` when
    /// the state changed.
    pub fn notify_swapped(&mut self, a: usize, b: usize) -> bool {
        match self.state {
            InteractionState::Locating(current) if current == a || current == b => {
                self.state = InteractionState::Idle;
                true
            }
            _ => false,
        }
    }
}
