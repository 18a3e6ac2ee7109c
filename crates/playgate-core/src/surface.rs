//! Presentation surface contract.
//!
//! The surface is the UI around the controller: the prompt panel with its
//! open/close transitions and the corner sign-in control.

use std::fmt;

/// Named transition triggers on the prompt panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Open,
    Close,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Open => "Open",
            Transition::Close => "Close",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait PresentationSurface: Send {
    /// Shows or hides the prompt panel.
    fn set_prompt_visible(&mut self, visible: bool);

    /// Fires a transition trigger on the prompt panel.
    fn fire_transition(&mut self, transition: Transition);

    /// Enables or disables the corner sign-in control.
    fn set_corner_interactable(&mut self, interactable: bool);

    /// Replaces the corner sign-in label.
    fn set_corner_label(&mut self, text: &str);

    /// Moves input focus to the named control.
    fn focus(&mut self, control: &str);
}
