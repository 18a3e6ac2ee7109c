//! Line-oriented presentation surface for the terminal.
//!
//! Every surface call becomes one line on stdout. Labels are printed quoted so
//! embedded line breaks stay on one line.

use playgate_core::surface::{PresentationSurface, Transition};

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl PresentationSurface for TerminalSurface {
    fn set_prompt_visible(&mut self, visible: bool) {
        println!("[prompt] {}", if visible { "shown" } else { "hidden" });
    }

    fn fire_transition(&mut self, transition: Transition) {
        println!("[prompt] transition {transition}");
    }

    fn set_corner_interactable(&mut self, interactable: bool) {
        println!(
            "[corner] {}",
            if interactable { "enabled" } else { "disabled" }
        );
    }

    fn set_corner_label(&mut self, text: &str) {
        println!("[corner] label {text:?}");
    }

    fn focus(&mut self, control: &str) {
        println!("[focus] {control}");
    }
}
