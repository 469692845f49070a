//! Page-side collaborators an artwork instance drives. The page itself
//! (markup, widgets, layout framework) lives behind these traits.

use crate::protocol::Size;

/// The element an artwork frame is mounted into.
pub trait ArtworkTarget {
    fn set_box(&mut self, size: Size);
}

/// Where runtime errors for one artwork are shown, if the page has one.
pub trait ErrorSlot {
    fn show(&mut self, message: &str);
    fn hide(&mut self);
}

/// Page-wide layout that must re-flow after an artwork changes size.
pub trait Layout {
    fn reflow(&mut self);
}

/// Editor widget holding an artwork's source text.
pub trait CodeEditor {
    fn value(&self) -> String;
}

impl CodeEditor for str {
    fn value(&self) -> String {
        self.to_string()
    }
}

impl CodeEditor for String {
    fn value(&self) -> String {
        self.clone()
    }
}

/// Enablement of an instance's play/pause pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlayPauseState {
    pub play_enabled: bool,
    pub pause_enabled: bool,
}

impl PlayPauseState {
    pub fn for_animating(animating: bool) -> Self {
        Self {
            play_enabled: !animating,
            pause_enabled: animating,
        }
    }

    /// Whether the play (`true`) or pause (`false`) button can be clicked.
    pub fn enabled(&self, play: bool) -> bool {
        if play {
            self.play_enabled
        } else {
            self.pause_enabled
        }
    }
}

impl Default for PlayPauseState {
    fn default() -> Self {
        Self::for_animating(false)
    }
}

/// Per-instance UI wiring chosen at registration time.
pub struct Mount {
    pub target: Box<dyn ArtworkTarget>,
    pub error_slot: Option<Box<dyn ErrorSlot>>,
    /// Apply resize reports to `target`.
    pub autosize: bool,
    /// Cover the artwork with a "click to play" overlay until it first
    /// animates.
    pub overlay: bool,
    /// Give the artwork its own play/pause pair.
    pub controls: bool,
}

impl Mount {
    pub fn new(target: Box<dyn ArtworkTarget>) -> Self {
        Self {
            target,
            error_slot: None,
            autosize: true,
            overlay: false,
            controls: false,
        }
    }

    pub fn with_error_slot(mut self, slot: Box<dyn ErrorSlot>) -> Self {
        self.error_slot = Some(slot);
        self
    }

    pub fn with_autosize(mut self, autosize: bool) -> Self {
        self.autosize = autosize;
        self
    }

    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_controls(mut self, controls: bool) -> Self {
        self.controls = controls;
        self
    }
}
