use crate::protocol::ArtworkId;

/// Partial desired state handed to [`super::Controller::update`]; absent
/// fields leave the instance untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateOptions {
    pub code: Option<String>,
    pub animate: Option<bool>,
}

impl UpdateOptions {
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            animate: None,
        }
    }

    pub fn animate(animate: bool) -> Self {
        Self {
            code: None,
            animate: Some(animate),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = Some(animate);
        self
    }
}

/// The single message an update decides to send, if any.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outbound {
    Code(String),
    Animate(bool),
}

/// Controller-side record of one embedded artwork: what the page wants and
/// what the frame was last told.
#[derive(Clone, Debug)]
pub struct ArtworkInstance {
    id: ArtworkId,
    desired_code: String,
    last_sent_code: Option<String>,
    code_dirty: bool,
    animating: bool,
    overlay_dismissed: bool,
}

impl ArtworkInstance {
    /// A new instance has never delivered its code, so the first switch to
    /// animating carries `initial_code` to the frame.
    pub fn new(
        id: ArtworkId,
        initial_code: impl Into<String>,
        has_overlay: bool,
    ) -> Self {
        Self {
            id,
            desired_code: initial_code.into(),
            last_sent_code: None,
            code_dirty: true,
            animating: false,
            overlay_dismissed: !has_overlay,
        }
    }

    pub fn id(&self) -> &ArtworkId {
        &self.id
    }

    pub fn desired_code(&self) -> &str {
        &self.desired_code
    }

    pub fn last_sent_code(&self) -> Option<&str> {
        self.last_sent_code.as_deref()
    }

    pub fn code_dirty(&self) -> bool {
        self.code_dirty
    }

    pub fn animating(&self) -> bool {
        self.animating
    }

    pub fn overlay_dismissed(&self) -> bool {
        self.overlay_dismissed
    }

    /// Merges `opts` and decides what, if anything, the frame must hear.
    ///
    /// Code is only ever pushed while animating; a paused instance just
    /// accumulates dirtiness, so typing into a paused editor sends nothing.
    pub fn merge(&mut self, opts: UpdateOptions) -> Option<Outbound> {
        if let Some(code) = opts.code {
            if self.last_sent_code.as_deref() != Some(code.as_str()) {
                self.code_dirty = true;
            }
            self.desired_code = code;
        }

        let mut animate_changed = false;
        if let Some(animate) = opts.animate {
            if animate != self.animating {
                self.animating = animate;
                animate_changed = true;
            }
        }

        if self.animating && self.code_dirty {
            Some(Outbound::Code(self.desired_code.clone()))
        } else if animate_changed {
            Some(Outbound::Animate(self.animating))
        } else {
            None
        }
    }

    /// Call only once a code-bearing message was handed to the channel.
    pub fn mark_code_sent(&mut self, code: String) {
        self.last_sent_code = Some(code);
        self.code_dirty = false;
    }

    /// Returns false if the overlay was already gone.
    pub fn dismiss_overlay(&mut self) -> bool {
        let was_shown = !self.overlay_dismissed;
        self.overlay_dismissed = true;
        was_shown
    }
}
