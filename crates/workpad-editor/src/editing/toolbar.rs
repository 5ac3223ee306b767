/// Toolbar popovers. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Popover {
    Link,
    Emoji,
    Date,
    MoreOptions,
    ForeColor,
    HiliteColor,
}

/// Where a pointer-down landed, as classified by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRegion {
    /// Inside the editable surface
    Surface,
    /// On the toolbar itself (its buttons open and close popovers)
    Toolbar,
    /// Inside an open popover panel
    Popover(Popover),
    /// Anywhere outside the editor root
    Outside,
}

/// The one shared registry of the open popover.
///
/// Every popover used to carry its own click-outside listener; here a single
/// pointer-down notification decides for all of them.
#[derive(Debug, Default)]
pub struct PopoverRegistry {
    open: Option<Popover>,
}

impl PopoverRegistry {
    pub fn active(&self) -> Option<Popover> {
        self.open
    }

    pub fn is_open(&self, popover: Popover) -> bool {
        self.open == Some(popover)
    }

    /// Open `popover`, replacing whichever one was open.
    pub fn open(&mut self, popover: Popover) {
        self.open = Some(popover);
    }

    pub fn close(&mut self, popover: Popover) -> bool {
        if self.is_open(popover) {
            self.open = None;
            return true;
        }
        false
    }

    /// Toolbar button behavior: open it, or close it if already open.
    pub fn toggle(&mut self, popover: Popover) {
        if !self.close(popover) {
            self.open(popover);
        }
    }

    pub fn close_all(&mut self) -> Option<Popover> {
        self.open.take()
    }

    /// Returns the popover this pointer-down closed, if any.
    pub fn on_pointer_down(&mut self, region: PointerRegion) -> Option<Popover> {
        match region {
            PointerRegion::Popover(p) if self.is_open(p) => None,
            PointerRegion::Toolbar => None,
            _ => self.close_all(),
        }
    }
}

/// Show/hide state of the formatting toolbar.
#[derive(Debug, Default)]
pub struct ToolbarVisibility {
    focused: bool,
    hovered: bool,
    popovers: PopoverRegistry,
}

impl ToolbarVisibility {
    pub fn is_visible(&self) -> bool {
        self.focused || self.hovered || self.popovers.active().is_some()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn popovers(&self) -> &PopoverRegistry {
        &self.popovers
    }

    pub fn popovers_mut(&mut self) -> &mut PopoverRegistry {
        &mut self.popovers
    }

    pub fn on_pointer_down(&mut self, region: PointerRegion) -> Option<Popover> {
        if region == PointerRegion::Outside {
            self.focused = false;
            self.hovered = false;
        }
        self.popovers.on_pointer_down(region)
    }
}
