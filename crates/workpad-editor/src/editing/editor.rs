use std::fmt;
use std::path::Path;

use workpad_config::EditorConfig;

use crate::editing::commands::{Command, CommandDispatcher};
use crate::editing::layout::{Point, SurfaceLayout};
use crate::editing::lists::{self, ListStyle};
use crate::editing::media::{
    AnchorLimits, DragPayload, MediaAnchor, MediaAnchorEngine, PointerDownOutcome, PointerInput,
};
use crate::editing::patch::Patch;
use crate::editing::selection::SelectionMemory;
use crate::editing::sync::{SyncBridge, SyncState};
use crate::editing::toolbar::{PointerRegion, Popover, ToolbarVisibility};
use crate::io;
use crate::surface::{NodeId, Surface, SurfaceRange};

/// One mounted rich-text editor.
///
/// The host forwards its input, pointer and focus events here and supplies
/// geometry through a [`SurfaceLayout`]. Every operation on an unmounted
/// editor is a no-op.
pub struct Editor {
    config: EditorConfig,
    layout: Box<dyn SurfaceLayout>,
    surface: Option<Surface>,
    focused: bool,
    selection: SelectionMemory,
    dispatcher: CommandDispatcher,
    sync: SyncBridge,
    media: MediaAnchorEngine,
    toolbar: ToolbarVisibility,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("mounted", &self.surface.is_some())
            .field("focused", &self.focused)
            .field("selection", &self.selection)
            .field("sync", &self.sync)
            .field("media", &self.media)
            .field("toolbar", &self.toolbar)
            .finish()
    }
}

impl Editor {
    pub fn new(config: EditorConfig, layout: impl SurfaceLayout + 'static) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(config.style_with_css),
            media: MediaAnchorEngine::new(AnchorLimits::from(&config)),
            config,
            layout: Box::new(layout),
            surface: None,
            focused: false,
            selection: SelectionMemory::new(),
            sync: SyncBridge::new(),
            toolbar: ToolbarVisibility::default(),
        }
    }

    /// Register the store's change callback.
    pub fn set_on_change(&mut self, on_change: impl FnMut(&str) + 'static) {
        self.sync.set_callback(on_change);
    }

    pub fn set_layout(&mut self, layout: impl SurfaceLayout + 'static) {
        self.layout = Box::new(layout);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Create the surface from the store's current value.
    pub fn mount(&mut self, value: &str) {
        let mut surface = Surface::new();
        self.sync.external_changed(&mut surface, value, false);
        self.surface = Some(surface);
        log::debug!("editor mounted");
    }

    pub fn unmount(&mut self) {
        self.surface = None;
        self.focused = false;
        self.selection.invalidate();
        self.media.clear_active();
        self.media.abandon_gesture();
        self.toolbar.set_focused(false);
        log::debug!("editor unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Direct access for host-side typing. Report with [`Editor::on_input`].
    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    /// Serialized surface content.
    pub fn value(&self) -> Option<String> {
        self.surface.as_ref().map(Surface::to_markup)
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn toolbar(&self) -> &ToolbarVisibility {
        &self.toolbar
    }

    pub fn selection(&self) -> &SelectionMemory {
        &self.selection
    }

    /// The store pushed a new value. Returns `true` if the surface was
    /// rewritten.
    pub fn set_external_value(&mut self, value: &str) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let replaced = self.sync.external_changed(surface, value, self.focused);
        if replaced {
            self.selection.invalidate();
            self.media.clear_active();
            self.media.abandon_gesture();
        }
        replaced
    }

    /// One render tick passed.
    pub fn tick(&mut self) {
        self.sync.tick();
    }

    /// The surface content changed through typing. Returns `true` if the
    /// change callback fired.
    pub fn on_input(&mut self) -> bool {
        self.settle()
    }

    fn settle(&mut self) -> bool {
        match self.surface.as_ref() {
            Some(surface) => self.sync.local_edit(surface),
            None => false,
        }
    }

    pub fn focus(&mut self) {
        if self.surface.is_some() {
            self.focused = true;
            self.toolbar.set_focused(true);
        }
    }

    /// The surface lost focus, for example to a toolbar control. The
    /// toolbar stays up until an outside pointer-down.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.toolbar.set_hovered(hovered);
    }

    pub fn toggle_popover(&mut self, popover: Popover) {
        self.toolbar.popovers_mut().toggle(popover);
    }

    pub fn close_popover(&mut self, popover: Popover) -> bool {
        self.toolbar.popovers_mut().close(popover)
    }

    /// Key-up inside the surface, with the host's current selection.
    pub fn on_key_up(&mut self, range: SurfaceRange) {
        if let Some(surface) = self.surface.as_ref()
            && self.selection.capture(surface, range)
        {
            self.media.caret_moved(surface, &range);
        }
    }

    /// Key-down inside the surface. Returns `true` if it removed an anchor.
    pub fn on_key_down(&mut self, key: &str) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if self.media.key_down(surface, key) {
            self.settle();
            return true;
        }
        false
    }

    /// Single entry for every pointer-down the host sees.
    pub fn on_pointer_down(&mut self, region: PointerRegion, input: PointerInput) {
        self.toolbar.on_pointer_down(region);
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if region != PointerRegion::Surface {
            self.media.clear_active();
            return;
        }
        match self.media.pointer_down(surface, self.layout.as_ref(), input) {
            PointerDownOutcome::Ignored => self.media.clear_active(),
            PointerDownOutcome::Captured => {}
            PointerDownOutcome::Deleted => {
                self.settle();
            }
        }
    }

    /// Pointer-down outside the editor root.
    pub fn on_outside_pointer_down(&mut self) {
        self.toolbar.on_pointer_down(PointerRegion::Outside);
        self.media.clear_active();
    }

    pub fn on_pointer_move(&mut self, input: PointerInput) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.media.pointer_move(surface, self.layout.as_ref(), input)
    }

    /// Pointer-up inside the surface. Ends an anchor gesture, or records the
    /// text selection the host reports.
    pub fn on_pointer_up(&mut self, input: PointerInput, range: Option<SurfaceRange>) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.media.pointer_up(surface, input) {
            self.settle();
            return;
        }
        if let Some(range) = range {
            self.selection.capture(surface, range);
        }
    }

    pub fn on_pointer_cancel(&mut self, pointer_id: u32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.media.pointer_cancel(surface, pointer_id) {
            self.settle();
        }
    }

    pub fn on_drag_start(&mut self, target: NodeId) -> Option<DragPayload> {
        let surface = self.surface.as_ref()?;
        self.media.drag_start(surface, target)
    }

    pub fn on_drop(&mut self, payload: &DragPayload, client: Point) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if !self.media.drop_at(surface, self.layout.as_ref(), payload, client) {
            return false;
        }
        self.settle();
        true
    }

    /// Run a toolbar command against the remembered selection.
    pub fn exec(&mut self, command: &Command) -> Option<Patch> {
        let surface = self.surface.as_mut()?;
        self.focused = true;
        let patch = self
            .dispatcher
            .dispatch(surface, &mut self.selection, command)?;
        self.settle();
        Some(patch)
    }

    /// Restyle the selected list items, creating a list when there is none.
    pub fn apply_list_style(&mut self, style: &ListStyle) -> Option<Patch> {
        let surface = self.surface.as_mut()?;
        self.focused = true;
        let range = self.selection.restore(surface)?;
        let new_selection = lists::apply_list_style(
            surface,
            range,
            style,
            self.dispatcher.options(),
            self.config.max_marker_chars,
        )?;
        self.selection.capture(surface, new_selection);
        let patch = self.dispatcher.record(new_selection);
        self.settle();
        Some(patch)
    }

    /// Insert a floating image from an already-encoded source URI.
    pub fn insert_image(&mut self, source: &str) -> Option<MediaAnchor> {
        let surface = self.surface.as_mut()?;
        let anchor = self
            .media
            .insert(surface, &mut self.selection, self.layout.as_ref(), source)?;
        let inserted = MediaAnchor::from_node(surface, anchor);
        self.settle();
        inserted
    }

    /// Insert a floating image read from a local file. Unreadable files
    /// insert nothing.
    pub fn insert_image_file(&mut self, path: &Path) -> Option<MediaAnchor> {
        self.surface.as_ref()?;
        let source = io::read_image_data_url(path)?;
        self.insert_image(&source)
    }

    pub fn anchors(&self) -> Vec<MediaAnchor> {
        self.surface
            .as_ref()
            .map(|s| self.media.anchors(s))
            .unwrap_or_default()
    }

    pub fn active_anchor(&self) -> Option<NodeId> {
        self.media.active(self.surface.as_ref()?)
    }
}
