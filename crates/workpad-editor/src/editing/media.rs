//! # Media Anchors
//!
//! Floating images embedded in the surface. Each anchor is a non-editable
//! wrapper carrying its own geometry as presentation attributes:
//!
//! ```text
//! <div class="media-anchor" data-anchor-id="anchor-..." data-floating="true"
//!      contenteditable="false" draggable="true"
//!      style="position: absolute; left: 12px; top: 12px; width: 160px; height: auto">
//!   <img src="..." alt="" draggable="false">
//!   <span class="media-anchor-resize" contenteditable="false"></span>
//!   <button class="media-anchor-delete" contenteditable="false" type="button">×</button>
//! </div>
//! ```
//!
//! The anchor is an object with a pixel position, a size and a
//! document-order attachment point. Pointer drags move the pixel position,
//! native drag-and-drop moves the attachment point and re-places the anchor
//! at the drop point, so the two never disagree after a gesture settles.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use workpad_config::EditorConfig;

use crate::editing::layout::{Point, Size, SurfaceLayout};
use crate::editing::selection::SelectionMemory;
use crate::surface::{Element, NodeId, Position, Surface, SurfaceRange};

pub const ANCHOR_CLASS: &str = "media-anchor";
pub const RESIZE_CLASS: &str = "media-anchor-resize";
pub const DELETE_CLASS: &str = "media-anchor-delete";

/// Drag payload type for anchor reordering.
pub const DRAG_MIME: &str = "application/x-workpad-anchor";

const ID_ATTR: &str = "data-anchor-id";
const FLOATING_ATTR: &str = "data-floating";

/// Caret landing spot after an anchor; invisible and dropped by normalize.
const CARET_SLOT: &str = "\u{200b}";

/// A floating media object as persisted in the document value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAnchor {
    pub id: String,
    pub source: String,
    pub position: Point,
    pub width: f64,
    /// `None` while the height follows the image (`height: auto`)
    pub height: Option<f64>,
    pub floating: bool,
}

impl MediaAnchor {
    /// Read an anchor back from its wrapper element.
    pub fn from_node(surface: &Surface, node: NodeId) -> Option<Self> {
        let el = surface.element(node)?;
        let id = el.attr(ID_ATTR)?.to_string();
        let source = surface
            .children(node)
            .iter()
            .filter_map(|&c| surface.element(c))
            .find(|c| c.tag == "img")
            .and_then(|img| img.attr("src"))
            .unwrap_or_default()
            .to_string();
        let (position, width, height) = geometry(el);
        Some(Self {
            id,
            source,
            position,
            width: width.unwrap_or_default(),
            height,
            floating: el.attr(FLOATING_ATTR) == Some("true"),
        })
    }
}

/// Size limits and defaults for anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorLimits {
    pub default_width: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Offset from the visible top-left when no caret position is known
    pub insert_margin: f64,
}

impl Default for AnchorLimits {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for AnchorLimits {
    fn from(config: &EditorConfig) -> Self {
        Self {
            default_width: f64::from(config.default_anchor_width),
            min_width: f64::from(config.min_anchor_width),
            min_height: f64::from(config.min_anchor_height),
            insert_margin: f64::from(config.insert_margin),
        }
    }
}

/// One pointer event as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub pointer_id: u32,
    pub client: Point,
    /// Node under the pointer, from the host's hit test
    pub target: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub mime: String,
    pub data: String,
}

/// What a pointer-down on the surface amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDownOutcome {
    /// Not on an anchor
    Ignored,
    /// A drag or resize gesture now owns this pointer
    Captured,
    /// The delete control was hit and the anchor is gone
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Dragging {
        anchor: NodeId,
        pointer_id: u32,
        /// Pointer offset inside the anchor box
        grab: Point,
        size: Size,
    },
    Resizing {
        anchor: NodeId,
        pointer_id: u32,
        start_size: Size,
        start_pointer: Point,
    },
}

/// Inserts, moves, resizes and deletes media anchors.
#[derive(Debug, Default)]
pub struct MediaAnchorEngine {
    limits: AnchorLimits,
    active: Option<NodeId>,
    gesture: Gesture,
    /// Surface generation the gesture was captured in
    gesture_generation: u64,
}

impl MediaAnchorEngine {
    pub fn new(limits: AnchorLimits) -> Self {
        Self {
            limits,
            active: None,
            gesture: Gesture::Idle,
            gesture_generation: 0,
        }
    }

    pub fn limits(&self) -> AnchorLimits {
        self.limits
    }

    /// The anchor that received the last interaction, if still attached.
    pub fn active(&self, surface: &Surface) -> Option<NodeId> {
        self.active.filter(|&a| surface.is_attached(a))
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Whether a pointer gesture is in progress.
    pub fn is_gesturing(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Drop any in-flight drag or resize without touching the surface.
    pub fn abandon_gesture(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("abandoning {:?}", self.gesture);
        }
        self.gesture = Gesture::Idle;
    }

    /// The caret moved to `range`. Typing in ordinary text releases the
    /// active anchor so Delete/Backspace edit text again.
    pub fn caret_moved(&mut self, surface: &Surface, range: &SurfaceRange) {
        let in_anchor = surface
            .closest(range.start.node, |e| e.has_class(ANCHOR_CLASS))
            .is_some();
        if !in_anchor {
            self.active = None;
        }
    }

    /// A gesture captured before a wholesale replacement points into the old
    /// arena; its node ids now name unrelated nodes.
    fn drop_stale_gesture(&mut self, surface: &Surface) {
        if self.gesture != Gesture::Idle && self.gesture_generation != surface.generation() {
            self.abandon_gesture();
        }
    }

    /// Anchors in document order.
    pub fn anchors(&self, surface: &Surface) -> Vec<MediaAnchor> {
        anchor_nodes(surface)
            .into_iter()
            .filter_map(|n| MediaAnchor::from_node(surface, n))
            .collect()
    }

    /// Insert a floating image. Placed at the caret when the remembered
    /// selection is still valid, otherwise near the visible top-left.
    pub fn insert(
        &mut self,
        surface: &mut Surface,
        selection: &mut SelectionMemory,
        layout: &dyn SurfaceLayout,
        source: &str,
    ) -> Option<NodeId> {
        if source.is_empty() {
            return None;
        }
        let content = layout.content_box();
        let range = selection.restore(surface);

        let position = range
            .as_ref()
            .and_then(|r| layout.caret_rect(r))
            .map(|rect| content.to_content(rect.origin))
            .unwrap_or_else(|| {
                Point::new(
                    content.scroll.x + self.limits.insert_margin,
                    content.scroll.y + self.limits.insert_margin,
                )
            });
        let position = content.clamp(position, Size::new(self.limits.default_width, 0.0));

        let id = unique_id(surface);
        let anchor = build_anchor(surface, &id, source, position, self.limits.default_width);

        let root = surface.root();
        match range.and_then(|r| top_level(surface, r.start.node)) {
            Some(block) => surface.insert_after(block, anchor),
            None => surface.append_child(root, anchor),
        }
        ensure_caret_slot(surface, anchor);

        log::debug!("inserted anchor {id} at {position:?}");
        self.active = Some(anchor);
        Some(anchor)
    }

    pub fn pointer_down(
        &mut self,
        surface: &mut Surface,
        layout: &dyn SurfaceLayout,
        input: PointerInput,
    ) -> PointerDownOutcome {
        let Some(target) = input.target else {
            return PointerDownOutcome::Ignored;
        };
        let Some(anchor) = surface.closest(target, |e| e.has_class(ANCHOR_CLASS)) else {
            return PointerDownOutcome::Ignored;
        };
        self.active = Some(anchor);

        if surface.closest(target, |e| e.has_class(DELETE_CLASS)).is_some() {
            self.delete(surface, anchor);
            return PointerDownOutcome::Deleted;
        }

        let (origin, size) = self.anchor_box(surface, layout, anchor);
        self.gesture = if surface.closest(target, |e| e.has_class(RESIZE_CLASS)).is_some() {
            Gesture::Resizing {
                anchor,
                pointer_id: input.pointer_id,
                start_size: size,
                start_pointer: input.client,
            }
        } else {
            Gesture::Dragging {
                anchor,
                pointer_id: input.pointer_id,
                grab: Point::new(input.client.x - origin.x, input.client.y - origin.y),
                size,
            }
        };
        self.gesture_generation = surface.generation();
        log::debug!("pointer {} captured by {:?}", input.pointer_id, self.gesture);
        PointerDownOutcome::Captured
    }

    /// Apply a pointer move to the active gesture. Returns whether anything
    /// moved.
    pub fn pointer_move(
        &mut self,
        surface: &mut Surface,
        layout: &dyn SurfaceLayout,
        input: PointerInput,
    ) -> bool {
        self.drop_stale_gesture(surface);
        match self.gesture {
            Gesture::Dragging {
                anchor,
                pointer_id,
                grab,
                size,
            } if pointer_id == input.pointer_id => {
                let content = layout.content_box();
                let top_left =
                    content.to_content(Point::new(input.client.x - grab.x, input.client.y - grab.y));
                let position = content.clamp(top_left, size);
                write_position(surface, anchor, position)
            }
            Gesture::Resizing {
                anchor,
                pointer_id,
                start_size,
                start_pointer,
            } if pointer_id == input.pointer_id => {
                let width = (start_size.width + input.client.x - start_pointer.x)
                    .max(self.limits.min_width);
                let height = (start_size.height + input.client.y - start_pointer.y)
                    .max(self.limits.min_height);
                write_size(surface, anchor, width, Some(height))
            }
            _ => false,
        }
    }

    /// Finish the gesture owning this pointer. Returns `true` when the
    /// surface settled and needs syncing.
    pub fn pointer_up(&mut self, surface: &mut Surface, input: PointerInput) -> bool {
        self.drop_stale_gesture(surface);
        let Some((anchor, size)) = self.release(input.pointer_id) else {
            return false;
        };
        if !surface.is_attached(anchor) {
            return false;
        }
        snap_to_pixels(surface, anchor, size.width);
        ensure_caret_slot(surface, anchor);
        true
    }

    /// Capture was lost: keep the last applied geometry, no rollback.
    pub fn pointer_cancel(&mut self, surface: &mut Surface, pointer_id: u32) -> bool {
        self.drop_stale_gesture(surface);
        let Some((anchor, _)) = self.release(pointer_id) else {
            return false;
        };
        log::debug!("pointer {pointer_id} cancelled; keeping last position");
        if !surface.is_attached(anchor) {
            return false;
        }
        ensure_caret_slot(surface, anchor);
        true
    }

    /// End the gesture owned by `pointer`, returning its anchor and the
    /// size it started from.
    fn release(&mut self, pointer: u32) -> Option<(NodeId, Size)> {
        let released = match self.gesture {
            Gesture::Dragging {
                anchor,
                pointer_id,
                size,
                ..
            }
            | Gesture::Resizing {
                anchor,
                pointer_id,
                start_size: size,
                ..
            } if pointer_id == pointer => (anchor, size),
            _ => return None,
        };
        self.gesture = Gesture::Idle;
        Some(released)
    }

    /// Native drag start over an anchor.
    pub fn drag_start(&mut self, surface: &Surface, target: NodeId) -> Option<DragPayload> {
        let anchor = surface.closest(target, |e| e.has_class(ANCHOR_CLASS))?;
        let id = surface.element(anchor)?.attr(ID_ATTR)?.to_string();
        self.active = Some(anchor);
        Some(DragPayload {
            mime: DRAG_MIME.to_string(),
            data: id,
        })
    }

    /// Native drop: move the anchor to the insertion point under `client`
    /// and place its top-left at the drop point.
    pub fn drop_at(
        &mut self,
        surface: &mut Surface,
        layout: &dyn SurfaceLayout,
        payload: &DragPayload,
        client: Point,
    ) -> bool {
        if payload.mime != DRAG_MIME {
            return false;
        }
        let Some(anchor) = find_anchor(surface, &payload.data) else {
            log::debug!("dropped unknown anchor {}", payload.data);
            return false;
        };

        let target = layout
            .position_at(client)
            .and_then(|pos| insertion_point(surface, pos, anchor));
        let slot = surface
            .next_sibling(anchor)
            .filter(|&n| surface.text(n) == Some(CARET_SLOT));
        match target {
            Some(pos) => surface.insert_at(pos, anchor),
            None => {
                let root = surface.root();
                surface.append_child(root, anchor);
            }
        }
        if let Some(slot) = slot {
            surface.insert_after(anchor, slot);
        }
        ensure_caret_slot(surface, anchor);

        let (_, size) = self.anchor_box(surface, layout, anchor);
        let content = layout.content_box();
        let position = content.clamp(content.to_content(client), size);
        write_position(surface, anchor, position);
        snap_to_pixels(surface, anchor, size.width);

        self.active = Some(anchor);
        true
    }

    /// Remove an anchor along with its caret slot.
    pub fn delete(&mut self, surface: &mut Surface, anchor: NodeId) -> bool {
        if !surface.is_attached(anchor) {
            return false;
        }
        take_caret_slot(surface, anchor);
        surface.detach(anchor);
        if self.active == Some(anchor) {
            self.active = None;
        }
        self.gesture = Gesture::Idle;
        true
    }

    /// Delete/Backspace removes the active anchor.
    pub fn key_down(&mut self, surface: &mut Surface, key: &str) -> bool {
        if !matches!(key, "Delete" | "Backspace") {
            return false;
        }
        match self.active(surface) {
            Some(anchor) => self.delete(surface, anchor),
            None => false,
        }
    }

    /// Client-space top-left and size of an anchor, measured when the host
    /// can, otherwise from the stored attributes.
    fn anchor_box(&self, surface: &Surface, layout: &dyn SurfaceLayout, anchor: NodeId) -> (Point, Size) {
        if let Some(rect) = layout.anchor_box(anchor) {
            return (rect.origin, rect.size);
        }
        let (position, width, height) = surface.element(anchor).map(geometry).unwrap_or_default();
        let size = Size::new(
            width.unwrap_or(self.limits.default_width),
            height.unwrap_or(self.limits.min_height),
        );
        (layout.content_box().to_client(position), size)
    }
}

fn anchor_nodes(surface: &Surface) -> Vec<NodeId> {
    surface
        .descendants(surface.root())
        .into_iter()
        .filter(|&n| surface.element_is(n, |e| e.attr(ID_ATTR).is_some()))
        .collect()
}

fn find_anchor(surface: &Surface, id: &str) -> Option<NodeId> {
    anchor_nodes(surface)
        .into_iter()
        .find(|&n| surface.element(n).and_then(|e| e.attr(ID_ATTR)) == Some(id))
}

/// `anchor-<millis>-<6 random hex>`, unique within the surface.
fn unique_id(surface: &Surface) -> String {
    let taken: HashSet<String> = anchor_nodes(surface)
        .into_iter()
        .filter_map(|n| surface.element(n)?.attr(ID_ATTR).map(str::to_string))
        .collect();
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    loop {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("anchor-{millis}-{}", &suffix[..6]);
        if !taken.contains(&id) {
            return id;
        }
    }
}

fn build_anchor(surface: &mut Surface, id: &str, source: &str, position: Point, width: f64) -> NodeId {
    let mut wrapper = Element::new("div")
        .with_attr("class", ANCHOR_CLASS)
        .with_attr(ID_ATTR, id)
        .with_attr(FLOATING_ATTR, "true")
        .with_attr("contenteditable", "false")
        .with_attr("draggable", "true");
    wrapper.set_style_prop("position", "absolute");
    set_geometry(&mut wrapper, position, width, None);
    let wrapper = surface.create_element(wrapper);

    let image = surface.create_element(
        Element::new("img")
            .with_attr("src", source)
            .with_attr("alt", "")
            .with_attr("draggable", "false"),
    );
    let resize = surface.create_element(
        Element::new("span")
            .with_attr("class", RESIZE_CLASS)
            .with_attr("contenteditable", "false"),
    );
    let delete = surface.create_element(
        Element::new("button")
            .with_attr("class", DELETE_CLASS)
            .with_attr("contenteditable", "false")
            .with_attr("type", "button"),
    );
    let cross = surface.create_text("\u{d7}");
    surface.append_child(delete, cross);

    for child in [image, resize, delete] {
        surface.append_child(wrapper, child);
    }
    wrapper
}

fn px(value: f64) -> String {
    format!("{value}px")
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

fn geometry(el: &Element) -> (Point, Option<f64>, Option<f64>) {
    let style = el.style();
    let read = |prop: &str| style.get(prop).and_then(parse_px);
    (
        Point::new(read("left").unwrap_or_default(), read("top").unwrap_or_default()),
        read("width"),
        read("height"),
    )
}

fn set_geometry(el: &mut Element, position: Point, width: f64, height: Option<f64>) {
    el.set_style_prop("left", &px(position.x));
    el.set_style_prop("top", &px(position.y));
    el.set_style_prop("width", &px(width));
    el.set_style_prop("height", &height.map(px).unwrap_or_else(|| "auto".to_string()));
}

fn write_position(surface: &mut Surface, anchor: NodeId, position: Point) -> bool {
    let Some(el) = surface.element_mut(anchor) else {
        return false;
    };
    el.set_style_prop("left", &px(position.x));
    el.set_style_prop("top", &px(position.y));
    true
}

fn write_size(surface: &mut Surface, anchor: NodeId, width: f64, height: Option<f64>) -> bool {
    let Some(el) = surface.element_mut(anchor) else {
        return false;
    };
    el.set_style_prop("width", &px(width));
    el.set_style_prop("height", &height.map(px).unwrap_or_else(|| "auto".to_string()));
    true
}

/// Round the stored geometry. A missing or zero width takes `fallback_width`.
fn snap_to_pixels(surface: &mut Surface, anchor: NodeId, fallback_width: f64) {
    let Some(el) = surface.element_mut(anchor) else {
        return;
    };
    let (position, width, height) = geometry(el);
    let position = Point::new(position.x.round(), position.y.round());
    let width = width
        .filter(|&w| w > 0.0)
        .unwrap_or(fallback_width)
        .round()
        .max(1.0);
    set_geometry(el, position, width, height.map(f64::round));
}

/// Make sure a text node follows the anchor so the caret can land after it.
fn ensure_caret_slot(surface: &mut Surface, anchor: NodeId) {
    let followed_by_text = surface
        .next_sibling(anchor)
        .is_some_and(|next| surface.is_text(next));
    if !followed_by_text {
        let slot = surface.create_text(CARET_SLOT);
        surface.insert_after(anchor, slot);
    }
}

/// Detach the anchor's own caret slot, if it has one, and hand it back.
fn take_caret_slot(surface: &mut Surface, anchor: NodeId) -> Option<NodeId> {
    let next = surface.next_sibling(anchor)?;
    if surface.text(next) != Some(CARET_SLOT) {
        return None;
    }
    surface.detach(next);
    Some(next)
}

/// The child of the root that contains `node`.
fn top_level(surface: &Surface, node: NodeId) -> Option<NodeId> {
    let root = surface.root();
    if node == root {
        return None;
    }
    let mut current = node;
    while let Some(parent) = surface.parent(current) {
        if parent == root {
            return Some(current);
        }
        current = parent;
    }
    None
}

/// Where a dropped anchor lands. Drops onto another anchor go right after
/// it; drops onto the moving anchor keep its attachment point.
fn insertion_point(surface: &Surface, pos: Position, moving: NodeId) -> Option<Position> {
    if !surface.is_valid_position(pos) {
        return None;
    }
    let Some(host) = surface.closest(pos.node, Element::is_non_editable) else {
        return Some(pos);
    };
    let host = surface.closest(host, |e| e.has_class(ANCHOR_CLASS)).unwrap_or(host);
    let parent = surface.parent(host)?;
    let index = surface.index_in_parent(host)?;
    if host == moving {
        return Some(Position::new(parent, index));
    }
    Some(Position::new(parent, index + 1))
}
