/*!
 * # Editing Core
 *
 * The rich-text block editor that sits on top of the [`Surface`](crate::surface::Surface).
 *
 * ## Data Flow
 *
 * ```text
 * store value ──► SyncBridge ──► surface
 * input / toolbar ──► CommandDispatcher / ListRestructurer / MediaAnchorEngine
 *                 ──► surface ──► SyncBridge ──► on_change ──► store
 * ```
 *
 * Toolbar interaction steals focus and with it the live selection, so every
 * command first restores the range captured by [`SelectionMemory`] on the
 * last key-up or pointer-up inside the surface.
 *
 * ## Module Structure
 *
 * - **`editor`**: `Editor` facade owning one surface and the host event entry points
 * - **`format`**: the elementary formatting primitive (bold, justify, links, list creation)
 * - **`commands`**: `Command` enum and the selection-restoring `CommandDispatcher`
 * - **`lists`**: list restyling with split-into-fragments semantics
 * - **`media`**: floating image anchors, pointer drag/resize and drag-and-drop
 * - **`sync`**: loop-free two-way sync with the external store
 * - **`selection`**: selection snapshots that die with wholesale rewrites
 * - **`toolbar`**: toolbar visibility and the single popover registry
 * - **`layout`**: geometry types and the `SurfaceLayout` host seam
 * - **`patch`**: result metadata for a successful command
 */

pub mod commands;
pub mod editor;
pub mod format;
pub mod layout;
pub mod lists;
pub mod media;
pub mod patch;
pub mod selection;
pub mod sync;
pub mod toolbar;

pub use commands::{Command, CommandDispatcher};
pub use editor::Editor;
pub use format::{Alignment, FormatCommand, FormatOptions};
pub use layout::{ContentBox, Point, Rect, Size, StaticLayout, SurfaceLayout};
pub use lists::{ListKind, ListStyle, apply_list_style, list_style_of, sanitize_marker};
pub use media::{DragPayload, MediaAnchor, MediaAnchorEngine, PointerDownOutcome, PointerInput};
pub use patch::Patch;
pub use selection::{SelectionMemory, SelectionSnapshot};
pub use sync::{SyncBridge, SyncState};
pub use toolbar::{PointerRegion, Popover, PopoverRegistry, ToolbarVisibility};
