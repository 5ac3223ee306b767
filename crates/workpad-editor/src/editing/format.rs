//! # Formatting Primitive
//!
//! Elementary formatting over the in-memory surface: given a command and a
//! range, mutate the tree and report the range that now covers the same
//! content.
//!
//! Boundaries that fall inside text nodes are split first so every
//! operation works on whole text runs. Runs are *moved* into wrappers, never
//! re-created, which keeps positions held elsewhere (selection snapshots,
//! list item references) pointing at the same text.

use crate::editing::lists::ListKind;
use crate::surface::{Element, NodeId, Position, Surface, SurfaceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn css_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// One elementary formatting operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Justify(Alignment),
    ForeColor(String),
    HiliteColor(String),
    FontName(String),
    FontSize(String),
    CreateLink(String),
    InsertText(String),
    RemoveFormat,
    InsertList(ListKind),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Express bold/italic/underline as `style` attributes rather than tags.
    pub style_with_css: bool,
}

/// Run a formatting command. `None` means nothing changed.
pub fn execute(
    surface: &mut Surface,
    range: SurfaceRange,
    command: &FormatCommand,
    options: FormatOptions,
) -> Option<SurfaceRange> {
    if !surface.is_valid_position(range.start) || !surface.is_valid_position(range.end) {
        return None;
    }
    let range = surface.ordered(range);

    match command {
        FormatCommand::Bold => toggle_inline(surface, range, InlineStyle::Bold, options),
        FormatCommand::Italic => toggle_inline(surface, range, InlineStyle::Italic, options),
        FormatCommand::Underline => toggle_inline(surface, range, InlineStyle::Underline, options),
        FormatCommand::Justify(alignment) => justify(surface, range, *alignment),
        FormatCommand::ForeColor(color) => apply_style_prop(surface, range, "color", color),
        FormatCommand::HiliteColor(color) => {
            apply_style_prop(surface, range, "background-color", color)
        }
        FormatCommand::FontName(family) => apply_style_prop(surface, range, "font-family", family),
        FormatCommand::FontSize(size) => apply_style_prop(surface, range, "font-size", size),
        FormatCommand::CreateLink(url) => create_link(surface, range, url),
        FormatCommand::InsertText(text) => insert_text(surface, range, text),
        FormatCommand::RemoveFormat => remove_format(surface, range),
        FormatCommand::InsertList(kind) => insert_list(surface, range, *kind),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineStyle {
    Bold,
    Italic,
    Underline,
}

impl InlineStyle {
    fn tag(self) -> &'static str {
        match self {
            InlineStyle::Bold => "b",
            InlineStyle::Italic => "i",
            InlineStyle::Underline => "u",
        }
    }

    fn tags(self) -> &'static [&'static str] {
        match self {
            InlineStyle::Bold => &["b", "strong"],
            InlineStyle::Italic => &["i", "em"],
            InlineStyle::Underline => &["u"],
        }
    }

    fn prop(self) -> &'static str {
        match self {
            InlineStyle::Bold => "font-weight",
            InlineStyle::Italic => "font-style",
            InlineStyle::Underline => "text-decoration",
        }
    }

    fn on_value(self) -> &'static str {
        match self {
            InlineStyle::Bold => "bold",
            InlineStyle::Italic => "italic",
            InlineStyle::Underline => "underline",
        }
    }

    fn off_value(self) -> &'static str {
        match self {
            InlineStyle::Bold | InlineStyle::Italic => "normal",
            InlineStyle::Underline => "none",
        }
    }

    fn is_on(self, value: &str) -> bool {
        let value = value.trim().to_ascii_lowercase();
        match self {
            InlineStyle::Bold => {
                value == "bold" || value == "bolder" || value.parse::<u32>().is_ok_and(|w| w >= 600)
            }
            InlineStyle::Italic => value == "italic" || value == "oblique",
            InlineStyle::Underline => value.contains("underline"),
        }
    }

    /// `Some(on)` when the element decides this style, `None` when neutral.
    fn decided_by(self, el: &Element) -> Option<bool> {
        if let Some(value) = el.style_prop(self.prop()) {
            return Some(self.is_on(&value));
        }
        self.tags().contains(&el.tag.as_str()).then_some(true)
    }
}

/// Split text nodes at the range boundaries so the range covers whole runs.
fn split_boundaries(surface: &mut Surface, range: SurfaceRange) -> SurfaceRange {
    let mut range = range;
    if surface.is_text(range.end.node) {
        // splitting the end first leaves the start offset untouched
        surface.split_text(range.end.node, range.end.offset);
    }
    if surface.is_text(range.start.node)
        && let Some(right) = surface.split_text(range.start.node, range.start.offset)
    {
        if range.end.node == range.start.node {
            range.end = Position::new(right, range.end.offset - range.start.offset);
        }
        range.start = Position::new(right, 0);
    }
    range
}

fn inside_non_editable(surface: &Surface, node: NodeId) -> bool {
    surface.closest(node, Element::is_non_editable).is_some()
}

/// Whitespace between structural elements is layout noise, not content.
fn is_structural_whitespace(surface: &Surface, text: NodeId) -> bool {
    let blank = surface.text(text).is_some_and(|t| t.trim().is_empty());
    let structural_parent = match surface.parent(text) {
        Some(p) if p == surface.root() => true,
        Some(p) => surface.element_is(p, |e| {
            e.is_list() || matches!(e.tag.as_str(), "table" | "tr" | "tbody" | "thead")
        }),
        None => true,
    };
    blank && structural_parent
}

fn is_content_text(surface: &Surface, node: NodeId) -> bool {
    surface.text(node).is_some_and(|t| !t.is_empty())
        && !is_structural_whitespace(surface, node)
        && !inside_non_editable(surface, node)
}

/// Text runs lying entirely inside the range, in document order.
pub(crate) fn selected_text_nodes(surface: &Surface, range: &SurfaceRange) -> Vec<NodeId> {
    if range.is_collapsed() {
        return Vec::new();
    }
    surface
        .descendants(surface.root())
        .into_iter()
        .filter(|&n| is_content_text(surface, n))
        .filter(|&n| {
            let len = surface.node_len(n);
            let starts_after = surface
                .compare_positions(Position::new(n, 0), range.start)
                .is_some_and(|o| o.is_ge());
            let ends_before = surface
                .compare_positions(Position::new(n, len), range.end)
                .is_some_and(|o| o.is_le());
            starts_after && ends_before
        })
        .collect()
}

fn cover(surface: &Surface, runs: &[NodeId]) -> Option<SurfaceRange> {
    let first = *runs.first()?;
    let last = *runs.last()?;
    Some(SurfaceRange::new(
        Position::new(first, 0),
        Position::new(last, surface.node_len(last)),
    ))
}

/// The node a collapsed caret sits in or next to.
fn caret_node(surface: &Surface, pos: Position) -> Option<NodeId> {
    if surface.is_text(pos.node) {
        return Some(pos.node);
    }
    let children = surface.children(pos.node);
    let near = children
        .get(pos.offset)
        .or_else(|| pos.offset.checked_sub(1).and_then(|i| children.get(i)))
        .copied();
    match near {
        Some(n) => Some(n),
        None if pos.node != surface.root() => Some(pos.node),
        None => None,
    }
}

/// Nearest block that text alignment or list conversion can act on.
fn block_for(surface: &Surface, node: NodeId) -> Option<NodeId> {
    surface.closest(node, |e| e.is_block() && !e.is_list())
}

/// Wrap the maximal run of inline siblings around `node` in a `div`.
///
/// Only valid when `node` has no block ancestor.
fn wrap_inline_run(surface: &mut Surface, node: NodeId) -> NodeId {
    let root = surface.root();
    let mut top = node;
    while let Some(parent) = surface.parent(top) {
        if parent == root {
            break;
        }
        top = parent;
    }

    let is_inline = |s: &Surface, n: NodeId| !s.element_is(n, Element::is_block);
    let mut first = top;
    while let Some(prev) = surface.previous_sibling(first) {
        if !is_inline(surface, prev) {
            break;
        }
        first = prev;
    }
    let mut run = vec![first];
    let mut last = first;
    while let Some(next) = surface.next_sibling(last) {
        if !is_inline(surface, next) {
            break;
        }
        run.push(next);
        last = next;
    }

    let div = surface.create_element(Element::new("div"));
    surface.insert_before(first, div);
    for n in run {
        surface.append_child(div, n);
    }
    div
}

/// Split `parent` so that `child` is its only child; siblings move into
/// shallow copies placed before and after.
fn split_around(surface: &mut Surface, parent: NodeId, child: NodeId) {
    let children = surface.children(parent).to_vec();
    let Some(idx) = children.iter().position(|&c| c == child) else {
        return;
    };
    let (before, rest) = children.split_at(idx);
    let after = &rest[1..];

    if !before.is_empty() {
        let copy = clone_without_id(surface, parent);
        surface.insert_before(parent, copy);
        for &n in before {
            surface.append_child(copy, n);
        }
    }
    if !after.is_empty() {
        let copy = clone_without_id(surface, parent);
        surface.insert_after(parent, copy);
        for &n in after {
            surface.append_child(copy, n);
        }
    }
}

pub(crate) fn clone_without_id(surface: &mut Surface, id: NodeId) -> NodeId {
    let copy = surface.shallow_clone(id);
    if let Some(el) = surface.element_mut(copy) {
        el.remove_attr("id");
    }
    copy
}

/// Split every element between `node` and `ancestor` (inclusive) so that
/// `ancestor` ends up wrapping nothing but `node`.
fn isolate(surface: &mut Surface, node: NodeId, ancestor: NodeId) {
    let mut current = node;
    while let Some(parent) = surface.parent(current) {
        split_around(surface, parent, current);
        if parent == ancestor {
            break;
        }
        current = parent;
    }
}

/// Inline (non-block) element ancestors of `node`, nearest first.
fn inline_ancestors(surface: &Surface, node: NodeId) -> Vec<NodeId> {
    surface
        .ancestors(node)
        .take_while(|&n| surface.element(n).is_some_and(|e| !e.is_block()))
        .collect()
}

fn wrap_with_prop(surface: &mut Surface, text: NodeId, prop: &str, value: &str) {
    if let Some(parent) = surface.parent(text)
        && surface.children(parent).len() == 1
        && let Some(el) = surface.element_mut(parent)
        && el.tag == "span"
    {
        el.set_style_prop(prop, value);
        return;
    }
    let mut span = Element::new("span");
    span.set_style_prop(prop, value);
    let span = surface.create_element(span);
    surface.wrap(text, span);
}

fn has_inline_style(surface: &Surface, text: NodeId, style: InlineStyle) -> bool {
    surface
        .ancestors(text)
        .filter_map(|n| surface.element(n))
        .find_map(|el| style.decided_by(el))
        .unwrap_or(false)
}

fn toggle_inline(
    surface: &mut Surface,
    range: SurfaceRange,
    style: InlineStyle,
    options: FormatOptions,
) -> Option<SurfaceRange> {
    let range = split_boundaries(surface, range);
    let runs = selected_text_nodes(surface, &range);
    if runs.is_empty() {
        return None;
    }

    let all_on = runs.iter().all(|&t| has_inline_style(surface, t, style));
    for &text in &runs {
        if all_on {
            clear_inline_style(surface, text, style);
        } else if !has_inline_style(surface, text, style) {
            if options.style_with_css {
                wrap_with_prop(surface, text, style.prop(), style.on_value());
            } else {
                let wrapper = surface.create_element(Element::new(style.tag()));
                surface.wrap(text, wrapper);
            }
        }
    }
    cover(surface, &runs)
}

fn clear_inline_style(surface: &mut Surface, text: NodeId, style: InlineStyle) {
    while has_inline_style(surface, text, style) {
        let provider = inline_ancestors(surface, text)
            .into_iter()
            .find(|&n| surface.element(n).and_then(|e| style.decided_by(e)) == Some(true));

        let Some(provider) = provider else {
            // decided by a block ancestor; override locally
            wrap_with_prop(surface, text, style.prop(), style.off_value());
            return;
        };

        isolate(surface, text, provider);
        let Some(el) = surface.element_mut(provider) else {
            return;
        };
        if el.style_prop(style.prop()).is_some() {
            el.remove_style_prop(style.prop());
        } else {
            // structural tag: swap it for a plain span keeping other attributes
            el.tag = "span".to_string();
        }
        if el.tag == "span" && el.attrs.is_empty() {
            surface.unwrap(provider);
        }
    }
}

fn apply_style_prop(
    surface: &mut Surface,
    range: SurfaceRange,
    prop: &str,
    value: &str,
) -> Option<SurfaceRange> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let range = split_boundaries(surface, range);
    let runs = selected_text_nodes(surface, &range);
    if runs.is_empty() {
        return None;
    }
    for &text in &runs {
        wrap_with_prop(surface, text, prop, value);
    }
    cover(surface, &runs)
}

fn justify(surface: &mut Surface, range: SurfaceRange, alignment: Alignment) -> Option<SurfaceRange> {
    let touched: Vec<NodeId> = if range.is_collapsed() {
        caret_node(surface, range.start).into_iter().collect()
    } else {
        surface
            .descendants(surface.root())
            .into_iter()
            .filter(|&n| is_content_text(surface, n) && surface.intersects_node(&range, n))
            .collect()
    };

    let mut blocks: Vec<NodeId> = Vec::new();
    for node in touched {
        if inside_non_editable(surface, node) {
            continue;
        }
        let block = match block_for(surface, node) {
            Some(b) => b,
            None => wrap_inline_run(surface, node),
        };
        if !blocks.contains(&block) {
            blocks.push(block);
        }
    }
    if blocks.is_empty() {
        return None;
    }

    for block in blocks {
        if let Some(el) = surface.element_mut(block) {
            el.set_style_prop("text-align", alignment.css_value());
        }
    }
    Some(range)
}

fn create_link(surface: &mut Surface, range: SurfaceRange, url: &str) -> Option<SurfaceRange> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if range.is_collapsed() {
        if inside_non_editable(surface, range.start.node) {
            return None;
        }
        let link = surface.create_element(Element::new("a").with_attr("href", url));
        let text = surface.create_text(url);
        surface.append_child(link, text);
        surface.insert_at(range.start, link);
        return Some(SurfaceRange::new(
            Position::new(text, 0),
            Position::new(text, url.len()),
        ));
    }

    let range = split_boundaries(surface, range);
    let runs = selected_text_nodes(surface, &range);
    if runs.is_empty() {
        return None;
    }
    for &text in &runs {
        match surface.closest(text, |e| e.tag == "a") {
            Some(existing) => {
                if let Some(el) = surface.element_mut(existing) {
                    el.set_attr("href", url);
                }
            }
            None => {
                let link = surface.create_element(Element::new("a").with_attr("href", url));
                surface.wrap(text, link);
            }
        }
    }
    cover(surface, &runs)
}

/// Remove empty inline wrappers left behind after deleting their content.
fn prune_empty_inline(surface: &mut Surface, node: Option<NodeId>) {
    let mut current = node;
    while let Some(n) = current {
        let empty_inline = surface.children(n).is_empty()
            && surface.element_is(n, |e| e.is_inline_format() || e.tag == "a");
        if !empty_inline {
            break;
        }
        current = surface.parent(n);
        surface.detach(n);
    }
}

fn insert_text(surface: &mut Surface, range: SurfaceRange, text: &str) -> Option<SurfaceRange> {
    if text.is_empty() {
        return None;
    }

    let mut caret = range.start;
    if !range.is_collapsed() {
        let range = split_boundaries(surface, range);
        let runs = selected_text_nodes(surface, &range);
        if let Some((&first, rest)) = runs.split_first() {
            if let Some(t) = surface.text_mut(first) {
                *t = text.to_string();
            }
            for &run in rest {
                let parent = surface.parent(run);
                surface.detach(run);
                prune_empty_inline(surface, parent);
            }
            return Some(SurfaceRange::collapsed(Position::new(first, text.len())));
        }
        caret = range.start;
    }

    if inside_non_editable(surface, caret.node)
        || surface.element_is(caret.node, Element::is_void)
    {
        return None;
    }

    if let Some(existing) = surface.text_mut(caret.node) {
        existing.insert_str(caret.offset, text);
        return Some(SurfaceRange::collapsed(Position::new(
            caret.node,
            caret.offset + text.len(),
        )));
    }

    let children = surface.children(caret.node);
    let before = caret
        .offset
        .checked_sub(1)
        .and_then(|i| children.get(i))
        .copied()
        .filter(|&n| surface.is_text(n));
    let after = children
        .get(caret.offset)
        .copied()
        .filter(|&n| surface.is_text(n));

    if let Some(node) = before
        && let Some(t) = surface.text_mut(node)
    {
        t.push_str(text);
        let len = t.len();
        return Some(SurfaceRange::collapsed(Position::new(node, len)));
    }
    if let Some(node) = after
        && let Some(t) = surface.text_mut(node)
    {
        t.insert_str(0, text);
        return Some(SurfaceRange::collapsed(Position::new(node, text.len())));
    }

    let node = surface.create_text(text);
    surface.insert_child(caret.node, caret.offset, node);
    Some(SurfaceRange::collapsed(Position::new(node, text.len())))
}

fn remove_format(surface: &mut Surface, range: SurfaceRange) -> Option<SurfaceRange> {
    if range.is_collapsed() {
        return None;
    }
    let range = split_boundaries(surface, range);
    let runs = selected_text_nodes(surface, &range);
    if runs.is_empty() {
        return None;
    }

    for &text in &runs {
        while let Some(wrapper) = inline_ancestors(surface, text)
            .into_iter()
            .find(|&n| surface.element_is(n, Element::is_inline_format))
        {
            isolate(surface, text, wrapper);
            surface.unwrap(wrapper);
        }
    }
    cover(surface, &runs)
}

/// The block (or freshly wrapped inline run) a list item is built from.
fn list_unit(surface: &mut Surface, pos: Position) -> Option<NodeId> {
    let node = caret_node(surface, pos)?;
    if inside_non_editable(surface, node) {
        return None;
    }
    Some(match block_for(surface, node) {
        Some(block) => block,
        None => wrap_inline_run(surface, node),
    })
}

fn retag(surface: &mut Surface, list: NodeId, tag: &str) -> NodeId {
    let Some(el) = surface.element(list) else {
        return list;
    };
    let mut replacement = el.clone();
    replacement.tag = tag.to_string();
    let replacement = surface.create_element(replacement);
    surface.insert_before(list, replacement);
    surface.move_children(list, replacement);
    surface.detach(list);
    replacement
}

fn insert_list(surface: &mut Surface, range: SurfaceRange, kind: ListKind) -> Option<SurfaceRange> {
    let tag = kind.tag();

    if let Some(list) = surface.closest(range.start.node, Element::is_list) {
        if !surface.element_is(list, |e| e.tag == tag) {
            retag(surface, list, tag);
        }
        return Some(range);
    }

    let Some(start_unit) = list_unit(surface, range.start) else {
        return materialize_empty_list(surface, range.start, tag);
    };
    let end_unit = list_unit(surface, range.end)
        .filter(|&u| surface.parent(u) == surface.parent(start_unit))
        .unwrap_or(start_unit);

    let parent = surface.parent(start_unit)?;
    let siblings = surface.children(parent).to_vec();
    let a = siblings.iter().position(|&n| n == start_unit)?;
    let b = siblings.iter().position(|&n| n == end_unit)?;
    let units = &siblings[a.min(b)..=a.max(b)];

    // non-editable units (media anchors) stay where they are and split the
    // new list in two; their caret slots stay with them
    let mut list: Option<NodeId> = None;
    let mut first_item = None;
    for &unit in units {
        if surface.text(unit).is_some_and(is_blank_text) {
            let after_object = surface
                .previous_sibling(unit)
                .is_some_and(|prev| surface.element_is(prev, Element::is_non_editable));
            if !after_object {
                surface.detach(unit);
            }
            continue;
        }
        if surface.element_is(unit, Element::is_non_editable) {
            list = None;
            continue;
        }
        let current = match list {
            Some(current) => current,
            None => {
                let created = surface.create_element(Element::new(tag));
                surface.insert_before(unit, created);
                list = Some(created);
                created
            }
        };
        let item = surface.create_element(Element::new("li"));
        surface.append_child(current, item);
        first_item.get_or_insert(item);

        let dissolve = surface.element_is(unit, |e| e.is_block() && e.tag != "li");
        if dissolve {
            let style = surface
                .element(unit)
                .and_then(|e| e.attr("style"))
                .map(str::to_string);
            if let Some(style) = style
                && let Some(li) = surface.element_mut(item)
            {
                li.set_attr("style", style);
            }
            surface.move_children(unit, item);
            surface.detach(unit);
        } else {
            surface.append_child(item, unit);
        }
    }

    if surface.is_valid_position(range.start) && surface.is_valid_position(range.end) {
        Some(range)
    } else {
        first_item.map(|item| SurfaceRange::collapsed(Position::new(item, 0)))
    }
}

/// Whitespace or zero-width caret filler only.
fn is_blank_text(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{200b}')
}

fn materialize_empty_list(surface: &mut Surface, at: Position, tag: &str) -> Option<SurfaceRange> {
    if surface.is_text(at.node) || inside_non_editable(surface, at.node) {
        return None;
    }
    let list = surface.create_element(Element::new(tag));
    let item = surface.create_element(Element::new("li"));
    let text = surface.create_text("");
    surface.append_child(list, item);
    surface.append_child(item, text);
    surface.insert_child(at.node, at.offset, list);
    Some(SurfaceRange::collapsed(Position::new(text, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CSS: FormatOptions = FormatOptions {
        style_with_css: true,
    };
    const TAGS: FormatOptions = FormatOptions {
        style_with_css: false,
    };

    fn text_node(surface: &Surface, needle: &str) -> NodeId {
        surface
            .descendants(surface.root())
            .into_iter()
            .find(|&n| surface.text(n) == Some(needle))
            .expect("text node present")
    }

    fn select(surface: &Surface, needle: &str, from: usize, to: usize) -> SurfaceRange {
        let t = text_node(surface, needle);
        SurfaceRange::new(Position::new(t, from), Position::new(t, to))
    }

    #[test]
    fn bold_with_css_wraps_selection_only() {
        let mut surface = Surface::from_markup("<p>Hello world</p>");
        let range = select(&surface, "Hello world", 6, 11);

        let result = execute(&mut surface, range, &FormatCommand::Bold, CSS).unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<p>Hello <span style="font-weight: bold">world</span></p>"#
        );
        assert_eq!(surface.text(result.start.node), Some("world"));
    }

    #[test]
    fn bold_without_css_uses_tags() {
        let mut surface = Surface::from_markup("<p>Hello world</p>");
        let range = select(&surface, "Hello world", 0, 5);

        execute(&mut surface, range, &FormatCommand::Bold, TAGS).unwrap();

        assert_eq!(surface.to_markup(), "<p><b>Hello</b> world</p>");
    }

    #[test]
    fn bold_toggles_off_for_fully_bold_selection() {
        let mut surface = Surface::from_markup("<p>Hello world</p>");
        let range = select(&surface, "Hello world", 0, 11);

        let bolded = execute(&mut surface, range, &FormatCommand::Bold, CSS).unwrap();
        execute(&mut surface, bolded, &FormatCommand::Bold, CSS).unwrap();

        assert_eq!(surface.to_markup(), "<p>Hello world</p>");
    }

    #[test]
    fn unbolding_part_of_tag_keeps_rest_bold() {
        let mut surface = Surface::from_markup("<p><b>Hello world</b></p>");
        let range = select(&surface, "Hello world", 0, 5);

        execute(&mut surface, range, &FormatCommand::Bold, TAGS).unwrap();

        assert_eq!(surface.to_markup(), "<p>Hello<b> world</b></p>");
    }

    #[test]
    fn bold_on_block_styled_text_overrides_locally() {
        let mut surface = Surface::from_markup(r#"<p style="font-weight: bold">abc</p>"#);
        let range = select(&surface, "abc", 0, 3);

        execute(&mut surface, range, &FormatCommand::Bold, CSS).unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<p style="font-weight: bold"><span style="font-weight: normal">abc</span></p>"#
        );
    }

    #[test]
    fn italic_and_underline_stack_on_same_span() {
        let mut surface = Surface::from_markup("<p>abc</p>");
        let range = select(&surface, "abc", 0, 3);

        let r = execute(&mut surface, range, &FormatCommand::Italic, CSS).unwrap();
        execute(&mut surface, r, &FormatCommand::Underline, CSS).unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<p><span style="font-style: italic; text-decoration: underline">abc</span></p>"#
        );
    }

    #[test]
    fn collapsed_selection_is_noop_for_inline_styles() {
        let mut surface = Surface::from_markup("<p>abc</p>");
        let range = select(&surface, "abc", 1, 1);

        assert!(execute(&mut surface, range, &FormatCommand::Bold, CSS).is_none());
        assert_eq!(surface.to_markup(), "<p>abc</p>");
    }

    #[test]
    fn colors_and_fonts_wrap_runs_across_blocks() {
        let mut surface = Surface::from_markup("<p>one</p><p>two</p>");
        let one = text_node(&surface, "one");
        let two = text_node(&surface, "two");
        let range = SurfaceRange::new(Position::new(one, 1), Position::new(two, 2));

        let r = execute(
            &mut surface,
            range,
            &FormatCommand::ForeColor("#ff0000".into()),
            CSS,
        )
        .unwrap();
        execute(&mut surface, r, &FormatCommand::FontName("Georgia".into()), CSS).unwrap();

        assert_eq!(
            surface.to_markup(),
            concat!(
                r#"<p>o<span style="color: #ff0000; font-family: Georgia">ne</span></p>"#,
                r#"<p><span style="color: #ff0000; font-family: Georgia">tw</span>o</p>"#
            )
        );
    }

    #[test]
    fn blank_color_is_noop() {
        let mut surface = Surface::from_markup("<p>abc</p>");
        let range = select(&surface, "abc", 0, 3);

        assert!(execute(&mut surface, range, &FormatCommand::HiliteColor("  ".into()), CSS).is_none());
    }

    #[test]
    fn justify_sets_alignment_on_block() {
        let mut surface = Surface::from_markup("<p>abc</p><p>def</p>");
        let range = select(&surface, "def", 1, 1);

        execute(
            &mut surface,
            range,
            &FormatCommand::Justify(Alignment::Center),
            CSS,
        )
        .unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<p>abc</p><p style="text-align: center">def</p>"#
        );
    }

    #[test]
    fn justify_wraps_loose_inline_content() {
        let mut surface = Surface::from_markup("abc<b>d</b><p>x</p>");
        let range = select(&surface, "abc", 0, 0);

        execute(
            &mut surface,
            range,
            &FormatCommand::Justify(Alignment::Right),
            CSS,
        )
        .unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<div style="text-align: right">abc<b>d</b></div><p>x</p>"#
        );
    }

    #[test]
    fn create_link_wraps_selection() {
        let mut surface = Surface::from_markup("<p>see docs here</p>");
        let range = select(&surface, "see docs here", 4, 8);

        execute(
            &mut surface,
            range,
            &FormatCommand::CreateLink(" https://docs.rs ".into()),
            CSS,
        )
        .unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<p>see <a href="https://docs.rs">docs</a> here</p>"#
        );
    }

    #[test]
    fn create_link_at_caret_inserts_url_text() {
        let mut surface = Surface::from_markup("<p>ab</p>");
        let range = select(&surface, "ab", 1, 1);

        let r = execute(
            &mut surface,
            range,
            &FormatCommand::CreateLink("x.io".into()),
            CSS,
        )
        .unwrap();

        assert_eq!(surface.to_markup(), r#"<p>a<a href="x.io">x.io</a>b</p>"#);
        assert_eq!(surface.text(r.start.node), Some("x.io"));
    }

    #[test]
    fn empty_link_is_noop() {
        let mut surface = Surface::from_markup("<p>ab</p>");
        let range = select(&surface, "ab", 0, 2);

        assert!(execute(&mut surface, range, &FormatCommand::CreateLink("   ".into()), CSS).is_none());
        assert_eq!(surface.to_markup(), "<p>ab</p>");
    }

    #[test]
    fn insert_text_at_caret() {
        let mut surface = Surface::from_markup("<p>ac</p>");
        let range = select(&surface, "ac", 1, 1);

        let r = execute(&mut surface, range, &FormatCommand::InsertText("b".into()), CSS).unwrap();

        assert_eq!(surface.to_markup(), "<p>abc</p>");
        assert_eq!(r.start.offset, 2);
        assert!(r.is_collapsed());
    }

    #[test]
    fn insert_text_replaces_selection_across_nodes() {
        let mut surface = Surface::from_markup("<p>one <b>two</b> three</p>");
        let one = text_node(&surface, "one ");
        let three = text_node(&surface, " three");
        let range = SurfaceRange::new(Position::new(one, 2), Position::new(three, 3));

        execute(&mut surface, range, &FormatCommand::InsertText("X".into()), CSS).unwrap();

        assert_eq!(surface.to_markup(), "<p>onXree</p>");
    }

    #[test]
    fn insert_text_into_empty_surface() {
        let mut surface = Surface::new();
        let range = SurfaceRange::collapsed(Position::new(surface.root(), 0));

        execute(&mut surface, range, &FormatCommand::InsertText("hi".into()), CSS).unwrap();

        assert_eq!(surface.to_markup(), "hi");
    }

    #[test]
    fn remove_format_scoped_to_selection() {
        let mut surface = Surface::from_markup(
            r#"<p><span style="color: red"><b>abcdef</b></span></p>"#,
        );
        let range = select(&surface, "abcdef", 2, 4);

        execute(&mut surface, range, &FormatCommand::RemoveFormat, CSS).unwrap();

        assert_eq!(
            surface.to_markup(),
            concat!(
                r#"<p><span style="color: red"><b>ab</b></span>cd"#,
                r#"<span style="color: red"><b>ef</b></span></p>"#
            )
        );
    }

    #[test]
    fn remove_format_keeps_links() {
        let mut surface = Surface::from_markup(r#"<p><b><a href="u">link</a></b></p>"#);
        let range = select(&surface, "link", 0, 4);

        execute(&mut surface, range, &FormatCommand::RemoveFormat, CSS).unwrap();

        assert_eq!(surface.to_markup(), r#"<p><a href="u">link</a></p>"#);
    }

    #[test]
    fn insert_list_converts_paragraph_run() {
        let mut surface = Surface::from_markup("<p>A</p><p>B</p><p>C</p>");
        let a = text_node(&surface, "A");
        let b = text_node(&surface, "B");
        let range = SurfaceRange::new(Position::new(a, 0), Position::new(b, 1));

        let r = execute(
            &mut surface,
            range,
            &FormatCommand::InsertList(ListKind::Unordered),
            CSS,
        )
        .unwrap();

        assert_eq!(surface.to_markup(), "<ul><li>A</li><li>B</li></ul><p>C</p>");
        assert_eq!(r, range);
    }

    #[test]
    fn insert_list_splits_around_media_anchor() {
        let anchor = r#"<div class="media-anchor" data-anchor-id="x" contenteditable="false"><img src="a.png"></div>"#;
        let mut surface = Surface::from_markup(&format!("<p>A</p>{anchor}\u{200b}<p>B</p>"));
        let a = text_node(&surface, "A");
        let b = text_node(&surface, "B");
        let range = SurfaceRange::new(Position::new(a, 0), Position::new(b, 1));

        execute(
            &mut surface,
            range,
            &FormatCommand::InsertList(ListKind::Unordered),
            CSS,
        )
        .unwrap();

        assert_eq!(
            surface.to_markup(),
            format!("<ul><li>A</li></ul>{anchor}\u{200b}<ul><li>B</li></ul>")
        );
    }

    #[test]
    fn insert_list_retags_existing_list() {
        let mut surface = Surface::from_markup("<ul><li>A</li></ul>");
        let range = select(&surface, "A", 0, 0);

        execute(
            &mut surface,
            range,
            &FormatCommand::InsertList(ListKind::Ordered),
            CSS,
        )
        .unwrap();

        assert_eq!(surface.to_markup(), "<ol><li>A</li></ol>");
    }

    #[test]
    fn insert_list_in_empty_surface() {
        let mut surface = Surface::new();
        let range = SurfaceRange::collapsed(Position::new(surface.root(), 0));

        let r = execute(
            &mut surface,
            range,
            &FormatCommand::InsertList(ListKind::Unordered),
            CSS,
        )
        .unwrap();

        assert_eq!(surface.to_markup(), "<ul><li></li></ul>");
        assert!(surface.is_text(r.start.node));
    }

    #[test]
    fn stale_range_is_rejected() {
        let mut surface = Surface::from_markup("<p>abc</p>");
        let range = select(&surface, "abc", 0, 3);
        surface.replace_content("<p>abc</p><p>more</p>");
        // same ids now point at different nodes; the old offsets overflow
        let bogus = SurfaceRange::collapsed(Position::new(range.start.node, 99));

        assert!(execute(&mut surface, bogus, &FormatCommand::Bold, CSS).is_none());
    }
}
