//! # List Restructuring
//!
//! Restyles a contiguous run of list items without touching their siblings.
//! A list whose items are only partly selected is split into up to three
//! sibling lists in document order:
//!
//! ```text
//! <ul>A B C D</ul>   select B..C, decimal   <ul>A</ul><ol>B C</ol><ul>D</ul>
//! ```
//!
//! Items are moved, never copied, so concatenating the fragments always
//! reproduces the original item order and every item keeps exactly one
//! parent list.

use crate::editing::format::{self, FormatCommand, FormatOptions, clone_without_id};
use crate::surface::{Element, NodeId, Surface, SurfaceRange};

const MARKER_PROP: &str = "--list-marker";
const STYLE_ATTR: &str = "data-list-style";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ol" => Some(ListKind::Ordered),
            "ul" => Some(ListKind::Unordered),
            _ => None,
        }
    }
}

/// Visual style of a list: a bullet shape or a numbering scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStyle {
    Disc,
    Circle,
    Square,
    Dash,
    Star,
    /// Arbitrary marker text
    Custom(String),
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperAlpha,
    LowerAlpha,
}

impl ListStyle {
    pub fn kind(&self) -> ListKind {
        match self {
            ListStyle::Decimal
            | ListStyle::UpperRoman
            | ListStyle::LowerRoman
            | ListStyle::UpperAlpha
            | ListStyle::LowerAlpha => ListKind::Ordered,
            _ => ListKind::Unordered,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListStyle::Disc => "disc",
            ListStyle::Circle => "circle",
            ListStyle::Square => "square",
            ListStyle::Dash => "dash",
            ListStyle::Star => "star",
            ListStyle::Custom(_) => "custom",
            ListStyle::Decimal => "decimal",
            ListStyle::UpperRoman => "upper-roman",
            ListStyle::LowerRoman => "lower-roman",
            ListStyle::UpperAlpha => "upper-alpha",
            ListStyle::LowerAlpha => "lower-alpha",
        }
    }

    /// The value for `list-style-type`, if the native property can express
    /// this style.
    fn native_type(&self) -> Option<&'static str> {
        match self {
            ListStyle::Dash | ListStyle::Star | ListStyle::Custom(_) => None,
            other => Some(other.name()),
        }
    }

    /// Marker text for styles drawn through the marker property.
    fn marker(&self) -> Option<&str> {
        match self {
            ListStyle::Dash => Some("\u{2013}"),
            ListStyle::Star => Some("\u{2605}"),
            ListStyle::Custom(marker) => Some(marker),
            _ => None,
        }
    }

    fn from_name(name: &str, marker: Option<String>) -> Option<Self> {
        Some(match name {
            "disc" => ListStyle::Disc,
            "circle" => ListStyle::Circle,
            "square" => ListStyle::Square,
            "dash" => ListStyle::Dash,
            "star" => ListStyle::Star,
            "custom" => ListStyle::Custom(marker?),
            "decimal" => ListStyle::Decimal,
            "upper-roman" => ListStyle::UpperRoman,
            "lower-roman" => ListStyle::LowerRoman,
            "upper-alpha" => ListStyle::UpperAlpha,
            "lower-alpha" => ListStyle::LowerAlpha,
            _ => return None,
        })
    }
}

/// Make user marker text safe to embed in a `style` attribute value.
///
/// Quotes and backslashes are stripped and the result is capped at
/// `max_chars` characters. Blank input yields `None`.
pub fn sanitize_marker(raw: &str, max_chars: usize) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\\'))
        .take(max_chars)
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Read the style a list element currently carries.
pub fn list_style_of(surface: &Surface, list: NodeId) -> Option<ListStyle> {
    let el = surface.element(list).filter(|e| e.is_list())?;
    let style = el.style();

    if let Some(name) = el.attr(STYLE_ATTR) {
        let marker = style
            .get(MARKER_PROP)
            .map(|m| m.trim_matches(|c| c == '\'' || c == '"').to_string());
        if let Some(parsed) = ListStyle::from_name(name, marker) {
            return Some(parsed);
        }
    }
    if let Some(parsed) = style
        .get("list-style-type")
        .and_then(|t| ListStyle::from_name(t, None))
    {
        return Some(parsed);
    }
    Some(match ListKind::from_tag(&el.tag)? {
        ListKind::Ordered => ListStyle::Decimal,
        ListKind::Unordered => ListStyle::Disc,
    })
}

fn write_style(el: &mut Element, style: &ListStyle) {
    match (style.native_type(), style.marker()) {
        (Some(native), _) => {
            el.set_style_prop("list-style-type", native);
            el.remove_style_prop(MARKER_PROP);
        }
        (None, Some(marker)) => {
            el.set_style_prop("list-style-type", "none");
            el.set_style_prop(MARKER_PROP, &format!("'{marker}'"));
        }
        (None, None) => {}
    }
    el.set_attr(STYLE_ATTR, style.name());
}

fn is_item(surface: &Surface, node: NodeId) -> bool {
    surface.element_is(node, |e| e.tag == "li")
}

/// List items the range touches, restricted to lists at `depth`.
fn collect_items(surface: &Surface, range: &SurfaceRange, depth: usize) -> Vec<NodeId> {
    let at_depth = |item: NodeId| {
        surface.parent(item).is_some_and(|list| {
            surface.element_is(list, Element::is_list) && surface.list_depth(list) == depth
        })
    };

    let items: Vec<NodeId> = surface
        .descendants(surface.root())
        .into_iter()
        .filter(|&n| is_item(surface, n) && at_depth(n) && surface.intersects_node(range, n))
        .collect();
    if !items.is_empty() {
        return items;
    }

    surface
        .closest(range.start.node, |e| e.tag == "li")
        .filter(|&item| at_depth(item))
        .into_iter()
        .collect()
}

/// Group items by parent list, keeping document order of both.
fn group_by_list(surface: &Surface, items: &[NodeId]) -> Vec<(NodeId, Vec<NodeId>)> {
    let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
    for &item in items {
        let Some(list) = surface.parent(item) else {
            continue;
        };
        match groups.iter_mut().find(|(l, _)| *l == list) {
            Some((_, members)) => members.push(item),
            None => groups.push((list, vec![item])),
        }
    }
    groups
}

/// Split `list` around the contiguous span its `members` occupy and style
/// the middle fragment.
fn restyle_span(surface: &mut Surface, list: NodeId, members: &[NodeId], style: &ListStyle) {
    let Some(original) = surface.element(list).cloned() else {
        return;
    };
    let children = surface.children(list).to_vec();
    let indices: Vec<usize> = members
        .iter()
        .filter_map(|m| children.iter().position(|c| c == m))
        .collect();
    let (Some(&start), Some(&end)) = (indices.iter().min(), indices.iter().max()) else {
        return;
    };

    let before = &children[..start];
    let selected = &children[start..=end];
    let after = &children[end + 1..];
    let has_items = |nodes: &[NodeId]| nodes.iter().any(|&n| is_item(surface, n));
    let before_has_items = has_items(before);
    let after_has_items = has_items(after);

    let target_tag = style.kind().tag();
    let selected_list = if !before_has_items && original.tag == target_tag {
        list
    } else {
        let fragment = clone_without_id(surface, list);
        if let Some(el) = surface.element_mut(fragment) {
            el.tag = target_tag.to_string();
        }
        surface.insert_after(list, fragment);
        for &n in selected {
            surface.append_child(fragment, n);
        }
        fragment
    };

    if after_has_items {
        let mut tail = original.clone();
        tail.remove_attr("id");
        let tail = surface.create_element(tail);
        surface.insert_after(selected_list, tail);
        for &n in after {
            surface.append_child(tail, n);
        }
    }

    if selected_list != list && !before_has_items {
        surface.detach(list);
    }

    if let Some(el) = surface.element_mut(selected_list) {
        write_style(el, style);
    }
    log::debug!(
        "restyled items {start}..={end} of {} as {}",
        original.tag,
        style.name()
    );
}

/// Apply `style` to the list items covered by `range`.
///
/// Without a list around the range start, one is created first through the
/// formatting primitive. Returns the range to reselect, or `None` when
/// nothing changed.
pub fn apply_list_style(
    surface: &mut Surface,
    range: SurfaceRange,
    style: &ListStyle,
    options: FormatOptions,
    max_marker_chars: usize,
) -> Option<SurfaceRange> {
    let style = match style {
        ListStyle::Custom(raw) => ListStyle::Custom(sanitize_marker(raw, max_marker_chars)?),
        other => other.clone(),
    };
    if !surface.is_valid_position(range.start) || !surface.is_valid_position(range.end) {
        return None;
    }
    let mut range = surface.ordered(range);

    let anchor_list = match surface.closest(range.start.node, Element::is_list) {
        Some(list) => list,
        None => {
            range = format::execute(
                surface,
                range,
                &FormatCommand::InsertList(style.kind()),
                options,
            )?;
            surface.closest(range.start.node, Element::is_list)?
        }
    };
    let depth = surface.list_depth(anchor_list);

    let items = collect_items(surface, &range, depth);
    if items.is_empty() {
        return None;
    }

    for (list, members) in group_by_list(surface, &items) {
        restyle_span(surface, list, &members, &style);
    }
    Some(range)
}
