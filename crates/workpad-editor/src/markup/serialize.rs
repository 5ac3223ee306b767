use crate::surface::{NodeId, NodeKind, Surface};

/// Serializes the surface content (children of the root) to markup.
pub fn serialize(surface: &Surface) -> String {
    let mut out = String::new();
    for &child in surface.children(surface.root()) {
        write_node(surface, child, &mut out);
    }
    out
}

/// Serializes a single node and its subtree.
pub fn serialize_node(surface: &Surface, id: NodeId) -> String {
    let mut out = String::new();
    write_node(surface, id, &mut out);
    out
}

fn write_node(surface: &Surface, id: NodeId, out: &mut String) {
    match surface.kind(id) {
        NodeKind::Root => {
            for &child in surface.children(id) {
                write_node(surface, child, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            for &child in surface.children(id) {
                write_node(surface, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}
