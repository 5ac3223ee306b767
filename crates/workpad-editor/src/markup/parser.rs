use crate::surface::{Element, NodeId, Surface};

use super::cursor::Cursor;

/// A tag-level token.
#[derive(Debug, PartialEq)]
enum Token {
    Start { element: Element, self_closing: bool },
    End(String),
    /// Comments, doctypes and processing instructions; dropped.
    Skip,
}

/// Parses markup into the surface, appending under the root.
///
/// Lenient by construction:
/// - void elements never take children
/// - unclosed elements are closed at end of input
/// - end tags with no matching open element are ignored
/// - a `<` that does not start a well-formed tag is literal text
pub fn parse_into(surface: &mut Surface, markup: &str) {
    let root = surface.root();
    let mut stack: Vec<NodeId> = vec![root];
    let mut cur = Cursor::new(markup);
    let mut text_start = cur.pos();

    while !cur.eof() {
        if cur.peek() != Some(b'<') {
            cur.bump();
            continue;
        }

        let tag_start = cur.pos();
        let saved = cur.clone();
        let Some(token) = try_parse_tag(&mut cur) else {
            cur = saved;
            cur.bump();
            continue;
        };

        flush_text(surface, &stack, &markup[text_start..tag_start]);
        text_start = cur.pos();

        match token {
            Token::Start {
                element,
                self_closing,
            } => {
                let opens = !element.is_void() && !self_closing;
                let id = surface.create_element(element);
                let parent = *stack.last().unwrap_or(&root);
                surface.append_child(parent, id);
                if opens {
                    stack.push(id);
                }
            }
            Token::End(name) => {
                let matching = stack
                    .iter()
                    .rposition(|&n| surface.element(n).is_some_and(|e| e.tag == name));
                if let Some(idx) = matching {
                    stack.truncate(idx);
                }
            }
            Token::Skip => {}
        }
    }

    flush_text(surface, &stack, &markup[text_start..]);
}

fn flush_text(surface: &mut Surface, stack: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let text = html_escape::decode_html_entities(raw).into_owned();
    let id = surface.create_text(text);
    let parent = *stack.last().unwrap_or(&surface.root());
    surface.append_child(parent, id);
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

/// Attempts to read one tag at the cursor. On `None` the caller rewinds.
fn try_parse_tag(cur: &mut Cursor<'_>) -> Option<Token> {
    if cur.starts_with(b"<!--") {
        cur.bump_n(4);
        let (_, closed) = cur.eat_until(b"-->");
        if closed {
            cur.bump_n(3);
        }
        return Some(Token::Skip);
    }

    if cur.starts_with(b"<!") || cur.starts_with(b"<?") {
        let (_, closed) = cur.eat_until(b">");
        if !closed {
            return None;
        }
        cur.bump();
        return Some(Token::Skip);
    }

    if cur.starts_with(b"</") {
        cur.bump_n(2);
        let name = cur.eat_while(is_name_byte);
        if name.is_empty() {
            return None;
        }
        let (_, closed) = cur.eat_until(b">");
        if !closed {
            return None;
        }
        cur.bump();
        return Some(Token::End(name.to_ascii_lowercase()));
    }

    cur.bump(); // <
    if !cur.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let mut element = Element::new(cur.eat_while(is_name_byte));

    loop {
        cur.skip_whitespace();
        match cur.peek()? {
            b'>' => {
                cur.bump();
                return Some(Token::Start {
                    element,
                    self_closing: false,
                });
            }
            b'/' if cur.peek_at(1) == Some(b'>') => {
                cur.bump_n(2);
                return Some(Token::Start {
                    element,
                    self_closing: true,
                });
            }
            _ => {}
        }

        let name = cur.eat_while(|b| !b.is_ascii_whitespace() && !b"=>/".contains(&b));
        if name.is_empty() {
            cur.bump(); // stray `/` or `=`
            continue;
        }
        let name = name.to_ascii_lowercase();

        cur.skip_whitespace();
        if cur.peek() != Some(b'=') {
            element.set_attr(&name, "");
            continue;
        }
        cur.bump();
        cur.skip_whitespace();

        let raw = match cur.peek()? {
            q @ (b'"' | b'\'') => {
                cur.bump();
                let (value, closed) = cur.eat_until(&[q]);
                if !closed {
                    return None;
                }
                cur.bump();
                value
            }
            _ => cur.eat_while(|b| !b.is_ascii_whitespace() && b != b'>'),
        };
        element.set_attr(&name, html_escape::decode_html_entities(raw));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn roundtrip(markup: &str) -> String {
        Surface::from_markup(markup).to_markup()
    }

    #[rstest]
    #[case("<p>Hello</p>")]
    #[case("<p>a<br>b</p>")]
    #[case(r#"<ul style="list-style-type: square"><li>A</li><li>B</li></ul>"#)]
    #[case(r#"<p><a href="https://example.com">link</a></p>"#)]
    #[case("plain text")]
    #[case("")]
    fn canonical_markup_roundtrips(#[case] markup: &str) {
        assert_eq!(roundtrip(markup), markup);
    }

    #[test]
    fn unclosed_elements_close_at_end() {
        assert_eq!(roundtrip("<p><b>bold"), "<p><b>bold</b></p>");
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        assert_eq!(roundtrip("<p>a</i>b</p>"), "<p>ab</p>");
    }

    #[test]
    fn end_tag_closes_intervening_elements() {
        assert_eq!(roundtrip("<div><b>x</div>y"), "<div><b>x</b></div>y");
    }

    #[test]
    fn self_closing_and_void_tags() {
        assert_eq!(
            roundtrip(r#"<p><img src="a.png"/>x<br/></p>"#),
            r#"<p><img src="a.png">x<br></p>"#
        );
    }

    #[test]
    fn comments_and_doctype_are_dropped() {
        assert_eq!(roundtrip("<!DOCTYPE html><!-- note --><p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        assert_eq!(roundtrip("a < b"), "a &lt; b");
    }

    #[test]
    fn entities_are_decoded_into_text_nodes() {
        let surface = Surface::from_markup("<p>a&amp;b&nbsp;c</p>");
        let p = surface.children(surface.root())[0];
        let text = surface.children(p)[0];

        assert_eq!(surface.text(text), Some("a&b\u{a0}c"));
    }

    #[test]
    fn attributes_quoted_unquoted_and_bare() {
        let surface =
            Surface::from_markup(r#"<div data-a='single' data-b=plain hidden CLASS="x">"#);
        let div = surface.children(surface.root())[0];
        let el = surface.element(div).unwrap();

        assert_eq!(el.attr("data-a"), Some("single"));
        assert_eq!(el.attr("data-b"), Some("plain"));
        assert_eq!(el.attr("hidden"), Some(""));
        assert_eq!(el.attr("class"), Some("x"));
    }

    #[test]
    fn tag_names_are_lowercased() {
        assert_eq!(roundtrip("<P>x</P>"), "<p>x</p>");
    }
}
