use crate::editing::format::{self, Alignment, FormatCommand, FormatOptions};
use crate::editing::patch::Patch;
use crate::editing::selection::SelectionMemory;
use crate::surface::{Surface, SurfaceRange};

/// A toolbar command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    Justify(Alignment),
    ForeColor(String),
    HiliteColor(String),
    FontName(String),
    FontSize(String),
    InsertLink(String),
    InsertText(String),
    /// Text picked from the emoji popover
    InsertEmoji(String),
    /// Formatted date picked from the date popover
    InsertDate(String),
    /// Clear inline formatting inside the selection only
    RemoveFormat,
}

impl Command {
    /// Map to the formatting primitive. `None` for commands that are no-ops
    /// before they touch the surface.
    fn to_format(&self) -> Option<FormatCommand> {
        Some(match self {
            Command::Bold => FormatCommand::Bold,
            Command::Italic => FormatCommand::Italic,
            Command::Underline => FormatCommand::Underline,
            Command::Justify(alignment) => FormatCommand::Justify(*alignment),
            Command::ForeColor(color) => FormatCommand::ForeColor(color.clone()),
            Command::HiliteColor(color) => FormatCommand::HiliteColor(color.clone()),
            Command::FontName(family) => FormatCommand::FontName(family.clone()),
            Command::FontSize(size) => FormatCommand::FontSize(size.clone()),
            Command::InsertLink(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return None;
                }
                FormatCommand::CreateLink(url.to_string())
            }
            Command::InsertText(text) | Command::InsertEmoji(text) | Command::InsertDate(text) => {
                if text.is_empty() {
                    return None;
                }
                FormatCommand::InsertText(text.clone())
            }
            Command::RemoveFormat => FormatCommand::RemoveFormat,
        })
    }
}

/// Runs toolbar commands against the remembered selection.
#[derive(Debug)]
pub struct CommandDispatcher {
    options: FormatOptions,
    version: u64,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CommandDispatcher {
    pub fn new(style_with_css: bool) -> Self {
        Self {
            options: FormatOptions { style_with_css },
            version: 0,
        }
    }

    pub fn options(&self) -> FormatOptions {
        self.options
    }

    /// Restore the last selection and run `command` on it.
    ///
    /// The resulting range is captured back so a following command acts on
    /// the same content. `None` means nothing changed.
    pub fn dispatch(
        &mut self,
        surface: &mut Surface,
        selection: &mut SelectionMemory,
        command: &Command,
    ) -> Option<Patch> {
        let Some(format) = command.to_format() else {
            log::debug!("ignoring empty {command:?}");
            return None;
        };
        let Some(range) = selection.restore(surface) else {
            log::debug!("no selection to apply {command:?} to");
            return None;
        };

        let new_selection = format::execute(surface, range, &format, self.options)?;
        selection.capture(surface, new_selection);
        Some(self.record(new_selection))
    }

    /// Stamp a change made on the dispatcher's behalf, such as a list
    /// restyle.
    pub(crate) fn record(&mut self, new_selection: SurfaceRange) -> Patch {
        self.version += 1;
        Patch {
            new_selection,
            version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{NodeId, Position};
    use pretty_assertions::assert_eq;

    fn text_node(surface: &Surface, needle: &str) -> NodeId {
        surface
            .descendants(surface.root())
            .into_iter()
            .find(|&n| surface.text(n) == Some(needle))
            .expect("text node present")
    }

    fn setup(markup: &str, needle: &str, from: usize, to: usize) -> (Surface, SelectionMemory) {
        let surface = Surface::from_markup(markup);
        let text = text_node(&surface, needle);
        let mut selection = SelectionMemory::new();
        selection.capture(
            &surface,
            SurfaceRange::new(Position::new(text, from), Position::new(text, to)),
        );
        (surface, selection)
    }

    #[test]
    fn chained_commands_hit_the_same_content() {
        let (mut surface, mut selection) = setup("<p>Hello world</p>", "Hello world", 0, 5);
        let mut dispatcher = CommandDispatcher::default();

        let first = dispatcher
            .dispatch(&mut surface, &mut selection, &Command::Bold)
            .unwrap();
        let second = dispatcher
            .dispatch(&mut surface, &mut selection, &Command::Italic)
            .unwrap();

        assert_eq!(
            surface.to_markup(),
            r#"<p><span style="font-weight: bold; font-style: italic">Hello</span> world</p>"#
        );
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(selection.restore(&surface), Some(second.new_selection));
    }

    #[test]
    fn without_selection_nothing_happens() {
        let mut surface = Surface::from_markup("<p>Hello</p>");
        let mut selection = SelectionMemory::new();
        let mut dispatcher = CommandDispatcher::default();

        assert!(
            dispatcher
                .dispatch(&mut surface, &mut selection, &Command::Underline)
                .is_none()
        );
        assert_eq!(surface.to_markup(), "<p>Hello</p>");
    }

    #[test]
    fn blank_link_is_ignored() {
        let (mut surface, mut selection) = setup("<p>Hello</p>", "Hello", 0, 5);
        let mut dispatcher = CommandDispatcher::default();

        let patch = dispatcher.dispatch(
            &mut surface,
            &mut selection,
            &Command::InsertLink("   ".into()),
        );

        assert!(patch.is_none());
        assert_eq!(surface.to_markup(), "<p>Hello</p>");
    }

    #[test]
    fn emoji_lands_at_caret_and_caret_follows() {
        let (mut surface, mut selection) = setup("<p>ab</p>", "ab", 1, 1);
        let mut dispatcher = CommandDispatcher::default();

        dispatcher
            .dispatch(
                &mut surface,
                &mut selection,
                &Command::InsertEmoji("\u{1f600}".into()),
            )
            .unwrap();
        dispatcher
            .dispatch(
                &mut surface,
                &mut selection,
                &Command::InsertDate("2026-10-16".into()),
            )
            .unwrap();

        assert_eq!(surface.to_markup(), "<p>a\u{1f600}2026-10-16b</p>");
    }

    #[test]
    fn remove_format_only_touches_selection() {
        let (mut surface, mut selection) = setup("<p><b>abcd</b></p>", "abcd", 0, 2);
        let mut dispatcher = CommandDispatcher::default();

        dispatcher
            .dispatch(&mut surface, &mut selection, &Command::RemoveFormat)
            .unwrap();

        assert_eq!(surface.to_markup(), "<p>ab<b>cd</b></p>");
    }

    #[test]
    fn structural_tags_when_css_styling_is_off() {
        let (mut surface, mut selection) = setup("<p>abc</p>", "abc", 0, 3);
        let mut dispatcher = CommandDispatcher::new(false);

        dispatcher
            .dispatch(&mut surface, &mut selection, &Command::Underline)
            .unwrap();

        assert_eq!(surface.to_markup(), "<p><u>abc</u></p>");
    }
}
