//! SGR decoding on top of `vte`, so colored command output keeps its colors.
//!
//! Only Select Graphic Rendition (`CSI ... m`) changes the style. Every other
//! control, CSI, OSC or DCS sequence is consumed by the parser and dropped,
//! which leaves e.g. the visible text of an OSC 8 hyperlink in place.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use vte::{Params, Parser, Perform};

/// Convert one output line with SGR sequences into styled spans.
pub fn styled_line(raw: &str, base: Style) -> Line<'static> {
    let mut parser = Parser::new();
    let mut builder = LineBuilder::new(base);
    parser.advance(&mut builder, raw.as_bytes());
    builder.finish()
}

struct LineBuilder {
    base: Style,
    style: Style,
    text: String,
    spans: Vec<Span<'static>>,
}

impl LineBuilder {
    fn new(base: Style) -> Self {
        Self {
            base,
            style: base,
            text: String::new(),
            spans: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.spans
                .push(Span::styled(std::mem::take(&mut self.text), self.style));
        }
    }

    fn finish(mut self) -> Line<'static> {
        self.flush();
        Line::from(self.spans)
    }
}

impl Perform for LineBuilder {
    fn print(&mut self, c: char) {
        self.text.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if byte == b'\t' {
            self.text.push('\t');
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        if action != 'm' || ignore || !intermediates.is_empty() {
            return;
        }
        self.flush();
        self.style = apply_sgr(self.style, self.base, params);
    }
}

fn apply_sgr(mut style: Style, base: Style, params: &Params) -> Style {
    let groups: Vec<&[u16]> = params.iter().collect();
    if groups.is_empty() {
        return base;
    }

    let mut index = 0;
    while index < groups.len() {
        let group = groups[index];
        index += 1;
        let code = group.first().copied().unwrap_or(0);
        style = match code {
            0 => base,
            1 => style.add_modifier(Modifier::BOLD),
            2 => style.add_modifier(Modifier::DIM),
            3 => style.add_modifier(Modifier::ITALIC),
            4 | 21 => style.add_modifier(Modifier::UNDERLINED),
            5 => style.add_modifier(Modifier::SLOW_BLINK),
            6 => style.add_modifier(Modifier::RAPID_BLINK),
            7 => style.add_modifier(Modifier::REVERSED),
            8 => style.add_modifier(Modifier::HIDDEN),
            9 => style.add_modifier(Modifier::CROSSED_OUT),
            22 => style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style.remove_modifier(Modifier::ITALIC),
            24 => style.remove_modifier(Modifier::UNDERLINED),
            25 => style.remove_modifier(Modifier::SLOW_BLINK | Modifier::RAPID_BLINK),
            27 => style.remove_modifier(Modifier::REVERSED),
            28 => style.remove_modifier(Modifier::HIDDEN),
            29 => style.remove_modifier(Modifier::CROSSED_OUT),
            n @ 30..=37 => style.fg(palette(n - 30, false)),
            n @ 40..=47 => style.bg(palette(n - 40, false)),
            n @ 90..=97 => style.fg(palette(n - 90, true)),
            n @ 100..=107 => style.bg(palette(n - 100, true)),
            39 => style.fg(base.fg.unwrap_or(Color::Reset)),
            49 => style.bg(base.bg.unwrap_or(Color::Reset)),
            38 | 48 => {
                let (color, consumed) = extended_color(group, &groups[index..]);
                index = (index + consumed).min(groups.len());
                match (color, code) {
                    (Some(color), 38) => style.fg(color),
                    (Some(color), _) => style.bg(color),
                    (None, _) => style,
                }
            }
            _ => style,
        };
    }
    style
}

/// Decode `38`/`48` arguments, either colon subparameters inside `group` or
/// the semicolon-separated groups that follow it. Returns the color and the
/// number of following groups it used.
fn extended_color(group: &[u16], following: &[&[u16]]) -> (Option<Color>, usize) {
    if group.len() > 1 {
        let color = match &group[1..] {
            [5, index, ..] => indexed(*index),
            [2, _, r, g, b, ..] | [2, r, g, b] => rgb(*r, *g, *b),
            _ => None,
        };
        return (color, 0);
    }

    let arg = |at: usize| following.get(at).and_then(|g| g.first().copied());
    match arg(0) {
        Some(5) => (arg(1).and_then(indexed), 2),
        Some(2) => match (arg(1), arg(2), arg(3)) {
            (Some(r), Some(g), Some(b)) => (rgb(r, g, b), 4),
            _ => (None, following.len()),
        },
        _ => (None, 0),
    }
}

fn indexed(index: u16) -> Option<Color> {
    u8::try_from(index).ok().map(Color::Indexed)
}

fn rgb(r: u16, g: u16, b: u16) -> Option<Color> {
    Some(Color::Rgb(
        u8::try_from(r).ok()?,
        u8::try_from(g).ok()?,
        u8::try_from(b).ok()?,
    ))
}

fn palette(index: u16, bright: bool) -> Color {
    match (index, bright) {
        (0, false) => Color::Black,
        (1, false) => Color::Red,
        (2, false) => Color::Green,
        (3, false) => Color::Yellow,
        (4, false) => Color::Blue,
        (5, false) => Color::Magenta,
        (6, false) => Color::Cyan,
        (7, false) => Color::Gray,
        (0, true) => Color::DarkGray,
        (1, true) => Color::LightRed,
        (2, true) => Color::LightGreen,
        (3, true) => Color::LightYellow,
        (4, true) => Color::LightBlue,
        (5, true) => Color::LightMagenta,
        (6, true) => Color::LightCyan,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_plain_text_is_one_span() {
        let line = styled_line("hello", Style::default());
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "hello");
    }

    #[test]
    fn test_green_echo_is_styled() {
        let line = styled_line("\x1b[0;32mls -la\x1b[0m", Style::default());
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "ls -la");
        assert_eq!(line.spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn test_non_sgr_sequences_are_dropped() {
        let line = styled_line("a\x1b[2Kb", Style::default());
        assert_eq!(text_of(&line), "ab");
    }

    #[test]
    fn test_256_color_foreground() {
        let line = styled_line("\x1b[38;5;4mx", Style::default());
        assert_eq!(line.spans[0].style.fg, Some(Color::Indexed(4)));
        assert!(!line.spans[0].style.add_modifier.contains(Modifier::UNDERLINED));

        let line = styled_line("\x1b[48:5:196mx", Style::default());
        assert_eq!(line.spans[0].style.bg, Some(Color::Indexed(196)));
    }

    #[test]
    fn test_truecolor_keeps_following_attributes() {
        let line = styled_line("\x1b[38;2;255;0;0mx", Style::default());
        assert_eq!(line.spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));

        let line = styled_line("\x1b[38;2;1;2;3;1mx", Style::default());
        assert_eq!(line.spans[0].style.fg, Some(Color::Rgb(1, 2, 3)));
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_hyperlink_shows_only_its_text() {
        let line = styled_line(
            "see \x1b]8;;http://x\x1b\\link\x1b]8;;\x1b\\ here",
            Style::default(),
        );
        assert_eq!(text_of(&line), "see link here");
    }

    #[test]
    fn test_bright_background_and_attribute_resets() {
        let line = styled_line("\x1b[101;4mon\x1b[24;49moff", Style::default());
        assert_eq!(line.spans[0].style.bg, Some(Color::LightRed));
        assert!(line.spans[0].style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(line.spans[1].style.bg, Some(Color::Reset));
        assert!(!line.spans[1].style.add_modifier.contains(Modifier::UNDERLINED));
    }
}
