//! Styles for table and warning output. Styling is only applied when stdout is a
//! terminal and NO_COLOR isn't set.
use nu_ansi_term::{Color, Style};
use std::io::IsTerminal;
use std::sync::LazyLock;

static COLORED: LazyLock<bool> =
    LazyLock::new(|| std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none());

pub trait Styling {
    fn explain_title(self) -> String;
    fn explain_text(self) -> String;
    fn table_header(self) -> String;
    fn table_sep(self) -> String;
    fn table_field(self) -> String;
    fn warn(self) -> String;
}

impl<T: AsRef<str>> Styling for T {
    fn explain_title(self) -> String {
        paint(Style::new().bold(), self.as_ref())
    }

    fn explain_text(self) -> String {
        paint(Style::new().italic(), self.as_ref())
    }

    fn table_header(self) -> String {
        paint(Color::Blue.bold(), self.as_ref())
    }

    fn table_sep(self) -> String {
        paint(Color::DarkGray.normal(), self.as_ref())
    }

    fn table_field(self) -> String {
        self.as_ref().to_string()
    }

    fn warn(self) -> String {
        paint(Color::Red.bold(), self.as_ref())
    }
}

fn paint(style: Style, text: &str) -> String {
    if *COLORED {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

/// Messages for the user, as opposed to the tracing output which is for diagnosing
/// odd files.
pub fn warn(mesg: &str) {
    eprintln!("{}", mesg.warn());
}

/// Remove escape sequences from the string (e.g. for colors).
#[cfg(test)]
pub fn strip_escapes(s: &str) -> String {
    // Even with Style::empty() tabled can add reset sequences to the ends of lines.
    let mut result = String::with_capacity(s.len());
    let mut escaping = false;
    for c in s.chars() {
        if c == '\x1b' {
            escaping = true;
        } else if escaping {
            if c == 'm' {
                escaping = false;
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_codes() {
        let styled = Color::Red.bold().paint("oops").to_string();
        assert_ne!(styled, "oops");
        assert_eq!(strip_escapes(&styled), "oops");
        assert_eq!(strip_escapes(&"plain".table_field()), "plain");
    }
}
