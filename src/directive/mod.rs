//! Command tail parsing.
//!
//! Turns the free text after `!sticker` into an optional resource URL and a
//! [`StyleDirective`]. Options come in two spellings, `--key=value` and
//! `--key(value)`; both are stripped from the text and whatever remains is
//! the overlay text.
//!
//! Validation is deliberately uneven: a malformed `size` is a user error,
//! while an unknown `pos` value is ignored and the anchor stays as it was.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Largest accepted `--size` value, in pixels.
pub const MAX_FONT_SIZE: u32 = 512;

/// Fill color used when no `color` option is given.
pub const DEFAULT_COLOR: &str = "white";

/// Vertical placement zone for overlay text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Center,
    #[default]
    Bottom,
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Anchor::Top),
            "center" => Ok(Anchor::Center),
            "bottom" => Ok(Anchor::Bottom),
            other => Err(format!("Unknown position: {}", other)),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Top => write!(f, "top"),
            Anchor::Center => write!(f, "center"),
            Anchor::Bottom => write!(f, "bottom"),
        }
    }
}

/// Styling options for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StyleDirective {
    /// Overlay text; empty means no overlay.
    pub text: String,
    /// Explicit font size in pixels. `None` derives it from the image height.
    pub font_size: Option<u32>,
    /// Fill color, named or hex. Interpreted by the renderer.
    pub color: String,
    pub anchor: Anchor,
}

impl Default for StyleDirective {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: None,
            color: DEFAULT_COLOR.to_string(),
            anchor: Anchor::default(),
        }
    }
}

impl StyleDirective {
    /// Whether an overlay was requested.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// A parsed command tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First URL found in the tail, if any.
    pub url: Option<String>,
    pub directive: StyleDirective,
}

/// Errors from parsing a command tail. All of them are user errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("invalid size {value:?}: not a whole number")]
    InvalidSize { value: String },

    #[error("size {value} is out of range 1..={max}")]
    SizeOutOfRange { value: String, max: u32 },
}

impl DirectiveError {
    /// Corrective message for the chat user.
    pub fn user_message(&self) -> String {
        match self {
            DirectiveError::InvalidSize { value } => format!(
                "Invalid size \"{}\". Use a whole number of pixels, e.g. `--size=40`.",
                value
            ),
            DirectiveError::SizeOutOfRange { value, max } => format!(
                "Size {} is out of range. Pick a size between 1 and {}.",
                value, max
            ),
        }
    }
}

/// One option token found in the tail.
#[derive(Debug)]
struct OptionToken<'a> {
    start: usize,
    end: usize,
    key: &'a str,
    value: &'a str,
}

/// Compiled patterns for command tail parsing.
pub struct DirectiveParser {
    url: Regex,
    equals_option: Regex,
    paren_option: Regex,
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveParser {
    pub fn new() -> Self {
        Self {
            url: Regex::new(r"(?i)\bhttps?://\S+").expect("valid url regex"),
            equals_option: Regex::new(r"--([A-Za-z]+)=(\S*)").expect("valid option regex"),
            paren_option: Regex::new(r"--([A-Za-z]+)\(([^)]*)\)").expect("valid option regex"),
        }
    }

    /// Parse a command tail into a URL and a directive.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError`] when `size` is not a clean positive
    /// base-10 integer within [`MAX_FONT_SIZE`].
    pub fn parse(&self, tail: &str) -> Result<ParsedCommand, DirectiveError> {
        let (url, rest) = match self.url.find(tail) {
            Some(m) => {
                let mut rest = String::with_capacity(tail.len());
                rest.push_str(&tail[..m.start()]);
                rest.push(' ');
                rest.push_str(&tail[m.end()..]);
                (Some(m.as_str().to_string()), rest)
            }
            None => (None, tail.to_string()),
        };

        let tokens = self.option_tokens(&rest);

        let mut directive = StyleDirective::default();
        for token in &tokens {
            apply_option(&mut directive, token.key, token.value)?;
        }

        let mut residual = String::with_capacity(rest.len());
        let mut cursor = 0;
        for token in &tokens {
            residual.push_str(&rest[cursor..token.start]);
            residual.push(' ');
            cursor = token.end;
        }
        residual.push_str(&rest[cursor..]);

        directive.text = residual.split_whitespace().collect::<Vec<_>>().join(" ");

        Ok(ParsedCommand { url, directive })
    }

    /// Both option spellings, in textual order, without overlaps.
    fn option_tokens<'a>(&self, text: &'a str) -> Vec<OptionToken<'a>> {
        let mut tokens: Vec<OptionToken<'a>> = self
            .equals_option
            .captures_iter(text)
            .chain(self.paren_option.captures_iter(text))
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(OptionToken {
                    start: whole.start(),
                    end: whole.end(),
                    key: caps.get(1)?.as_str(),
                    value: caps.get(2)?.as_str(),
                })
            })
            .collect();

        tokens.sort_by_key(|t| t.start);

        let mut kept: Vec<OptionToken<'a>> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if kept.last().is_some_and(|prev| token.start < prev.end) {
                continue;
            }
            kept.push(token);
        }
        kept
    }
}

fn apply_option(
    directive: &mut StyleDirective,
    key: &str,
    value: &str,
) -> Result<(), DirectiveError> {
    let value = value.trim();
    match key.to_lowercase().as_str() {
        "size" => directive.font_size = Some(parse_size(value)?),
        "color" => {
            if !value.is_empty() {
                directive.color = value.to_string();
            }
        }
        "pos" | "position" => match value.parse::<Anchor>() {
            Ok(anchor) => directive.anchor = anchor,
            Err(_) => tracing::debug!("Ignoring unrecognized position {:?}", value),
        },
        other => tracing::debug!("Ignoring unknown option --{}", other),
    }
    Ok(())
}

fn parse_size(value: &str) -> Result<u32, DirectiveError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DirectiveError::InvalidSize {
            value: value.to_string(),
        });
    }

    match value.parse::<u32>() {
        Ok(size) if (1..=MAX_FONT_SIZE).contains(&size) => Ok(size),
        _ => Err(DirectiveError::SizeOutOfRange {
            value: value.to_string(),
            max: MAX_FONT_SIZE,
        }),
    }
}

/// Parse a command tail with a shared [`DirectiveParser`].
pub fn parse(tail: &str) -> Result<ParsedCommand, DirectiveError> {
    static PARSER: OnceLock<DirectiveParser> = OnceLock::new();
    PARSER.get_or_init(DirectiveParser::new).parse(tail)
}
