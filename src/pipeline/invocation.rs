use crate::resolver::MediaAccessor;

/// Chat command that triggers the pipeline.
pub const STICKER_COMMAND: &str = "!sticker";

/// Text after the `!sticker` command word, if `body` is a sticker command.
///
/// The command word is matched case-insensitively and must be followed by
/// whitespace or the end of the message.
pub fn command_tail(body: &str) -> Option<&str> {
    let body = body.trim_start();
    let head = body.get(..STICKER_COMMAND.len())?;
    if !head.eq_ignore_ascii_case(STICKER_COMMAND) {
        return None;
    }

    let rest = &body[STICKER_COMMAND.len()..];
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// One `!sticker` request: the command tail plus access to message media.
pub struct Invocation {
    command_tail: String,
    attachment: Option<Box<dyn MediaAccessor>>,
    quoted: Option<Box<dyn MediaAccessor>>,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("command_tail", &self.command_tail)
            .field("has_attachment", &self.attachment.is_some())
            .field("has_quoted", &self.quoted.is_some())
            .finish()
    }
}

impl Invocation {
    pub fn new(command_tail: impl Into<String>) -> Self {
        Self {
            command_tail: command_tail.into(),
            attachment: None,
            quoted: None,
        }
    }

    /// Build an invocation from a raw message body, if it is a sticker command.
    pub fn from_message(body: &str) -> Option<Self> {
        command_tail(body).map(Self::new)
    }

    /// Media attached to the command message itself.
    pub fn with_attachment(mut self, accessor: impl MediaAccessor + 'static) -> Self {
        self.attachment = Some(Box::new(accessor));
        self
    }

    /// Media on the message the command replies to.
    pub fn with_quoted(mut self, accessor: impl MediaAccessor + 'static) -> Self {
        self.quoted = Some(Box::new(accessor));
        self
    }

    pub fn command_tail(&self) -> &str {
        &self.command_tail
    }

    pub fn attachment(&self) -> Option<&dyn MediaAccessor> {
        self.attachment.as_deref()
    }

    pub fn quoted(&self) -> Option<&dyn MediaAccessor> {
        self.quoted.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tail() {
        assert_eq!(command_tail("!sticker"), Some(""));
        assert_eq!(command_tail("!sticker Hello --size=40"), Some("Hello --size=40"));
        assert_eq!(command_tail("  !STICKER  hi  "), Some("hi"));
        assert_eq!(command_tail("!sticker\nhi"), Some("hi"));
    }

    #[test]
    fn test_command_tail_rejects_other_messages() {
        assert_eq!(command_tail("!stickers"), None);
        assert_eq!(command_tail("hello !sticker"), None);
        assert_eq!(command_tail("!stick"), None);
        assert_eq!(command_tail(""), None);
        assert_eq!(command_tail("ñññññ"), None);
    }

    #[test]
    fn test_command_with_link_and_caption() {
        let tail = command_tail("!sticker http://x/y.png Hello --color=red").unwrap();
        let parsed = crate::directive::parse(tail).unwrap();

        assert_eq!(parsed.url.as_deref(), Some("http://x/y.png"));
        assert_eq!(parsed.directive.text, "Hello");
        assert_eq!(parsed.directive.color, "red");
        assert_eq!(parsed.directive.anchor, crate::directive::Anchor::Bottom);
        assert_eq!(parsed.directive.font_size, None);
    }

    #[test]
    fn test_from_message() {
        let invocation = Invocation::from_message("!sticker Hi").unwrap();
        assert_eq!(invocation.command_tail(), "Hi");
        assert!(invocation.attachment().is_none());
        assert!(invocation.quoted().is_none());
        assert!(Invocation::from_message("hi").is_none());
    }
}
