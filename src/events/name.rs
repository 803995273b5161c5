//! Parsing of raw `"entity action"` event strings.

/// Entity and action halves of a raw event string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventName<'a> {
    pub entity: &'a str,
    pub action: &'a str,
}

impl<'a> EventName<'a> {
    /// Splits `raw` at its first whitespace run.
    ///
    /// The entity is everything before that run, the action is the next
    /// whitespace-delimited token. Returns `None` if either half is empty.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (entity, rest) = raw.split_once(char::is_whitespace)?;
        let action = rest.split_whitespace().next()?;
        if entity.is_empty() {
            return None;
        }
        Some(Self { entity, action })
    }
}
