/**
This module masks the entity mention of a text. The masked text is the key used to join the
ground-truth records with the submitted records: both sides are masked independently, and since
they use the same placeholder, two texts referring to the same example compare equal even when
their mentions are written differently.
*/
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

/// Canonical placeholder substituted to the entity mention.
pub const PLACEHOLDER: &str = "XXXX XXXX";

/// Placeholders that may already be present in a text, longest first. They are tried after the
/// entity itself.
pub const PLACEHOLDER_PATTERNS: [&str; 6] = [
    r"\bXXXX XXXX XXXX XXXX\b",
    r"\bXXXX XXXX XXXX\b",
    r"\bXXXX XXXX\b",
    r"\bXXXX\b",
    r"\bXX/XX/XXXX\b",
    r"\bXX/XX/\b",
];

/// Result of the search of an entity mention inside a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mention<'t> {
    /// Neither the entity nor a placeholder appears in the text.
    Absent,
    /// Exactly one mention, located at the given byte range.
    Single(Range<usize>),
    /// More than one mention. A text must carry exactly one.
    Ambiguous(Vec<&'t str>),
}

fn mention_regex(entity: &str) -> Result<Regex, regex::Error> {
    let entity_pattern = format!(r"\b{}\b", regex::escape(entity));
    let pattern = std::iter::once(entity_pattern.as_str())
        .chain(PLACEHOLDER_PATTERNS)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern)
}

/// Finds every mention of `entity` (or of an already present placeholder) in `text`. The
/// alternation is leftmost-first, with the entity taking priority over the placeholders.
pub fn locate_mention<'t>(text: &'t str, entity: &str) -> Result<Mention<'t>, regex::Error> {
    let regex = mention_regex(entity)?;
    let matches: Vec<_> = regex.find_iter(text).collect();
    let mention = match matches.as_slice() {
        [] => Mention::Absent,
        [single] => Mention::Single(single.range()),
        many => Mention::Ambiguous(many.iter().map(|m| m.as_str()).collect()),
    };
    Ok(mention)
}

/// Replaces the mention of `entity` in `text` by [`PLACEHOLDER`].
///
/// The text is returned untouched when the entity is absent or empty, when no mention is found
/// and when more than one mention is found. The last case is a malformed record: it is logged and
/// the run goes on.
///
/// ```rust
/// use typeval::{anonymize, PLACEHOLDER};
///
/// assert_eq!(anonymize("John saw Mary", Some("John")), "XXXX XXXX saw Mary");
/// assert_eq!(anonymize("John saw Mary", None), "John saw Mary");
/// assert_eq!(anonymize(&anonymize("John saw Mary", Some("John")), Some(PLACEHOLDER)),
///            "XXXX XXXX saw Mary");
/// ```
pub fn anonymize<'a>(text: &'a str, entity: Option<&str>) -> Cow<'a, str> {
    let entity = match entity {
        Some(e) if !e.is_empty() => e,
        _ => return Cow::Borrowed(text),
    };
    match locate_mention(text, entity) {
        Ok(Mention::Absent) => Cow::Borrowed(text),
        Ok(Mention::Single(span)) => {
            let mut masked = String::with_capacity(text.len() + PLACEHOLDER.len());
            masked.push_str(&text[..span.start]);
            masked.push_str(PLACEHOLDER);
            masked.push_str(&text[span.end..]);
            Cow::Owned(masked)
        }
        Ok(Mention::Ambiguous(mentions)) => {
            log::warn!(
                "Only one entity mention per sentence should be present. Text: {:?}, mentions: {:?}",
                text,
                mentions
            );
            Cow::Borrowed(text)
        }
        Err(e) => {
            log::warn!("Could not build the mention pattern of {:?}: {}", entity, e);
            Cow::Borrowed(text)
        }
    }
}
