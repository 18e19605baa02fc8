use std::sync::OnceLock;

use regex::Regex;

/// Elements whose neighbouring whitespace is rendered, so one space survives next to them.
const INLINE_ELEMENTS: &[&str] = &[
  "a", "abbr", "b", "bdi", "bdo", "button", "cite", "code", "data", "dfn", "em", "i", "img",
  "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span", "strong",
  "sub", "sup", "time", "u", "var",
];

fn whitespace_run() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"))
}

/// Elements whose bodies are emitted untouched.
fn raw_element() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(concat!(
      r"(?is)<script\b[^>]*>.*?</script\s*>",
      r"|<style\b[^>]*>.*?</style\s*>",
      r"|<pre\b[^>]*>.*?</pre\s*>",
      r"|<textarea\b[^>]*>.*?</textarea\s*>",
    ))
    .expect("invalid raw element regex")
  })
}

/// Collapse whitespace in rendered HTML.
///
/// Runs become a single space. That space is dropped next to block-level tags and kept
/// between inline content, so `<a>A</a> <a>B</a>` keeps its gap. Bodies of `script`,
/// `style`, `pre` and `textarea` are copied verbatim.
pub fn collapse_whitespace(html: &str) -> String {
  let mut output = String::with_capacity(html.len());
  let mut cursor = 0;
  for raw in raw_element().find_iter(html) {
    output.push_str(&collapse_flow(&html[cursor..raw.start()]));
    output.push_str(raw.as_str());
    cursor = raw.end();
  }
  output.push_str(&collapse_flow(&html[cursor..]));
  output.trim().to_string()
}

/// Collapse one stretch of flowing markup. Spaces at either end touch the document edge or
/// a raw element and are dropped.
fn collapse_flow(segment: &str) -> String {
  let collapsed = whitespace_run().replace_all(segment, " ");
  let mut output = String::with_capacity(collapsed.len());

  for (index, ch) in collapsed.char_indices() {
    if ch != ' ' {
      output.push(ch);
      continue;
    }

    let before = &collapsed[..index];
    let after = &collapsed[index + 1..];
    if before.is_empty() || after.is_empty() || touches_block_tag(before, after) {
      continue;
    }
    output.push(' ');
  }

  output
}

fn touches_block_tag(before: &str, after: &str) -> bool {
  let closing = before
    .strip_suffix('>')
    .and_then(|head| head.rfind('<').map(|start| &head[start..]))
    .filter(|tag| !tag.contains('>'));
  if closing.is_some_and(|tag| !is_inline(&tag_name(tag))) {
    return true;
  }

  let opening = after
    .strip_prefix('<')
    .filter(|rest| rest.starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '/' || ch == '!'));
  opening.is_some_and(|rest| !is_inline(&tag_name(rest)))
}

/// Lower-cased element name of a tag, with or without its `<`; empty for comments and
/// doctypes.
fn tag_name(tag: &str) -> String {
  tag
    .trim_start_matches('<')
    .trim_start_matches('/')
    .chars()
    .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
    .collect::<String>()
    .to_ascii_lowercase()
}

fn is_inline(name: &str) -> bool {
  INLINE_ELEMENTS.contains(&name)
}
