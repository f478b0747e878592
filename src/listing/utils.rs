/// Escape text for use in HTML element content or a quoted attribute
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

/// Uppercase the first character of each word, leaving the rest untouched.
///
/// Words are separated by space, tab, CR, LF, form feed or vertical tab.
pub fn title_case(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut at_word_start = true;

  for c in s.chars() {
    if at_word_start {
      out.extend(c.to_uppercase());
    } else {
      out.push(c);
    }
    at_word_start = matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{0C}' | '\u{0B}');
  }

  out
}
