/// A run of explanation text, either plain or emphasised with `**bold**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupSpan {
    Plain(String),
    Bold(String),
}

impl MarkupSpan {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            MarkupSpan::Plain(text) | MarkupSpan::Bold(text) => text,
        }
    }
}

/// Split explanation text into plain and bold spans.
///
/// Only the `**...**` pair is recognised. An opening `**` without a closing
/// partner is kept verbatim in the surrounding plain text.
#[must_use]
pub fn parse_markup(input: &str) -> Vec<MarkupSpan> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = input;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        plain.push_str(&rest[..open]);
        let bold = &after_open[..close];
        if bold.is_empty() {
            plain.push_str("****");
        } else {
            if !plain.is_empty() {
                spans.push(MarkupSpan::Plain(std::mem::take(&mut plain)));
            }
            spans.push(MarkupSpan::Bold(bold.to_string()));
        }
        rest = &after_open[close + 2..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        spans.push(MarkupSpan::Plain(plain));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_bold_runs() {
        let spans = parse_markup("The **Eiffel Tower** is in **Paris**.");
        assert_eq!(
            spans,
            vec![
                MarkupSpan::Plain("The ".into()),
                MarkupSpan::Bold("Eiffel Tower".into()),
                MarkupSpan::Plain(" is in ".into()),
                MarkupSpan::Bold("Paris".into()),
                MarkupSpan::Plain(".".into()),
            ]
        );
    }

    #[test]
    fn unclosed_marker_stays_literal() {
        let spans = parse_markup("almost **bold");
        assert_eq!(spans, vec![MarkupSpan::Plain("almost **bold".into())]);
    }

    #[test]
    fn empty_input_has_no_spans() {
        assert!(parse_markup("").is_empty());
    }
}
