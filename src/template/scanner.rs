const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// What a well-formed placeholder points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<'src> {
    Env(&'src str),
    History(Vec<&'src str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token<'src> {
    Text(&'src str),
    Placeholder {
        raw: &'src str,
        reference: Reference<'src>,
    },
}

/// Splits input into literal text and recognised placeholders.
///
/// A `{{` whose contents are not a recognised path is emitted as text and
/// scanning resumes right after it, so `{{ {{env.A}} }}` still finds the
/// inner placeholder.
pub(super) struct Scanner<'src> {
    rest: &'src str,
}

impl<'src> Scanner<'src> {
    pub(super) const fn new(input: &'src str) -> Self {
        Self { rest: input }
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(start) = self.rest.find(OPEN) else {
            let text = self.rest;
            self.rest = "";
            return Some(Token::Text(text));
        };
        if start > 0 {
            let (text, rest) = self.rest.split_at(start);
            self.rest = rest;
            return Some(Token::Text(text));
        }

        let after_open = self.rest.strip_prefix(OPEN).unwrap_or_default();
        let Some(end) = after_open.find(CLOSE) else {
            let text = self.rest;
            self.rest = "";
            return Some(Token::Text(text));
        };
        let (inner, after_inner) = after_open.split_at(end);
        match parse_reference(inner.trim()) {
            Some(reference) => {
                let remaining = after_inner.strip_prefix(CLOSE).unwrap_or_default();
                let raw_len = self.rest.len().saturating_sub(remaining.len());
                let (raw, rest) = self.rest.split_at(raw_len);
                self.rest = rest;
                Some(Token::Placeholder { raw, reference })
            }
            None => {
                let (open, rest) = self.rest.split_at(OPEN.len());
                self.rest = rest;
                Some(Token::Text(open))
            }
        }
    }
}

/// All recognised placeholder references in `input`, in order of appearance.
pub(crate) fn references(input: &str) -> impl Iterator<Item = Reference<'_>> {
    Scanner::new(input).filter_map(|token| match token {
        Token::Placeholder { reference, .. } => Some(reference),
        Token::Text(_) => None,
    })
}

fn parse_reference(path: &str) -> Option<Reference<'_>> {
    let mut segments = path.split('.');
    let namespace = segments.next()?;
    let rest: Vec<&str> = segments.collect();
    if rest.is_empty() || !rest.iter().all(|segment| is_valid_segment(segment)) {
        return None;
    }
    match namespace {
        "env" => {
            let key = path.strip_prefix("env.")?;
            Some(Reference::Env(key))
        }
        "history" => Some(Reference::History(rest)),
        _ => None,
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
