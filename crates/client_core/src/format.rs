//! Conversion between the work-area notation and the service's plain notation.

pub trait ExpressionFormat: Send + Sync {
    /// Work-area markup to the plain form the service reads.
    fn to_plain(&self, markup: &str) -> String;

    /// Plain service term to work-area markup.
    fn to_markup(&self, plain: &str) -> String;

    /// Canonical form used for change detection.
    fn normalize(&self, text: &str) -> String {
        self.to_plain(text)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

/// Propositional logic: `∧ ∨ ¬ → ↔` in markup, `/\ \/ ~ -> <->` in plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicNotation;

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&and;", "/\\"),
    ("&or;", "\\/"),
    ("&not;", "~"),
    ("&harr;", "<->"),
    ("&rarr;", "->"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

const SYMBOLS: &[(char, &str)] = &[
    ('∧', "/\\"),
    ('∨', "\\/"),
    ('¬', "~"),
    ('↔', "<->"),
    ('→', "->"),
    ('\u{a0}', " "),
];

const PLAIN_OPERATORS: &[(&str, char)] = &[
    ("<->", '↔'),
    ("->", '→'),
    ("/\\", '∧'),
    ("\\/", '∨'),
    ("~", '¬'),
];

impl ExpressionFormat for LogicNotation {
    fn to_plain(&self, markup: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut rest = markup;
        while let Some(c) = rest.chars().next() {
            if c == '&' {
                if let Some((entity, plain)) =
                    ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity))
                {
                    out.push_str(plain);
                    rest = &rest[entity.len()..];
                    continue;
                }
            }
            match SYMBOLS.iter().find(|(symbol, _)| *symbol == c) {
                Some((_, plain)) => out.push_str(plain),
                None => out.push(c),
            }
            rest = &rest[c.len_utf8()..];
        }
        out
    }

    fn to_markup(&self, plain: &str) -> String {
        let mut out = String::with_capacity(plain.len());
        let mut rest = plain;
        'scan: while let Some(c) = rest.chars().next() {
            for (operator, symbol) in PLAIN_OPERATORS {
                if rest.starts_with(operator) {
                    out.push(*symbol);
                    rest = &rest[operator.len()..];
                    continue 'scan;
                }
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
        out
    }
}
