use crate::core::DepList;

/// How tokens of a PKGBUILD array are cleaned before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Cut each token at its first version-constraint or quote character,
    /// leaving a bare package name.
    #[default]
    Strip,
    /// Keep constraints and descriptions verbatim, dropping only the
    /// surrounding quotes.
    Raw,
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\r')
}

fn is_constraint(c: char) -> bool {
    matches!(c, '=' | '<' | '>') || is_quote(c)
}

/// Splits the interior of a shell array into raw elements.
///
/// Elements are separated by runs of whitespace. An element that opens with a
/// quote runs to its matching closing quote, so `'qux: optional feature'` is a
/// single element.
struct Elements<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let start = self.rest.trim_start_matches(is_separator);
        let first = start.chars().next()?;

        let scan_from = if is_quote(first) {
            start[1..].find(first).map_or(0, |pos| pos + 2)
        } else {
            0
        };
        let end = start[scan_from..]
            .find(is_separator)
            .map_or(start.len(), |pos| scan_from + pos);

        let (element, rest) = start.split_at(end);
        self.rest = rest;
        Some(element)
    }
}

fn clean_token(element: &str, mode: ParseMode) -> &str {
    let token = element.strip_prefix(is_quote).unwrap_or(element);

    match mode {
        ParseMode::Strip => match token.find(is_constraint) {
            Some(end) => &token[..end],
            None => token,
        },
        ParseMode::Raw => token.strip_suffix(is_quote).unwrap_or(token),
    }
}

/// Tokenizes one array body (the text between `(` and `)`) into `deps`.
///
/// Tokens already present in `deps` are skipped, as are tokens that clean
/// down to nothing (`''`).
pub fn parse_array(body: &str, deps: &mut DepList<String>, mode: ParseMode) {
    let elements = Elements { rest: body };

    for element in elements {
        let token = clean_token(element, mode);
        if token.is_empty() {
            continue;
        }

        if deps.insert_unique(token.to_string()) {
            log::debug!("Adding depend: {}", token);
        }
    }
}
