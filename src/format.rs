use std::collections::BTreeSet;

use crate::scope::ScopeStack;

/// Characters that may continue a variable reference after `$`. Digits are
/// only allowed once something else has been read.
const fn is_name_char(c: char, first: bool) -> bool {
    match c {
        '0'..='9' => !first,
        'a'..='z' | 'A'..='Z' | '_' | '.' | '{' | '}' => true,
        _ => false,
    }
}

/// Keeps a candidate only in its braced form, returning the inner path.
fn braced(candidate: &str) -> Option<&str> {
    candidate
        .strip_prefix('{')?
        .strip_suffix('}')
        .filter(|name| !name.is_empty())
}

/// Collects the distinct `${path}` references of a line.
///
/// A reference runs from `$` up to the first character that cannot be part
/// of a name, and is only accepted if what was read is wrapped in braces:
/// `${a}` and `${a.b}` count, `$a` and `${a}b` do not.
pub(crate) fn scan_variables(line: &str) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    let mut start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        if let Some(from) = start {
            if is_name_char(c, i == from) {
                continue;
            }
            if let Some(name) = line.get(from..i).and_then(braced) {
                names.insert(name);
            }
            start = None;
        }
        if c == '$' {
            start = Some(i.saturating_add(1));
        }
    }

    if let Some(name) = start.and_then(|from| line.get(from..)).and_then(braced) {
        names.insert(name);
    }

    names
}

/// Substitutes every resolvable `${path}` in `line`. References that do not
/// resolve are kept verbatim.
pub(crate) fn format_line(line: &str, scopes: &ScopeStack<'_>) -> String {
    let provider = scopes.provider();
    let mut rendered = line.to_string();

    for name in scan_variables(line) {
        let Some(value) = scopes.lookup(name) else {
            tracing::trace!(variable = name, "unresolved, left as is");
            continue;
        };
        let marker = format!("${{{}}}", name);
        rendered = rendered.replace(&marker, &provider.display(Some(&value)));
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MapProvider, Value};

    fn names(line: &str) -> Vec<&str> {
        scan_variables(line).into_iter().collect()
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scan_braced_only() {
        assert_eq!(names("Hi there ${var},${var2}"), vec!["var", "var2"]);
        assert_eq!(names("$bare and ${braced}"), vec!["braced"]);
        assert_eq!(names("no variables"), Vec::<&str>::new());
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scan_dotted_and_trailing() {
        assert_eq!(names("${a.b.c}"), vec!["a.b.c"]);
        assert_eq!(names("value: ${item}"), vec!["item"]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scan_adjacent_references() {
        assert_eq!(names("${a}${b}"), vec!["a", "b"]);
        assert_eq!(names("${a} ${a}"), vec!["a"]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scan_rejects_unterminated_or_glued() {
        // Letters right after the closing brace keep the reference open.
        assert_eq!(names("${a}b"), Vec::<&str>::new());
        assert_eq!(names("${a"), Vec::<&str>::new());
        assert_eq!(names("${}"), Vec::<&str>::new());
        assert_eq!(names("$"), Vec::<&str>::new());
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scan_digits() {
        // A digit cannot directly follow `$`.
        assert_eq!(names("$1{a}"), Vec::<&str>::new());
        assert_eq!(names("${a1}"), vec!["a1"]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_scan_multibyte_text() {
        assert_eq!(names("héllo ${wörld} ${name}ü"), vec!["name"]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_format_line() {
        let provider = MapProvider::new()
            .with("var", 10_i32)
            .with("var2", "joe")
            .with("missing_value", Value::Null);
        let scopes = ScopeStack::new(&provider);

        assert_eq!(
            format_line("Hi there ${var},${var2}", &scopes),
            "Hi there 10,joe"
        );
        assert_eq!(format_line("${var} and ${var}", &scopes), "10 and 10");
        assert_eq!(format_line("keep ${ghost}", &scopes), "keep ${ghost}");
        assert_eq!(
            format_line("keep ${missing_value}", &scopes),
            "keep ${missing_value}"
        );
        assert_eq!(format_line("$var stays", &scopes), "$var stays");
    }
}
