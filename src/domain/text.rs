//! Splitting of multi-value text cells (tags, comments)

/// Separators tried in priority order; the first one present wins
const LIST_SEPARATORS: [char; 3] = ['\n', ';', ','];

/// Splits a multi-value cell into trimmed, non-empty parts
///
/// Only one separator kind is used: newline beats `;`, which beats `,`.
pub fn split_list(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }

    match LIST_SEPARATORS.iter().find(|sep| value.contains(**sep)) {
        Some(sep) => collect_parts(value.split(*sep)),
        None => vec![value.to_string()],
    }
}

/// Splits on an explicit delimiter, trimming and dropping empty parts
pub fn split_on(value: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return split_list(value);
    }
    collect_parts(value.split(delimiter))
}

fn collect_parts<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn split_list_variants() {
        assert!(split_list("").is_empty());
        assert!(split_list("   ").is_empty());
        assert_eq!(split_list("alpha"), vec!["alpha"]);
        assert_eq!(split_list("alpha, beta"), vec!["alpha", "beta"]);
        assert_eq!(split_list("alpha;beta"), vec!["alpha", "beta"]);
        assert_eq!(split_list("alpha\nbeta"), vec!["alpha", "beta"]);
    }

    #[test]
    fn newline_takes_priority_over_other_separators() {
        assert_eq!(split_list("a, b\nc; d"), vec!["a, b", "c; d"]);
    }

    #[test]
    fn semicolon_takes_priority_over_comma() {
        assert_eq!(split_list("a, b; c"), vec!["a, b", "c"]);
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(split_list("a,, ,b,"), vec!["a", "b"]);
    }

    #[test]
    fn explicit_delimiter_split() {
        assert_eq!(split_on("first || second ||", "||"), vec!["first", "second"]);
        assert_eq!(split_on("one, two", "||"), vec!["one, two"]);
    }

    #[test]
    fn empty_delimiter_falls_back_to_list_split() {
        assert_eq!(split_on("one; two", ""), vec!["one", "two"]);
    }

    proptest! {
        #[test]
        fn single_separator_kind_roundtrips(
            parts in prop::collection::vec("[a-z][a-z ]{0,6}[a-z]", 1..6),
            sep in prop::sample::select(vec!["\n", ";", ",", ", ", " ; "]),
        ) {
            let joined = parts.join(sep);
            let expected: Vec<String> = parts.iter().map(|p| p.trim().to_string()).collect();
            prop_assert_eq!(split_list(&joined), expected);
        }
    }
}
