//! Tests for path tokenization.

use super::{Path, PathError, Segment, escape_key};

fn key(s: &str) -> Segment {
    Segment::Key(s.to_string())
}

fn parse(s: &str) -> Result<Vec<Segment>, PathError> {
    s.parse::<Path>().map(|p| p.segments().to_vec())
}

mod valid_paths {
    use super::*;

    #[test]
    fn single_key() {
        assert_eq!(parse("name").unwrap(), vec![key("name")]);
    }

    #[test]
    fn dotted_keys() {
        assert_eq!(parse("a.b.c").unwrap(), vec![key("a"), key("b"), key("c")]);
    }

    #[test]
    fn index_binds_without_dot() {
        assert_eq!(
            parse("a.b[2].c").unwrap(),
            vec![key("a"), key("b"), Segment::Index(2), key("c")]
        );
    }

    #[test]
    fn consecutive_indices() {
        assert_eq!(
            parse("grid[1][0]").unwrap(),
            vec![key("grid"), Segment::Index(1), Segment::Index(0)]
        );
    }

    #[test]
    fn dot_before_index_is_accepted() {
        assert_eq!(parse("a.[3]").unwrap(), parse("a[3]").unwrap());
    }

    #[test]
    fn index_at_root() {
        assert_eq!(
            parse("[0].name").unwrap(),
            vec![Segment::Index(0), key("name")]
        );
    }

    #[test]
    fn escaped_dot_stays_in_key() {
        assert_eq!(parse(r"a\.b.c").unwrap(), vec![key("a.b"), key("c")]);
    }

    #[test]
    fn escaped_brackets_and_backslash() {
        assert_eq!(parse(r"x\[0\]").unwrap(), vec![key("x[0]")]);
        assert_eq!(parse(r"dir\\.file").unwrap(), vec![key(r"dir\"), key("file")]);
    }
}

mod malformed_paths {
    use super::*;

    #[test]
    fn empty_path() {
        assert_eq!(parse(""), Err(PathError::Empty));
    }

    #[test]
    fn empty_keys() {
        assert_eq!(parse("a..b"), Err(PathError::EmptyKey { position: 2 }));
        assert_eq!(parse(".a"), Err(PathError::EmptyKey { position: 0 }));
        assert_eq!(parse("a."), Err(PathError::EmptyKey { position: 2 }));
    }

    #[test]
    fn unclosed_index() {
        assert_eq!(parse("a[1"), Err(PathError::UnclosedIndex { position: 1 }));
    }

    #[test]
    fn non_numeric_index() {
        assert!(matches!(
            parse("a[x]"),
            Err(PathError::InvalidIndex { ref text, position: 1 }) if text == "x"
        ));
        assert!(matches!(parse("a[]"), Err(PathError::InvalidIndex { .. })));
        assert!(matches!(parse("a[1-2]"), Err(PathError::InvalidIndex { .. })));
    }

    #[test]
    fn negative_index_is_reported() {
        assert_eq!(
            parse("a[-1]"),
            Err(PathError::NegativeIndex {
                index: -1,
                position: 1
            })
        );
    }

    #[test]
    fn stray_closing_bracket() {
        assert_eq!(parse("a]"), Err(PathError::UnexpectedBracket { position: 1 }));
    }

    #[test]
    fn key_glued_to_index() {
        assert_eq!(
            parse("a[0]b"),
            Err(PathError::MissingSeparator { position: 4 })
        );
    }

    #[test]
    fn dangling_escape() {
        assert_eq!(parse(r"a\"), Err(PathError::DanglingEscape { position: 1 }));
    }
}

mod display {
    use super::*;

    #[test]
    fn canonical_form() {
        let path: Path = "a.[1].b".parse().unwrap();
        assert_eq!(path.to_string(), "a[1].b");
    }

    #[test]
    fn escapes_are_re_derived() {
        for raw in [r"a\.b.c", r"x\[0\][2]", r"back\\slash.k"] {
            let path: Path = raw.parse().unwrap();
            assert_eq!(path.to_string(), raw);
        }
    }

    #[test]
    fn escape_key_round_trips() {
        let key = r"odd.key[with]\stuff";
        let path: Path = escape_key(key).parse().unwrap();
        assert_eq!(path.segments(), [Segment::Key(key.to_string())]);
    }
}

mod ordering {
    use super::*;

    #[test]
    fn indices_sort_numerically() {
        let mut paths: Vec<Path> = ["a[10]", "a[2]", "a[0]"]
            .iter()
            .map(|p| p.parse().unwrap())
            .collect();
        paths.sort();

        let rendered: Vec<_> = paths.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["a[0]", "a[2]", "a[10]"]);
    }
}
