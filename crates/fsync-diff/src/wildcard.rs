//! `*` and `?` name patterns

/// Compiled file name pattern
///
/// `*` matches any run of characters, `?` exactly one. Everything else
/// matches itself, folded to lowercase when the pattern ignores case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    pattern: Vec<char>,
    ignore_case: bool,
    match_all: bool,
}

impl Wildcard {
    /// Compile `pattern`
    pub fn new(pattern: &str, ignore_case: bool) -> Self {
        // "*.*" matches names without a dot too, as it always has on Windows
        let match_all = pattern.chars().all(|c| c == '*') || pattern == "*.*";
        let pattern = if ignore_case {
            pattern.to_lowercase().chars().collect()
        } else {
            pattern.chars().collect()
        };
        Self {
            pattern,
            ignore_case,
            match_all,
        }
    }

    /// Whether every name matches
    pub fn matches_everything(&self) -> bool {
        self.match_all
    }

    /// Test a name against the pattern
    pub fn matches(&self, name: &str) -> bool {
        if self.match_all {
            return true;
        }
        let name: Vec<char> = if self.ignore_case {
            name.to_lowercase().chars().collect()
        } else {
            name.chars().collect()
        };
        glob_match(&self.pattern, &name)
    }
}

fn glob_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some('?') => {
                p += 1;
                n += 1;
            }
            Some(&c) if c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                Some((star_p, star_n)) => {
                    p = star_p + 1;
                    n = star_n + 1;
                    star = Some((star_p, star_n + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("*", "anything.txt", true)]
    #[case("*.txt", "notes.txt", true)]
    #[case("*.txt", "notes.txt.bak", false)]
    #[case("report-??.csv", "report-07.csv", true)]
    #[case("report-??.csv", "report-7.csv", false)]
    #[case("a*b*c", "aXXbYYc", true)]
    #[case("a*b*c", "aXXbYY", false)]
    #[case("*.*", "Makefile", true)]
    #[case("", "", true)]
    #[case("?", "", false)]
    fn test_patterns(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(Wildcard::new(pattern, false).matches(name), expected);
    }

    #[test]
    fn test_casing() {
        assert!(Wildcard::new("*.TXT", true).matches("readme.txt"));
        assert!(!Wildcard::new("*.TXT", false).matches("readme.txt"));
    }

    proptest! {
        #[test]
        fn test_literal_pattern_matches_itself(name in "[a-zA-Z0-9._-]{0,24}") {
            prop_assert!(Wildcard::new(&name, false).matches(&name));
        }

        #[test]
        fn test_star_suffix_matches_any_extension(stem in "[a-z]{1,8}", ext in "[a-z]{0,4}") {
            let name = format!("{}.{}", stem, ext);
            let pattern = format!("{}.*", stem);
            prop_assert!(Wildcard::new(&pattern, false).matches(&name));
        }
    }
}
