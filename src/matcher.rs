use std::fmt;

const WILDCARD: &str = "*";

///
/// A URL path pattern split into `/`-delimited segments. A segment made of a single `*`
/// matches any one request segment at the same position.
///
/// Patterns match by prefix: `/user` matches `/user`, `/user/a1` and `/user/a1/name`, while
/// `/user/*/name` needs at least three request segments after the leading empty one.
///
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct PathPattern {
    segments: Vec<String>,
}

impl PathPattern {
    pub(crate) fn new(pattern: &str) -> Self {
        Self {
            segments: split_path(pattern).map(ToString::to_string).collect(),
        }
    }

    pub(crate) fn matches_segments(&self, request_segments: &[&str]) -> bool {
        if self.segments.len() > request_segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(request_segments)
            .all(|(expected, actual)| expected == WILDCARD || expected == actual)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

pub(crate) fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.split('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    impl PathPattern {
        fn matches(&self, path: &str) -> bool {
            let request_segments: Vec<&str> = split_path(path).collect();
            self.matches_segments(&request_segments)
        }
    }

    #[test]
    fn test_exact_path() {
        let pattern = PathPattern::new("/hello");
        assert!(pattern.matches("/hello"));
        assert!(!pattern.matches("/world"));
    }

    #[test]
    fn test_prefix_matches_longer_paths() {
        let pattern = PathPattern::new("/user");
        assert!(pattern.matches("/user/a1"));
        assert!(pattern.matches("/user/a1/name"));
        assert!(!pattern.matches("/users"));
    }

    #[test]
    fn test_longer_pattern_never_matches_shorter_path() {
        let pattern = PathPattern::new("/user/*/name");
        assert!(!pattern.matches("/user"));
        assert!(!pattern.matches("/user/a1"));
    }

    #[test]
    fn test_wildcard_matches_a_single_segment() {
        let pattern = PathPattern::new("/user/*/name");
        assert!(pattern.matches("/user/a1/name"));
        assert!(pattern.matches("/user/hello/name"));
        assert!(pattern.matches("/user//name"));
        assert!(!pattern.matches("/user/a1/other"));
        assert!(!pattern.matches("/account/a1/name"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let pattern = PathPattern::new("/User");
        assert!(!pattern.matches("/user"));
    }

    #[test]
    fn test_segments_are_not_decoded() {
        let pattern = PathPattern::new("/a b");
        assert!(!pattern.matches("/a%20b"));
        assert!(PathPattern::new("/a%20b").matches("/a%20b"));
    }

    #[test]
    fn test_root_pattern_only_matches_an_empty_second_segment() {
        let pattern = PathPattern::new("/");
        assert!(pattern.matches("/"));
        assert!(pattern.matches("//anything"));
        assert!(!pattern.matches("/anything"));
    }

    #[test]
    fn test_empty_pattern_is_a_single_empty_segment() {
        let pattern = PathPattern::new("");
        assert_eq!(pattern.segments, vec![String::new()]);
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/err"));
        assert!(!PathPattern::new("/").matches(""));
    }

    #[test]
    fn test_trailing_slash_adds_an_empty_segment() {
        let pattern = PathPattern::new("/user/");
        assert!(pattern.matches("/user/"));
        assert!(!pattern.matches("/user"));
        assert!(!pattern.matches("/user/a1"));
    }

    #[test]
    fn test_display_rejoins_the_segments() {
        assert_eq!("/user/*/name", PathPattern::new("/user/*/name").to_string());
    }
}
