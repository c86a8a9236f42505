//! Relative path algebra between virtual, `/`-separated document addresses.

/// Navigable relative path from the document at `source` to the one at `target`.
///
/// A self-link yields `./<file>`. Otherwise the segment-wise common directory
/// prefix is stripped from both sides; a source left with only its file name
/// gets `./<rest of target>`, a deeper source climbs with one `../` per
/// remaining directory. File names never count toward the common prefix, so
/// joining the result onto `source`'s directory always reproduces `target`.
pub fn relative_path(source: &str, target: &str) -> String {
    if source == target {
        let file = source.rsplit('/').next().unwrap_or(source);
        return format!("./{file}");
    }

    let from: Vec<&str> = source.split('/').collect();
    let to: Vec<&str> = target.split('/').collect();

    let max_shared = from.len().min(to.len()).saturating_sub(1);
    let shared = from
        .iter()
        .zip(&to)
        .take(max_shared)
        .take_while(|(a, b)| return a == b)
        .count();

    let remaining = from.len().saturating_sub(shared);
    let rest = to.get(shared..).unwrap_or_default().join("/");

    if remaining == 1 {
        return format!("./{rest}");
    }
    return format!("{}{rest}", "../".repeat(remaining.saturating_sub(1)));
}

/// Resolve `relative` against the directory containing `source`.
///
/// Inverse of [`relative_path`]: `./` segments are dropped, each `../` pops
/// one directory.
#[cfg(test)]
pub fn join_relative(source: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = source.split('/').collect();
    segments.pop();

    for segment in relative.split('/') {
        match segment {
            "." | "" => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    return segments.join("/");
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn shallow_sibling_link() {
        assert_eq!(relative_path("out/Root/Ns.A.md", "out/Root/Ns.B.md"), "./Ns.B.md");
    }

    #[test]
    fn deep_source_climbs() {
        assert_eq!(relative_path("out/A/B/C.md", "out/A/D.md"), "../D.md");
    }

    #[test]
    fn self_link_uses_file_name() {
        assert_eq!(relative_path("out/Root/Ns.A.md", "out/Root/Ns.A.md"), "./Ns.A.md");
    }

    #[test]
    fn shallow_source_descends_into_target_dirs() {
        assert_eq!(relative_path("out/A.md", "out/B/C/D.md"), "./B/C/D.md");
    }

    #[test]
    fn diverging_branches() {
        assert_eq!(relative_path("out/A/B/C.md", "out/X/Y.md"), "../../X/Y.md");
    }

    #[test]
    fn file_named_like_directory_is_not_shared() {
        // `out/A` is a file on one side and a directory on the other.
        let rel = relative_path("out/A", "out/A/B.md");
        assert_eq!(rel, "./A/B.md");
        assert_eq!(join_relative("out/A", &rel), "out/A/B.md");
    }

    #[test]
    fn join_handles_dot_and_parent() {
        assert_eq!(join_relative("out/A/B/C.md", "../D.md"), "out/A/D.md");
        assert_eq!(join_relative("out/Root/Ns.A.md", "./Ns.B.md"), "out/Root/Ns.B.md");
    }

    /// Paths of 2..5 segments under a shared `out` root, drawn from a small
    /// alphabet so common prefixes are frequent.
    fn rooted_path() -> impl Strategy<Value = String> {
        return prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d.md"]), 1..5)
            .prop_map(|segments| return format!("out/{}", segments.join("/")));
    }

    proptest! {
        #[test]
        fn round_trip_reproduces_target(source in rooted_path(), target in rooted_path()) {
            let rel = relative_path(&source, &target);
            prop_assert_eq!(join_relative(&source, &rel), target);
        }

        #[test]
        fn self_link_is_dot_file(path in rooted_path()) {
            let file = path.rsplit('/').next().unwrap_or_default().to_string();
            prop_assert_eq!(relative_path(&path, &path), format!("./{file}"));
        }
    }
}
