//! Picks the driver build closest to a requested browser version.
//!
//! Candidates must share the requested major version. Among those, the one
//! sharing the longest prefix of components wins:
//!
//! | score | matching components              |
//! |-------|----------------------------------|
//! | 0     | major, minor, build and revision |
//! | 1     | major, minor and build           |
//! | 2     | major and minor                  |
//! | 3     | major only                       |
//!
//! Ties go to the candidate that comes first in the pool.

use crate::sources::DriverCandidate;
use crate::version::VersionNumber;

/// Closeness of `candidate` to `requested`; lower is better, `None` means a
/// different major version.
pub fn match_score(candidate: &VersionNumber, requested: &VersionNumber) -> Option<u8> {
    if candidate.major != requested.major {
        return None;
    }
    let score = if candidate.minor != requested.minor {
        3
    } else if candidate.build != requested.build {
        2
    } else if candidate.revision != requested.revision {
        1
    } else {
        0
    };
    Some(score)
}

/// Returns the best candidate for `requested`, or `None` if no candidate
/// shares its major version.
pub fn find_best_match<'a>(
    pool: &'a [DriverCandidate],
    requested: &VersionNumber,
) -> Option<&'a DriverCandidate> {
    pool.iter()
        .filter_map(|candidate| match_score(&candidate.version, requested).map(|s| (s, candidate)))
        // `min_by_key` returns the first of equal minimums.
        .min_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(text: &str) -> VersionNumber {
        VersionNumber::parse(text).unwrap()
    }

    fn pool(versions: &[&str]) -> Vec<DriverCandidate> {
        versions
            .iter()
            .enumerate()
            .map(|(i, text)| DriverCandidate::new(v(text), format!("https://mirror/{i}/{text}")))
            .collect()
    }

    #[rstest]
    #[case("1.2.3.4", Some(0))]
    #[case("1.2.3.9", Some(1))]
    #[case("1.2.9.4", Some(2))]
    #[case("1.9.3.4", Some(3))]
    #[case("2.2.3.4", None)]
    fn match_score_counts_leading_components(#[case] candidate: &str, #[case] expected: Option<u8>) {
        assert_eq!(match_score(&v(candidate), &v("1.2.3.4")), expected);
    }

    #[test]
    fn exact_match_wins() {
        let pool = pool(&["1.2.3.9", "1.2.3.4", "1.5.0.0", "2.0.0.0"]);
        let best = find_best_match(&pool, &v("1.2.3.4")).unwrap();
        assert_eq!(best.version, v("1.2.3.4"));
    }

    #[test]
    fn build_match_beats_minor_and_major_matches() {
        let pool = pool(&["1.9.0.0", "1.2.9.0", "1.2.3.9"]);
        let best = find_best_match(&pool, &v("1.2.3.4")).unwrap();
        assert_eq!(best.version, v("1.2.3.9"));
    }

    #[test]
    fn different_major_is_never_selected() {
        let pool = pool(&["2.0.0.0", "3.0.0.0"]);
        assert!(find_best_match(&pool, &v("1.0.0.0")).is_none());
    }

    #[test]
    fn empty_pool_has_no_match() {
        assert!(find_best_match(&[], &v("114")).is_none());
    }

    #[test]
    fn ties_go_to_the_first_candidate_in_the_pool() {
        let pool = pool(&["114.0.5735.90", "114.0.5735.16", "114.0.5735.90"]);
        let best = find_best_match(&pool, &v("114.0.5735.199")).unwrap();
        assert_eq!(best.download_url, "https://mirror/0/114.0.5735.90");

        let best = find_best_match(&pool, &v("114.0.5735.90")).unwrap();
        assert_eq!(best.download_url, "https://mirror/0/114.0.5735.90");
    }

    #[test]
    fn major_only_request_prefers_the_x_0_0_0_build() {
        // "115" pads to 115.0.0.0, so 115.0.x builds share the minor component.
        let pool = pool(&["115.1.0.0", "115.0.5790.102"]);
        let best = find_best_match(&pool, &v("115")).unwrap();
        assert_eq!(best.version, v("115.0.5790.102"));
    }
}
