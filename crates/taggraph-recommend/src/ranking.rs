//! Tag-overlap ranking.
//!
//! Candidates are ordered by the number of tags they share with the
//! project, most first. Equal counts are ordered by ascending person id so
//! the output is stable for a fixed graph state.

use std::cmp::Ordering;

use taggraph_core::Recommendation;
use taggraph_graph::OverlapSnapshot;

/// Rank the snapshot's candidates and keep the first `limit`.
///
/// Members of the project are excluded, and only tags the project actually
/// carries count toward the overlap.
pub fn rank_candidates(snapshot: OverlapSnapshot, limit: usize) -> Vec<Recommendation> {
    let OverlapSnapshot {
        project_tags,
        members,
        candidates,
    } = snapshot;

    let mut ranked: Vec<Recommendation> = candidates
        .into_iter()
        .filter(|(person_id, _)| !members.contains(person_id))
        .filter_map(|(person_id, tags)| {
            let shared: Vec<String> = tags
                .into_iter()
                .filter(|t| project_tags.contains(t))
                .collect();
            (!shared.is_empty()).then(|| Recommendation {
                person_id,
                shared_tag_count: shared.len(),
                shared_tag_ids: shared,
            })
        })
        .collect();

    ranked.sort_by(compare);
    ranked.truncate(limit);
    ranked
}

fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.shared_tag_count
        .cmp(&a.shared_tag_count)
        .then_with(|| a.person_id.cmp(&b.person_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn snapshot(
        project_tags: &[&str],
        members: &[&str],
        candidates: Vec<(&str, Vec<&str>)>,
    ) -> OverlapSnapshot {
        OverlapSnapshot {
            project_tags: set(project_tags),
            members: set(members),
            candidates: candidates
                .into_iter()
                .map(|(id, tags)| (id.to_string(), set(&tags)))
                .collect(),
        }
    }

    fn ids(ranked: &[Recommendation]) -> Vec<&str> {
        ranked.iter().map(|r| r.person_id.as_str()).collect()
    }

    #[test]
    fn orders_by_shared_count_then_id() {
        let snap = snapshot(
            &["t1", "t2", "t3"],
            &[],
            vec![
                ("zed", vec!["t1", "t2"]),
                ("amy", vec!["t1"]),
                ("bob", vec!["t1", "t2"]),
                ("cat", vec!["t1", "t2", "t3"]),
            ],
        );
        let ranked = rank_candidates(snap, 10);
        assert_eq!(ids(&ranked), vec!["cat", "bob", "zed", "amy"]);
        assert_eq!(ranked[0].shared_tag_count, 3);
        assert_eq!(ranked[0].shared_tag_ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn members_are_excluded() {
        let snap = snapshot(
            &["t1", "t2"],
            &["c"],
            vec![("a", vec!["t1"]), ("b", vec!["t1", "t2"]), ("c", vec!["t1", "t2"])],
        );
        let ranked = rank_candidates(snap, 10);
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn truncates_to_limit() {
        let snap = snapshot(
            &["t1", "t2", "t3", "t4", "t5"],
            &[],
            vec![
                ("p1", vec!["t1"]),
                ("p2", vec!["t1", "t2"]),
                ("p3", vec!["t1", "t2", "t3"]),
                ("p4", vec!["t1", "t2", "t3", "t4"]),
                ("p5", vec!["t1", "t2", "t3", "t4", "t5"]),
            ],
        );
        let ranked = rank_candidates(snap.clone(), 2);
        assert_eq!(ids(&ranked), vec!["p5", "p4"]);

        assert!(rank_candidates(snap, 0).is_empty());
    }

    #[test]
    fn tags_outside_the_project_do_not_count() {
        let snap = snapshot(&["t1"], &[], vec![("a", vec!["t1", "t9"]), ("b", vec!["t9"])]);
        let ranked = rank_candidates(snap, 10);
        assert_eq!(ids(&ranked), vec!["a"]);
        assert_eq!(ranked[0].shared_tag_count, 1);
    }

    #[test]
    fn empty_snapshot_ranks_nothing() {
        assert!(rank_candidates(OverlapSnapshot::default(), 50).is_empty());
    }
}
