use log::debug;

use crate::config::*;
use crate::votes::has_voted;

/// The initiatives a user still has to score, in the order they should be presented.
///
/// Initiatives already scored by the user are skipped. The others come by
/// decreasing priority, then by team name. The sort is stable, so initiatives
/// with the same priority and team keep the order of the snapshot.
///
/// The queue is not a cursor: it is meant to be rebuilt from every new
/// snapshot. Its head is the next initiative to score, and an empty queue
/// means that the user scored everything.
pub fn build_queue<'a>(initiatives: &'a [Initiative], user_id: &str) -> Vec<&'a Initiative> {
    let mut queue: Vec<&Initiative> = initiatives
        .iter()
        .filter(|i| !has_voted(i, user_id))
        .collect();
    queue.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| a.team.cmp(&b.team))
    });
    debug!(
        "build_queue: user {}: {} of {} initiatives left",
        user_id,
        queue.len(),
        initiatives.len()
    );
    queue
}

/// The next initiative the user should score, if any.
pub fn next_initiative<'a>(initiatives: &'a [Initiative], user_id: &str) -> Option<&'a Initiative> {
    build_queue(initiatives, user_id).first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::votes::replace_vote;

    fn initiative(id: &str, team: &str, priority: &str) -> Initiative {
        let cols: Vec<String> = [team, "m", "o", "k", priority, id]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Initiative::new(id, InitiativeFields::from_columns(&cols))
    }

    fn summary(queue: &[&Initiative]) -> Vec<(Priority, String)> {
        queue.iter().map(|i| (i.priority, i.team.clone())).collect()
    }

    #[test]
    fn priority_first_then_team() {
        let initiatives = vec![
            initiative("a", "Zulu", "Low"),
            initiative("b", "Beta", "High"),
            initiative("c", "Alpha", "High"),
            initiative("d", "Mike", "Medium"),
        ];
        let queue = build_queue(&initiatives, "fresh");
        assert_eq!(
            summary(&queue),
            vec![
                (Priority::High, "Alpha".to_string()),
                (Priority::High, "Beta".to_string()),
                (Priority::Medium, "Mike".to_string()),
                (Priority::Low, "Zulu".to_string()),
            ]
        );
    }

    #[test]
    fn voted_initiatives_leave_the_queue() {
        let ana = User::new("u1", "Ana", "OPS");
        let mut initiatives = vec![
            initiative("a", "OPS", "Alta"),
            initiative("b", "OPS", "Média"),
        ];
        assert_eq!(next_initiative(&initiatives, "u1").map(|i| i.id.as_str()), Some("a"));

        let votes = replace_vote(initiatives[0].votes(), Vote::new(&ana, 50, 50, 1));
        initiatives[0].set_votes(votes);
        assert_eq!(next_initiative(&initiatives, "u1").map(|i| i.id.as_str()), Some("b"));
        // Other users still see everything.
        assert_eq!(build_queue(&initiatives, "u2").len(), 2);

        let votes = replace_vote(initiatives[1].votes(), Vote::new(&ana, 50, 50, 2));
        initiatives[1].set_votes(votes);
        assert!(build_queue(&initiatives, "u1").is_empty());
        assert_eq!(next_initiative(&initiatives, "u1"), None);
    }

    #[test]
    fn ties_keep_snapshot_order() {
        let initiatives = vec![
            initiative("first", "OPS", "High"),
            initiative("second", "OPS", "High"),
        ];
        let ids: Vec<&str> = build_queue(&initiatives, "u")
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
