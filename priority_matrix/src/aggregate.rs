use log::{debug, info};

use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::config::*;
use crate::votes::has_voted;

// **** Private structures ****

// Sums are kept as integers so that the final division is the only rounding step.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
struct WeightedSum {
    total: u64,
    weights: u64,
}

impl WeightedSum {
    fn mean(&self) -> Option<f64> {
        if self.weights == 0 {
            None
        } else {
            Some(self.total as f64 / self.weights as f64)
        }
    }
}

impl AddAssign<(u8, u64)> for WeightedSum {
    fn add_assign(&mut self, (score, weight): (u8, u64)) {
        self.total += score as u64 * weight;
        self.weights += weight;
    }
}

/// The weight of a vote on the impact axis.
///
/// The oversight team weighs double on impact.
pub fn impact_weight(vote: &Vote, roster: &TeamRoster) -> u64 {
    if vote.user_team() == roster.oversight_team() {
        2
    } else {
        1
    }
}

/// The weight of a vote on the complexity axis.
///
/// The team owning the initiative weighs double on its complexity.
pub fn complexity_weight(vote: &Vote, initiative: &Initiative) -> u64 {
    if vote.user_team() == initiative.team {
        2
    } else {
        1
    }
}

/// Computes the weighted position of an initiative.
///
/// Returns `None` when the initiative has no vote: such an initiative has no
/// position and must not be plotted. The result only depends on the votes
/// and on the roster, so calling it again on the same data returns exactly the
/// same values.
pub fn aggregate(initiative: &Initiative, roster: &TeamRoster) -> Option<Coordinates> {
    let mut impact = WeightedSum::default();
    let mut complexity = WeightedSum::default();
    for v in initiative.votes() {
        impact += (v.impact(), impact_weight(v, roster));
        complexity += (v.complexity(), complexity_weight(v, initiative));
    }
    let res = Coordinates {
        avg_impact: impact.mean()?,
        avg_complexity: complexity.mean()?,
    };
    debug!(
        "aggregate: initiative {}: {} votes -> {:?}",
        initiative.id,
        initiative.votes().len(),
        res
    );
    Some(res)
}

/// Positions all the initiatives that received at least one vote.
///
/// The initiatives keep the order of the input.
pub fn plot(initiatives: &[Initiative], roster: &TeamRoster) -> Vec<PlottedInitiative> {
    let res: Vec<PlottedInitiative> = initiatives
        .iter()
        .filter_map(|i| {
            aggregate(i, roster).map(|coordinates| PlottedInitiative {
                initiative: i.clone(),
                coordinates,
            })
        })
        .collect();
    info!(
        "plot: {} of {} initiatives have votes",
        res.len(),
        initiatives.len()
    );
    res
}

/// Restricts the plotted initiatives to a team and/or a priority.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MatrixFilter {
    pub team: Option<String>,
    pub priority: Option<Priority>,
}

impl MatrixFilter {
    pub const ALL: MatrixFilter = MatrixFilter {
        team: None,
        priority: None,
    };

    pub fn matches(&self, initiative: &Initiative) -> bool {
        let team_ok = self.team.as_ref().map_or(true, |t| *t == initiative.team);
        let priority_ok = self.priority.map_or(true, |p| p == initiative.priority);
        team_ok && priority_ok
    }

    pub fn apply<'a>(&self, plotted: &'a [PlottedInitiative]) -> Vec<&'a PlottedInitiative> {
        plotted
            .iter()
            .filter(|p| self.matches(&p.initiative))
            .collect()
    }
}

/// Counts the initiatives of a backlog.
///
/// When a user id is given, also counts the initiatives this user did not score yet.
pub fn backlog_stats(initiatives: &[Initiative], user_id: Option<&str>) -> BacklogStats {
    let mut by_team: BTreeMap<String, usize> = BTreeMap::new();
    let mut res = BacklogStats {
        total: initiatives.len(),
        ..BacklogStats::default()
    };
    for i in initiatives {
        match i.priority {
            Priority::High => res.high += 1,
            Priority::Medium => res.medium += 1,
            Priority::Low => res.low += 1,
        }
        *by_team.entry(i.team.clone()).or_insert(0) += 1;
        if let Some(uid) = user_id {
            if !has_voted(i, uid) {
                res.pending_for_user += 1;
            }
        }
    }
    res.by_team = by_team.into_iter().collect();
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initiative(id: &str, team: &str, priority: &str, votes: Vec<Vote>) -> Initiative {
        let cols: Vec<String> = [team, "m", "o", "k", priority, id]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Initiative::with_votes(id, InitiativeFields::from_columns(&cols), votes)
    }

    fn vote(uid: &str, team: &str, impact: i64, complexity: i64) -> Vote {
        Vote::new(&User::new(uid, uid, team), impact, complexity, 0)
    }

    fn roster() -> TeamRoster {
        TeamRoster::new(&["Ops".to_string(), "Board".to_string()]).unwrap()
    }

    #[test]
    fn oversight_and_owner_weigh_double() {
        let init = initiative(
            "i1",
            "Ops",
            "High",
            vec![vote("u1", "Ops", 80, 60), vote("u2", "Board", 40, 20)],
        );
        let c = aggregate(&init, &roster()).unwrap();
        assert_eq!(c.avg_impact, (80.0 + 40.0 * 2.0) / 3.0);
        assert_eq!(c.avg_complexity, (60.0 * 2.0 + 20.0) / 3.0);
        assert!((c.avg_impact - 53.333).abs() < 1e-3);
        assert!((c.avg_complexity - 46.667).abs() < 1e-3);
    }

    #[test]
    fn plain_mean_without_special_teams() {
        let init = initiative(
            "i1",
            "Marketing",
            "Low",
            vec![vote("u1", "Ops", 10, 0), vote("u2", "Ops", 30, 100)],
        );
        let c = aggregate(&init, &roster()).unwrap();
        assert_eq!(c.avg_impact, 20.0);
        assert_eq!(c.avg_complexity, 50.0);
    }

    #[test]
    fn no_votes_means_no_position() {
        let init = initiative("i1", "Ops", "High", vec![]);
        assert_eq!(aggregate(&init, &roster()), None);
        assert!(plot(&[init], &roster()).is_empty());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let init = initiative(
            "i1",
            "Ops",
            "High",
            vec![
                vote("u1", "Ops", 33, 67),
                vote("u2", "Board", 71, 13),
                vote("u3", "Sales", 9, 99),
            ],
        );
        let a = aggregate(&init, &roster()).unwrap();
        let b = aggregate(&init, &roster()).unwrap();
        assert_eq!(a.avg_impact.to_bits(), b.avg_impact.to_bits());
        assert_eq!(a.avg_complexity.to_bits(), b.avg_complexity.to_bits());
    }

    #[test]
    fn plot_skips_unscored_and_filters() {
        let initiatives = vec![
            initiative("a", "Ops", "High", vec![vote("u1", "Ops", 90, 10)]),
            initiative("b", "Ops", "Low", vec![]),
            initiative("c", "Sales", "Low", vec![vote("u1", "Ops", 10, 90)]),
        ];
        let plotted = plot(&initiatives, &roster());
        let ids: Vec<&str> = plotted.iter().map(|p| p.initiative.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(plotted[0].quadrant(), Quadrant::QuickWins);
        assert_eq!(plotted[1].quadrant(), Quadrant::Thankless);

        assert_eq!(MatrixFilter::ALL.apply(&plotted).len(), 2);
        let by_team = MatrixFilter {
            team: Some("Sales".to_string()),
            priority: None,
        };
        assert_eq!(by_team.apply(&plotted).len(), 1);
        let by_both = MatrixFilter {
            team: Some("Sales".to_string()),
            priority: Some(Priority::High),
        };
        assert!(by_both.apply(&plotted).is_empty());
    }

    #[test]
    fn stats_count_priorities_teams_and_pending() {
        let initiatives = vec![
            initiative("a", "Ops", "Alta", vec![vote("u1", "Ops", 90, 10)]),
            initiative("b", "Ops", "Média", vec![]),
            initiative("c", "Sales", "whatever", vec![]),
        ];
        let stats = backlog_stats(&initiatives, Some("u1"));
        assert_eq!(stats.total, 3);
        assert_eq!((stats.high, stats.medium, stats.low), (1, 1, 1));
        assert_eq!(
            stats.by_team,
            vec![("Ops".to_string(), 2), ("Sales".to_string(), 1)]
        );
        assert_eq!(stats.pending_for_user, 2);
        assert_eq!(backlog_stats(&initiatives, None).pending_for_user, 0);
    }
}
