use log::{debug, warn};

use crate::config::*;

/// The result of casting a vote: the full vote list to write back for one initiative.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteUpdate {
    pub initiative_id: InitiativeId,
    pub votes: Vec<Vote>,
}

/// Replaces the vote of a user in a list of votes.
///
/// Any previous vote of the same user is dropped, and the new vote is appended
/// at the end. The votes of the other users keep their order.
pub fn replace_vote(votes: &[Vote], vote: Vote) -> Vec<Vote> {
    let mut res: Vec<Vote> = votes
        .iter()
        .filter(|v| v.user_id() != vote.user_id())
        .cloned()
        .collect();
    res.push(vote);
    res
}

/// Computes the new vote list of an initiative after a user scored it.
///
/// Scores outside `[0, 100]` are clamped. The initiative must be part of the
/// given snapshot, otherwise `MatrixErrors::InitiativeNotFound` is returned
/// and nothing changes.
pub fn cast_vote(
    initiatives: &[Initiative],
    initiative_id: &str,
    user: &User,
    impact: i64,
    complexity: i64,
    now: u64,
) -> Result<VoteUpdate, MatrixErrors> {
    let initiative = initiatives
        .iter()
        .find(|i| i.id == initiative_id)
        .ok_or_else(|| MatrixErrors::InitiativeNotFound(initiative_id.to_string()))?;

    let vote = Vote::new(user, impact, complexity, now);
    if vote.impact() as i64 != impact || vote.complexity() as i64 != complexity {
        warn!(
            "cast_vote: initiative {}: user {}: scores ({}, {}) clamped to ({}, {})",
            initiative_id,
            user.id,
            impact,
            complexity,
            vote.impact(),
            vote.complexity()
        );
    }
    debug!(
        "cast_vote: initiative {}: user {} ({}) previous vote: {:?}",
        initiative_id,
        user.id,
        user.team,
        user_vote(initiative, &user.id)
    );

    Ok(VoteUpdate {
        initiative_id: initiative.id.clone(),
        votes: replace_vote(initiative.votes(), vote),
    })
}

/// The vote of a user on an initiative, if any.
pub fn user_vote<'a>(initiative: &'a Initiative, user_id: &str) -> Option<&'a Vote> {
    initiative.votes().iter().find(|v| v.user_id() == user_id)
}

pub fn has_voted(initiative: &Initiative, user_id: &str) -> bool {
    user_vote(initiative, user_id).is_some()
}
