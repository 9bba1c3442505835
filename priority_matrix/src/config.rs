// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

pub use crate::priority::Priority;

/// Identifier of an initiative, assigned by the store.
pub type InitiativeId = String;

/// The fields of an initiative as read from an ingestion file.
///
/// This is what the parser produces: no identifier and no votes yet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InitiativeFields {
    pub team: String,
    pub metric: String,
    pub objective: String,
    pub key_result: String,
    pub priority: Priority,
    pub name: String,
    /// Currently a copy of the name column.
    pub description: Option<String>,
}

/// A participant of a session, as provided by the identity layer.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct User {
    pub id: String,
    pub name: String,
    pub team: String,
}

impl User {
    pub fn new(id: &str, name: &str, team: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            team: team.to_string(),
        }
    }
}

/// The score given by one user to one initiative.
///
/// Both scores are clamped to `[0, 100]` when the vote is created, and a vote
/// never changes afterwards. Editing a vote means replacing it.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Vote {
    user_id: String,
    user_name: String,
    user_team: String,
    impact: u8,
    complexity: u8,
    timestamp: u64,
}

impl Vote {
    pub const MAX_SCORE: u8 = 100;

    /// Creates a vote for the given user.
    ///
    /// `timestamp` is the creation instant in milliseconds since the Unix epoch.
    pub fn new(user: &User, impact: i64, complexity: i64, timestamp: u64) -> Vote {
        Vote::from_parts(
            &user.id,
            &user.name,
            &user.team,
            impact,
            complexity,
            timestamp,
        )
    }

    pub fn from_parts(
        user_id: &str,
        user_name: &str,
        user_team: &str,
        impact: i64,
        complexity: i64,
        timestamp: u64,
    ) -> Vote {
        Vote {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            user_team: user_team.to_string(),
            impact: clamp_score(impact),
            complexity: clamp_score(complexity),
            timestamp,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn user_team(&self) -> &str {
        &self.user_team
    }

    pub fn impact(&self) -> u8 {
        self.impact
    }

    pub fn complexity(&self) -> u8 {
        self.complexity
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

pub(crate) fn clamp_score(score: i64) -> u8 {
    score.clamp(0, Vote::MAX_SCORE as i64) as u8
}

/// An initiative of the backlog, with the votes it received so far.
///
/// Invariant: there is at most one vote per user id, kept in arrival order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Initiative {
    pub id: InitiativeId,
    pub team: String,
    pub metric: String,
    pub objective: String,
    pub key_result: String,
    pub priority: Priority,
    pub name: String,
    pub description: Option<String>,
    votes: Vec<Vote>,
}

impl Initiative {
    /// A freshly ingested initiative, without any vote.
    pub fn new(id: &str, fields: InitiativeFields) -> Initiative {
        Initiative {
            id: id.to_string(),
            team: fields.team,
            metric: fields.metric,
            objective: fields.objective,
            key_result: fields.key_result,
            priority: fields.priority,
            name: fields.name,
            description: fields.description,
            votes: Vec::new(),
        }
    }

    /// Rebuilds an initiative from stored votes.
    ///
    /// Votes are replayed in order, so that a duplicated user keeps only its last vote.
    pub fn with_votes(id: &str, fields: InitiativeFields, votes: Vec<Vote>) -> Initiative {
        let mut res = Initiative::new(id, fields);
        res.set_votes(votes);
        res
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// Replaces the votes. Later votes of a user replace the earlier ones.
    pub(crate) fn set_votes(&mut self, votes: Vec<Vote>) {
        self.votes.clear();
        for v in votes {
            self.votes = crate::votes::replace_vote(&self.votes, v);
        }
    }

    pub fn fields(&self) -> InitiativeFields {
        InitiativeFields {
            team: self.team.clone(),
            metric: self.metric.clone(),
            objective: self.objective.clone(),
            key_result: self.key_result.clone(),
            priority: self.priority,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

// ******** Output data structures *********

/// The weighted position of an initiative in the matrix.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Coordinates {
    pub avg_impact: f64,
    pub avg_complexity: f64,
}

/// The four regions of the matrix, split at the middle of each axis.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Quadrant {
    /// High impact, low complexity.
    QuickWins,
    /// High impact, high complexity.
    BigProjects,
    /// Low impact, low complexity.
    FillIns,
    /// Low impact, high complexity.
    Thankless,
}

impl Quadrant {
    pub const MIDPOINT: f64 = 50.0;

    pub fn of(coordinates: &Coordinates) -> Quadrant {
        let high_impact = coordinates.avg_impact >= Quadrant::MIDPOINT;
        let high_complexity = coordinates.avg_complexity >= Quadrant::MIDPOINT;
        match (high_impact, high_complexity) {
            (true, false) => Quadrant::QuickWins,
            (true, true) => Quadrant::BigProjects,
            (false, false) => Quadrant::FillIns,
            (false, true) => Quadrant::Thankless,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::QuickWins => "Quick Wins",
            Quadrant::BigProjects => "Big Projects",
            Quadrant::FillIns => "Fill-ins",
            Quadrant::Thankless => "Thankless",
        }
    }
}

/// An initiative that received at least one vote, with its position.
#[derive(PartialEq, Debug, Clone)]
pub struct PlottedInitiative {
    pub initiative: Initiative,
    pub coordinates: Coordinates,
}

impl PlottedInitiative {
    pub fn quadrant(&self) -> Quadrant {
        Quadrant::of(&self.coordinates)
    }
}

/// Summary counts of a backlog, as shown on the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BacklogStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Number of initiatives per owning team, sorted by team name.
    pub by_team: Vec<(String, usize)>,
    /// Initiatives the user has not scored yet. Zero when no user was given.
    pub pending_for_user: usize,
}

/// Errors that prevent an operation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MatrixErrors {
    /// The ingested content has no header or no data row.
    EmptyBacklog,
    /// The initiative is not part of the current snapshot.
    InitiativeNotFound(InitiativeId),
    /// The team is not part of the configured roster.
    UnknownTeam(String),
    /// A roster needs at least one team, the last one being the oversight team.
    EmptyRoster,
    /// The requested view needs a logged in user or a joined session.
    InvalidTransition(String),
}

impl Error for MatrixErrors {}

impl Display for MatrixErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixErrors::EmptyBacklog => {
                write!(f, "the file looks empty or has no header row")
            }
            MatrixErrors::InitiativeNotFound(id) => write!(f, "initiative {} not found", id),
            MatrixErrors::UnknownTeam(team) => write!(f, "unknown team {:?}", team),
            MatrixErrors::EmptyRoster => write!(f, "the team roster is empty"),
            MatrixErrors::InvalidTransition(msg) => write!(f, "invalid transition: {}", msg),
        }
    }
}

// ********* Configuration **********

/// The fixed list of teams a user can belong to.
///
/// The last team of the list is the oversight team: its impact scores weigh
/// double in the aggregation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TeamRoster {
    teams: Vec<String>,
}

impl TeamRoster {
    pub const DEFAULT_TEAMS: [&'static str; 5] =
        ["OPS", "Product Marketing", "Produtos", "BizDev", "Diretoria"];

    pub fn new(teams: &[String]) -> Result<TeamRoster, MatrixErrors> {
        if teams.is_empty() {
            return Err(MatrixErrors::EmptyRoster);
        }
        Ok(TeamRoster {
            teams: teams.to_vec(),
        })
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn oversight_team(&self) -> &str {
        // Never empty at construction.
        self.teams.last().map(|s| s.as_str()).unwrap_or_default()
    }

    pub fn contains(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }

    pub fn check_team(&self, team: &str) -> Result<(), MatrixErrors> {
        if self.contains(team) {
            Ok(())
        } else {
            Err(MatrixErrors::UnknownTeam(team.to_string()))
        }
    }
}

impl Default for TeamRoster {
    fn default() -> Self {
        TeamRoster {
            teams: TeamRoster::DEFAULT_TEAMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
