use crate::matrix::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PriorizaConfig {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    /// The last team is the oversight team.
    pub teams: Option<Vec<String>>,
}

impl PriorizaConfig {
    pub fn roster(&self) -> MatrixResult<TeamRoster> {
        match &self.teams {
            Some(teams) => TeamRoster::new(teams).context(MatrixSnafu {}),
            None => Ok(TeamRoster::default()),
        }
    }
}

pub fn read_config(path: &str) -> MatrixResult<PriorizaConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: PriorizaConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

// ******** Session file *********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StoredVote {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userTeam")]
    pub user_team: String,
    pub impact: i64,
    pub complexity: i64,
    pub timestamp: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StoredInitiative {
    pub id: String,
    pub team: String,
    pub metric: String,
    pub objective: String,
    #[serde(rename = "keyResult")]
    pub key_result: String,
    /// Any accepted label, in English or in Portuguese.
    pub priority: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub votes: Vec<StoredVote>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub initiatives: Vec<StoredInitiative>,
}

impl From<&Vote> for StoredVote {
    fn from(v: &Vote) -> Self {
        StoredVote {
            user_id: v.user_id().to_string(),
            user_name: v.user_name().to_string(),
            user_team: v.user_team().to_string(),
            impact: v.impact() as i64,
            complexity: v.complexity() as i64,
            timestamp: v.timestamp(),
        }
    }
}

impl From<&Initiative> for StoredInitiative {
    fn from(i: &Initiative) -> Self {
        StoredInitiative {
            id: i.id.clone(),
            team: i.team.clone(),
            metric: i.metric.clone(),
            objective: i.objective.clone(),
            key_result: i.key_result.clone(),
            priority: i.priority.label().to_string(),
            name: i.name.clone(),
            description: i.description.clone(),
            votes: i.votes().iter().map(StoredVote::from).collect(),
        }
    }
}

impl StoredInitiative {
    pub fn to_initiative(&self) -> Initiative {
        let fields = InitiativeFields {
            team: self.team.clone(),
            metric: self.metric.clone(),
            objective: self.objective.clone(),
            key_result: self.key_result.clone(),
            priority: Priority::normalize(&self.priority),
            name: self.name.clone(),
            description: self.description.clone(),
        };
        let votes: Vec<Vote> = self
            .votes
            .iter()
            .map(|v| {
                Vote::from_parts(
                    &v.user_id,
                    &v.user_name,
                    &v.user_team,
                    v.impact,
                    v.complexity,
                    v.timestamp,
                )
            })
            .collect();
        let res = Initiative::with_votes(&self.id, fields, votes);
        if res.votes().len() != self.votes.len() {
            warn!(
                "initiative {}: dropped duplicate votes from the session file",
                self.id
            );
        }
        res
    }
}

pub fn read_summary(path: &str) -> MatrixResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
