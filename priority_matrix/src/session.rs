use log::{debug, info};

use crate::aggregate::{backlog_stats, plot};
use crate::config::*;
use crate::queue::build_queue;
use crate::store::Snapshot;
use crate::votes::{cast_vote, VoteUpdate};

/// The screens a participant moves through.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum View {
    SessionEntry,
    Login,
    Dashboard,
    Voting,
    Matrix,
}

/// Everything that can change the state of a session.
#[derive(PartialEq, Debug, Clone)]
pub enum SessionEvent {
    JoinSession(String),
    Login(User),
    Navigate(View),
    SnapshotDelivered(Snapshot),
    Logout,
}

/// The state of one participant in a session.
///
/// The state only changes through `apply`. All the queries work on the last
/// delivered snapshot, which always replaces the previous one entirely.
#[derive(Debug, Clone)]
pub struct Session {
    roster: TeamRoster,
    session_id: Option<String>,
    user: Option<User>,
    view: View,
    snapshot: Snapshot,
}

impl Session {
    pub fn new(roster: TeamRoster) -> Session {
        Session {
            roster,
            session_id: None,
            user: None,
            view: View::SessionEntry,
            snapshot: Snapshot::default(),
        }
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<(), MatrixErrors> {
        debug!("session: view {:?}: applying {:?}", self.view, event);
        match event {
            SessionEvent::JoinSession(id) => {
                if id.trim().is_empty() {
                    return Err(MatrixErrors::InvalidTransition(
                        "empty session id".to_string(),
                    ));
                }
                self.session_id = Some(id.trim().to_string());
                // A new session starts from scratch.
                self.snapshot = Snapshot::default();
                self.view = if self.user.is_some() {
                    View::Dashboard
                } else {
                    View::Login
                };
            }
            SessionEvent::Login(user) => {
                if self.session_id.is_none() {
                    return Err(MatrixErrors::InvalidTransition(
                        "login before joining a session".to_string(),
                    ));
                }
                self.roster.check_team(&user.team)?;
                info!("session: {} ({}) logged in", user.name, user.team);
                self.user = Some(user);
                self.view = View::Dashboard;
            }
            SessionEvent::Navigate(view) => {
                let needs_user = matches!(view, View::Dashboard | View::Voting | View::Matrix);
                if needs_user && self.user.is_none() {
                    return Err(MatrixErrors::InvalidTransition(format!(
                        "{:?} needs a logged in user",
                        view
                    )));
                }
                if view == View::Login && self.session_id.is_none() {
                    return Err(MatrixErrors::InvalidTransition(
                        "login before joining a session".to_string(),
                    ));
                }
                self.view = view;
            }
            SessionEvent::SnapshotDelivered(snapshot) => self.receive_snapshot(snapshot),
            SessionEvent::Logout => {
                self.user = None;
                self.view = if self.session_id.is_some() {
                    View::Login
                } else {
                    View::SessionEntry
                };
            }
        }
        Ok(())
    }

    pub fn receive_snapshot(&mut self, snapshot: Snapshot) {
        debug!(
            "session: received snapshot with {} initiatives",
            snapshot.initiatives.len()
        );
        self.snapshot = snapshot;
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn roster(&self) -> &TeamRoster {
        &self.roster
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn require_user(&self) -> Result<&User, MatrixErrors> {
        self.user
            .as_ref()
            .ok_or_else(|| MatrixErrors::InvalidTransition("no logged in user".to_string()))
    }

    /// The voting queue of the logged in user.
    pub fn queue(&self) -> Result<Vec<&Initiative>, MatrixErrors> {
        let user = self.require_user()?;
        Ok(build_queue(&self.snapshot.initiatives, &user.id))
    }

    /// The initiative the logged in user should score next.
    pub fn current_item(&self) -> Result<Option<&Initiative>, MatrixErrors> {
        Ok(self.queue()?.first().copied())
    }

    /// Scores an initiative as the logged in user.
    ///
    /// The returned update must be written to the store; the session itself
    /// only changes when the store delivers the next snapshot.
    pub fn vote(
        &self,
        initiative_id: &str,
        impact: i64,
        complexity: i64,
        now: u64,
    ) -> Result<VoteUpdate, MatrixErrors> {
        let user = self.require_user()?;
        cast_vote(
            &self.snapshot.initiatives,
            initiative_id,
            user,
            impact,
            complexity,
            now,
        )
    }

    pub fn plot(&self) -> Vec<PlottedInitiative> {
        plot(&self.snapshot.initiatives, &self.roster)
    }

    pub fn stats(&self) -> BacklogStats {
        backlog_stats(
            &self.snapshot.initiatives,
            self.user.as_ref().map(|u| u.id.as_str()),
        )
    }
}
