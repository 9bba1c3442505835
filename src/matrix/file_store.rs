// A store persisted as a JSON file.

use crate::matrix::config_reader::*;
use crate::matrix::*;

/// Keeps the initiatives of a session in a JSON file.
///
/// Every write goes to disk first. Subscribers are only notified once the
/// file has been written.
pub struct FileStore {
    path: String,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens the session file at `path`. A missing file is an empty session.
    ///
    /// When `session_id` is given, it must match the session of an existing file.
    pub fn open(path: &str, session_id: Option<&str>) -> MatrixResult<FileStore> {
        if !Path::new(path).exists() {
            let sid = session_id.unwrap_or(DEFAULT_SESSION_ID);
            info!("Session file {:?} not found, starting session {}", path, sid);
            return Ok(FileStore {
                path: path.to_string(),
                inner: MemoryStore::new(sid),
            });
        }

        info!("Attempting to read session file {:?}", path);
        let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
        let stored: StoredSession =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        if let Some(sid) = session_id {
            if sid != stored.session_id {
                whatever!(
                    "The file {} holds session {:?}, not {:?}",
                    path,
                    stored.session_id,
                    sid
                )
            }
        }
        let initiatives: Vec<Initiative> = stored
            .initiatives
            .iter()
            .map(|si| si.to_initiative())
            .collect();
        debug!(
            "Read {} initiatives for session {}",
            initiatives.len(),
            stored.session_id
        );
        Ok(FileStore {
            path: path.to_string(),
            inner: MemoryStore::from_initiatives(&stored.session_id, initiatives),
        })
    }

    pub fn session_id(&self) -> &str {
        self.inner.session_id()
    }

    fn save(&self, initiatives: &[Initiative]) -> MatrixResult<()> {
        let stored = StoredSession {
            session_id: self.session_id().to_string(),
            initiatives: initiatives.iter().map(StoredInitiative::from).collect(),
        };
        let js = serde_json::to_string_pretty(&stored).context(ParsingJsonSnafu {})?;
        fs::write(&self.path, js).context(WritingFileSnafu {
            path: self.path.clone(),
        })?;
        debug!("Wrote {} initiatives to {:?}", initiatives.len(), self.path);
        Ok(())
    }
}

impl InitiativeStore for FileStore {
    type Error = MatrixCliError;

    fn replace_all(&mut self, records: Vec<InitiativeFields>) -> MatrixResult<Vec<InitiativeId>> {
        let initiatives = assign_ids(self.session_id(), records);
        self.save(&initiatives)?;
        let ids: Vec<InitiativeId> = initiatives.iter().map(|i| i.id.clone()).collect();
        self.inner.reset(initiatives);
        Ok(ids)
    }

    fn snapshot(&self) -> Snapshot {
        self.inner.snapshot()
    }

    fn update_votes(&mut self, id: &str, votes: Vec<Vote>) -> MatrixResult<()> {
        let mut snapshot = self.inner.snapshot();
        let initiative = snapshot
            .initiatives
            .iter_mut()
            .find(|i| i.id == id)
            .context(NotFoundSnafu { id })?;
        *initiative = Initiative::with_votes(id, initiative.fields(), votes);
        let votes = initiative.votes().to_vec();
        self.save(&snapshot.initiatives)?;
        self.inner.update_votes(id, votes).context(MatrixSnafu {})
    }

    fn subscribe(&mut self, handler: SnapshotHandler) -> Subscription {
        self.inner.subscribe(handler)
    }
}
