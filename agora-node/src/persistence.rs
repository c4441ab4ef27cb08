use std::fs;
use std::path::{Path, PathBuf};

use agora_core::Error;
use tracing::warn;

use crate::state::ReplicatedState;

const USERS_FILE: &str = "users.json";
const CHANNELS_FILE: &str = "channels.json";
const MESSAGES_FILE: &str = "messages.json";
const PUBLICATIONS_FILE: &str = "publications.json";

/// Loads and rewrites the four JSON snapshot files a node persists to on
/// every mutation. Each collection is independent, so a missing file is
/// treated as an empty collection rather than an error.
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn load(&self) -> Result<ReplicatedState, Error> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(ReplicatedState {
            users: read_json_or_default(&self.path(USERS_FILE))?,
            channels: read_json_or_default(&self.path(CHANNELS_FILE))?,
            messages: read_json_or_default(&self.path(MESSAGES_FILE))?,
            publications: read_json_or_default(&self.path(PUBLICATIONS_FILE))?,
        })
    }

    /// Rewrite all four files in full: every mutation is followed by a
    /// complete re-serialization of the collection it touched, rather than
    /// an incremental append.
    pub fn save(&self, state: &ReplicatedState) -> Result<(), Error> {
        fs::create_dir_all(&self.data_dir)?;
        write_json(&self.path(USERS_FILE), &state.users)?;
        write_json(&self.path(CHANNELS_FILE), &state.channels)?;
        write_json(&self.path(MESSAGES_FILE), &state.messages)?;
        write_json(&self.path(PUBLICATIONS_FILE), &state.publications)?;
        Ok(())
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

/// Missing or malformed snapshot files both initialize to an empty
/// collection rather than failing node startup; a malformed file is
/// logged so the operator can investigate, but persistence failures never
/// block in-memory operation.
fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, Error> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed snapshot file, starting from empty state");
                Ok(T::default())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| Error::persistence(e))?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Channel;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let mut state = ReplicatedState::new();
        state.add_user("alice".to_string());
        state.add_channel(Channel {
            name: "general".to_string(),
            creator: "alice".to_string(),
            timestamp: 1.0,
            logical_clock: 2,
            subscribers: vec!["alice".to_string()],
        });

        store.save(&state).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.users, state.users);
        assert_eq!(loaded.channels, state.channels);
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let state = store.load().unwrap();
        assert!(state.users.is_empty());
        assert!(state.channels.is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(USERS_FILE), b"{ not json").unwrap();
        let store = Store::new(dir.path());
        let state = store.load().unwrap();
        assert!(state.users.is_empty());
    }
}
