//! Dashboard counters kept on the visitor's machine. They are never sent to
//! the relay.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Visitor,
    Hire,
    Message,
}

pub trait LocalStore: Send + Sync + 'static {
    fn get(&self, counter: Counter) -> anyhow::Result<u64>;

    /// Increment the counter and return the new value.
    fn increment(&self, counter: Counter) -> anyhow::Result<u64>;

    fn contains(&self, state: &str) -> anyhow::Result<bool>;

    /// Add a state to the set of visited states. Returns `false` if it was
    /// already known.
    fn insert_state(&self, state: &str) -> anyhow::Result<bool>;

    /// The visited states in the order they were first seen.
    fn states(&self) -> anyhow::Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub visitors: u64,
    pub hires: u64,
    pub messages: u64,
    pub states: usize,
}

pub fn stats(store: &impl LocalStore) -> anyhow::Result<Stats> {
    Ok(Stats {
        visitors: store.get(Counter::Visitor)?,
        hires: store.get(Counter::Hire)?,
        messages: store.get(Counter::Message)?,
        states: store.states()?.len(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct Snapshot {
    visitor_count: u64,
    hire_count: u64,
    message_count: u64,
    visited_states: Vec<String>,
}

impl Snapshot {
    fn counter(&mut self, counter: Counter) -> &mut u64 {
        match counter {
            Counter::Visitor => &mut self.visitor_count,
            Counter::Hire => &mut self.hire_count,
            Counter::Message => &mut self.message_count,
        }
    }

    fn increment(&mut self, counter: Counter) -> u64 {
        let value = self.counter(counter);
        *value = value.saturating_add(1);
        *value
    }

    fn contains(&self, state: &str) -> bool {
        self.visited_states.iter().any(|x| x == state)
    }

    fn insert_state(&mut self, state: &str) -> bool {
        if self.contains(state) {
            return false;
        }
        self.visited_states.push(state.into());
        true
    }
}

fn lock(snapshot: &Mutex<Snapshot>) -> anyhow::Result<MutexGuard<'_, Snapshot>> {
    snapshot
        .lock()
        .map_err(|_| anyhow!("local store lock is poisoned"))
}

/// Keeps the counters for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<Snapshot>);

impl LocalStore for MemoryStore {
    fn get(&self, counter: Counter) -> anyhow::Result<u64> {
        Ok(*lock(&self.0)?.counter(counter))
    }

    fn increment(&self, counter: Counter) -> anyhow::Result<u64> {
        Ok(lock(&self.0)?.increment(counter))
    }

    fn contains(&self, state: &str) -> anyhow::Result<bool> {
        Ok(lock(&self.0)?.contains(state))
    }

    fn insert_state(&self, state: &str) -> anyhow::Result<bool> {
        Ok(lock(&self.0)?.insert_state(state))
    }

    fn states(&self) -> anyhow::Result<Vec<String>> {
        Ok(lock(&self.0)?.visited_states.clone())
    }
}

/// Persists the counters as JSON. The file is rewritten after every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is treated as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let snapshot = match std::fs::read(&path) {
            Ok(content) => serde_json::from_slice(&content)
                .with_context(|| format!("Invalid local store at {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read local store at {}", path.display()))
            }
        };

        Ok(Self {
            path,
            snapshot: snapshot.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<T>(&self, f: impl FnOnce(&mut Snapshot) -> T) -> anyhow::Result<T> {
        let mut snapshot = lock(&self.snapshot)?;
        let mut next = snapshot.clone();
        let out = f(&mut next);
        let content = serde_json::to_vec_pretty(&next)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write local store at {}", self.path.display()))?;
        *snapshot = next;
        Ok(out)
    }
}

impl LocalStore for FileStore {
    fn get(&self, counter: Counter) -> anyhow::Result<u64> {
        Ok(*lock(&self.snapshot)?.counter(counter))
    }

    fn increment(&self, counter: Counter) -> anyhow::Result<u64> {
        self.update(|snapshot| snapshot.increment(counter))
    }

    fn contains(&self, state: &str) -> anyhow::Result<bool> {
        Ok(lock(&self.snapshot)?.contains(state))
    }

    fn insert_state(&self, state: &str) -> anyhow::Result<bool> {
        self.update(|snapshot| snapshot.insert_state(state))
    }

    fn states(&self) -> anyhow::Result<Vec<String>> {
        Ok(lock(&self.snapshot)?.visited_states.clone())
    }
}
