//! Authorization store: the persisted allow-list plus the fixed super-admin set.

use std::{
    collections::{BTreeSet, HashSet},
    path::{Path, PathBuf},
};

use tokio::sync::RwLock;

use crate::{domain::UserId, errors::Error, Result};

#[derive(Debug)]
pub struct AccessStore {
    path: PathBuf,
    super_admins: HashSet<UserId>,
    allowed: RwLock<BTreeSet<u64>>,
}

impl AccessStore {
    /// Load the allow-list from `path`.
    ///
    /// A missing file is created as `[]`. Unreadable or malformed content yields an
    /// empty list and leaves the file untouched until the next successful mutation.
    pub async fn load(
        path: impl Into<PathBuf>,
        super_admins: impl IntoIterator<Item = UserId>,
    ) -> Result<Self> {
        let path = path.into();

        let allowed = match tokio::fs::read_to_string(&path).await {
            Ok(txt) => match serde_json::from_str::<BTreeSet<u64>>(&txt) {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "malformed allow-list, starting empty");
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = BTreeSet::new();
                write_snapshot(&path, &empty).await?;
                tracing::info!(path = %path.display(), "created empty allow-list");
                empty
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable allow-list, starting empty");
                BTreeSet::new()
            }
        };

        Ok(Self {
            path,
            super_admins: super_admins.into_iter().collect(),
            allowed: RwLock::new(allowed),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_super_admin(&self, id: UserId) -> bool {
        self.super_admins.contains(&id)
    }

    pub async fn is_authorized(&self, id: UserId) -> bool {
        self.is_super_admin(id) || self.allowed.read().await.contains(&id.0)
    }

    /// Allowed users in ascending order (super-admins are not listed).
    pub async fn list(&self) -> Vec<UserId> {
        self.allowed.read().await.iter().copied().map(UserId).collect()
    }

    pub async fn add(&self, id: UserId) -> Result<()> {
        self.mutate(|set| {
            set.insert(id.0);
        })
        .await
    }

    pub async fn remove(&self, id: UserId) -> Result<()> {
        self.mutate(|set| {
            set.remove(&id.0);
        })
        .await
    }

    /// Apply `f` to a copy of the set, persist it, then install it.
    ///
    /// The write guard is held for the whole sequence so mutations never interleave,
    /// and a failed write leaves the in-memory set as it was.
    async fn mutate(&self, f: impl FnOnce(&mut BTreeSet<u64>)) -> Result<()> {
        let mut guard = self.allowed.write().await;
        let mut next = guard.clone();
        f(&mut next);
        write_snapshot(&self.path, &next).await?;
        *guard = next;
        Ok(())
    }
}

async fn write_snapshot(path: &Path, set: &BTreeSet<u64>) -> Result<()> {
    let persist_err = |e: std::io::Error| Error::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let txt = serde_json::to_string(set)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, txt).await.map_err(persist_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(persist_err)?;
    Ok(())
}
