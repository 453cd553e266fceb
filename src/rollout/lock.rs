// ABOUTME: Deploy lock to prevent concurrent rollouts of the same app.
// ABOUTME: Atomic lock-file creation with holder info under the state directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::types::AppName;

/// Base directory for polepole state files (XDG Base Directory compliant).
const STATE_DIR: &str = ".local/state/polepole";

/// Locks older than this are considered abandoned and broken automatically.
const STALE_AFTER_HOURS: i64 = 1;

/// Errors from lock acquisition and release.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("rollout already in progress: held by {holder} (pid {pid}) since {started_at}")]
    Held {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[error("lock bookkeeping failed: {0}")]
    Bookkeeping(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// App being rolled out.
    pub app: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(app: &AppName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            app: app.to_string(),
        }
    }

    /// Whether this lock is old enough to break automatically.
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= STALE_AFTER_HOURS
    }

    /// Path to the lock file for an app.
    pub fn lock_path(app: &AppName) -> PathBuf {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        base.join(STATE_DIR).join(format!("{}.lock", app))
    }
}

/// A held deploy lock. Released explicitly; `with_lock` guarantees release.
pub struct DeployLock {
    path: PathBuf,
    app: AppName,
}

impl std::fmt::Debug for DeployLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployLock").field("app", &self.app).finish()
    }
}

impl DeployLock {
    /// Acquire the deploy lock for an app.
    ///
    /// Uses atomic create-new semantics, so there is no check-then-create
    /// race. Stale and corrupted locks are broken automatically; `force`
    /// breaks a live lock.
    pub fn acquire(app: &AppName, force: bool) -> Result<Self, LockError> {
        let path = LockInfo::lock_path(app);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match Self::try_create(&path, app) {
            Ok(lock) => return Ok(lock),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err.into()),
        }

        if !Self::should_break(&path, force)? {
            // Active lock held elsewhere; report the holder when readable.
            if let Ok(raw) = std::fs::read_to_string(&path)
                && let Ok(existing) = serde_json::from_str::<LockInfo>(&raw)
            {
                return Err(LockError::Held {
                    holder: existing.holder,
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            return Err(LockError::Bookkeeping(
                "lock held by another process".to_string(),
            ));
        }

        tracing::debug!(path = %path.display(), "removing stale or forced lock");
        let _ = std::fs::remove_file(&path);

        Self::try_create(&path, app).map_err(|err| {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                LockError::Bookkeeping("lock re-acquired by another process".to_string())
            } else {
                err.into()
            }
        })
    }

    fn try_create(path: &PathBuf, app: &AppName) -> Result<DeployLock, std::io::Error> {
        let info = LockInfo::new(app);
        let json = serde_json::to_string(&info)
            .map_err(|e| std::io::Error::other(format!("serializing lock info: {}", e)))?;

        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(json.as_bytes())?;

        Ok(DeployLock {
            path: path.clone(),
            app: app.clone(),
        })
    }

    /// Whether an existing lock should be broken (stale, forced, corrupted).
    fn should_break(path: &PathBuf, force: bool) -> Result<bool, LockError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                tracing::warn!("lock info unreadable, breaking lock");
                return Ok(true);
            }
        };

        match serde_json::from_str::<LockInfo>(&raw) {
            Ok(existing) => {
                if force {
                    tracing::warn!(
                        holder = %existing.holder,
                        pid = existing.pid,
                        "breaking lock on request"
                    );
                    Ok(true)
                } else if existing.is_stale() {
                    tracing::warn!(
                        holder = %existing.holder,
                        pid = existing.pid,
                        since = %existing.started_at,
                        "auto-breaking stale lock"
                    );
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Err(_) => {
                tracing::warn!("lock info corrupted, breaking lock");
                Ok(true)
            }
        }
    }

    /// Release the lock.
    pub fn release(self) -> Result<(), LockError> {
        std::fs::remove_file(&self.path)?;
        Ok(())
    }
}

/// Run `work` while holding the app's deploy lock, releasing it afterwards
/// even when the work fails.
pub async fn with_lock<T, E, Fut>(
    app: &AppName,
    force: bool,
    work: Fut,
) -> Result<Result<T, E>, LockError>
where
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let lock = DeployLock::acquire(app, force)?;
    let result = work.await;
    if let Err(err) = lock.release() {
        tracing::warn!(app = %app, %err, "failed to release deploy lock");
    }
    Ok(result)
}
