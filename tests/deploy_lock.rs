// ABOUTME: Tests for the per-app deploy lock.
// ABOUTME: Uses a temporary HOME so lock files never touch real state.

use polepole::rollout::{DeployLock, LockError};
use polepole::types::AppName;

fn with_temp_home(f: impl FnOnce()) {
    let dir = tempfile::tempdir().unwrap();
    temp_env::with_var("HOME", Some(dir.path()), f);
}

#[test]
fn acquire_then_release_then_reacquire() {
    with_temp_home(|| {
        let app = AppName::new("lock-basic").unwrap();

        let lock = DeployLock::acquire(&app, false).expect("first acquire");
        lock.release().expect("release");

        let again = DeployLock::acquire(&app, false).expect("reacquire after release");
        again.release().expect("release again");
    });
}

#[test]
fn second_acquire_reports_the_holder() {
    with_temp_home(|| {
        let app = AppName::new("lock-held").unwrap();
        let _lock = DeployLock::acquire(&app, false).expect("first acquire");

        match DeployLock::acquire(&app, false) {
            Err(LockError::Held { holder, pid, .. }) => {
                assert!(!holder.is_empty());
                assert_eq!(pid, std::process::id());
            }
            other => panic!("expected Held error, got {:?}", other.map(|_| ())),
        }
    });
}

#[test]
fn locks_for_different_apps_are_independent() {
    with_temp_home(|| {
        let a = AppName::new("lock-a").unwrap();
        let b = AppName::new("lock-b").unwrap();

        let lock_a = DeployLock::acquire(&a, false).expect("lock a");
        let lock_b = DeployLock::acquire(&b, false).expect("lock b");
        lock_a.release().unwrap();
        lock_b.release().unwrap();
    });
}

#[test]
fn force_breaks_a_live_lock() {
    with_temp_home(|| {
        let app = AppName::new("lock-force").unwrap();
        let _lock = DeployLock::acquire(&app, false).expect("first acquire");

        let broken = DeployLock::acquire(&app, true).expect("force break");
        broken.release().unwrap();
    });
}

#[test]
fn corrupted_lock_file_is_broken_automatically() {
    with_temp_home(|| {
        let app = AppName::new("lock-corrupt").unwrap();
        let path = polepole::rollout::LockInfo::lock_path(&app);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json at all").unwrap();

        let lock = DeployLock::acquire(&app, false).expect("corrupted lock is broken");
        lock.release().unwrap();
    });
}

#[test]
fn with_lock_releases_even_when_work_fails() {
    with_temp_home(|| {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let app = AppName::new("lock-with").unwrap();

            let failed: Result<Result<(), &str>, _> =
                polepole::rollout::with_lock(&app, false, async { Err("boom") }).await;
            assert_eq!(failed.unwrap(), Err("boom"));

            // Lock must be free again after the failed work.
            let ok: Result<Result<(), &str>, _> =
                polepole::rollout::with_lock(&app, false, async { Ok(()) }).await;
            assert_eq!(ok.unwrap(), Ok(()));
        });
    });
}
