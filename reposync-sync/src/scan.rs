//! Diff scanning: compare the tracked snapshot with each target repository.
//!
//! Every (repository, path) pair is fetched from the default branch and
//! compared byte for byte. Identical paths never enter the [`Changeset`];
//! repositories with nothing different are left out entirely.
//!
//! Fetch results are handled per variant:
//!
//! | outcome     | treatment                                       |
//! |-------------|-------------------------------------------------|
//! | `Found`     | compared with the tracked bytes                 |
//! | `NotFound`  | remote is absent; always differs                |
//! | `Failed`    | `on_error: skip` drops the path for this run;   |
//! |             | `on_error: absent` treats it as `NotFound`      |
//!
//! Scanning is read-only, so repositories are fetched by up to
//! `concurrency` worker threads. Results are reassembled in input order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use tracing::{debug, info, warn};

use reposync_core::{
    Changeset, FetchErrorPolicy, FetchOutcome, Platform, RemoteFile, RepoName, ScanConfig,
    TrackedFiles,
};

type RepoFiles = BTreeMap<String, RemoteFile>;

pub struct Scanner<'a> {
    platform: &'a dyn Platform,
    owner: &'a str,
    policy: FetchErrorPolicy,
    concurrency: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(platform: &'a dyn Platform, owner: &'a str, config: &ScanConfig) -> Self {
        Self {
            platform,
            owner,
            policy: config.on_error,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Build the changeset for `repos` against `tracked`.
    pub fn scan(&self, repos: &[RepoName], tracked: &TrackedFiles) -> Changeset {
        let results: Vec<RepoFiles> = if self.concurrency == 1 || repos.len() <= 1 {
            repos
                .iter()
                .map(|repo| self.scan_repository(repo, tracked))
                .collect()
        } else {
            self.scan_parallel(repos, tracked)
        };

        let mut changeset = Changeset::new();
        for (repo, files) in repos.iter().zip(results) {
            let count = files.len();
            if changeset.insert(repo.clone(), files) {
                info!("{repo}: {count} files out of date");
            } else {
                debug!("{repo}: up to date");
            }
        }
        changeset
    }

    fn scan_parallel(&self, repos: &[RepoName], tracked: &TrackedFiles) -> Vec<RepoFiles> {
        let next = AtomicUsize::new(0);
        let slots: Vec<Mutex<Option<RepoFiles>>> = repos.iter().map(|_| Mutex::new(None)).collect();
        let workers = self.concurrency.min(repos.len());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(repo) = repos.get(index) else {
                        break;
                    };
                    let files = self.scan_repository(repo, tracked);
                    if let Ok(mut slot) = slots[index].lock() {
                        *slot = Some(files);
                    }
                });
            }
        });

        slots
            .into_iter()
            .map(|slot| slot.into_inner().ok().flatten().unwrap_or_default())
            .collect()
    }

    /// Differing paths of one repository.
    fn scan_repository(&self, repo: &RepoName, tracked: &TrackedFiles) -> RepoFiles {
        let mut files = RepoFiles::new();
        for (path, local) in tracked.iter() {
            let remote = match self.platform.fetch_file(self.owner, repo.as_str(), path) {
                FetchOutcome::Found { content, .. } => RemoteFile::Present(content),
                FetchOutcome::NotFound => RemoteFile::Absent,
                FetchOutcome::Failed(detail) => match self.policy {
                    FetchErrorPolicy::Skip => {
                        warn!("{repo}:{path} remote lookup failed, skipping: {detail}");
                        continue;
                    }
                    FetchErrorPolicy::Absent => {
                        warn!("{repo}:{path} remote lookup failed, treating as absent: {detail}");
                        RemoteFile::Absent
                    }
                },
            };

            // An absent remote always differs, even from an empty tracked file.
            if matches!(&remote, RemoteFile::Present(bytes) if bytes.as_slice() == local) {
                debug!("{repo}:{path} is up to date");
                continue;
            }
            files.insert(path.to_string(), remote);
        }
        files
    }
}
