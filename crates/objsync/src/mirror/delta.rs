//! Source walk merged against every target cursor

use std::collections::VecDeque;
use std::iter;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::oracle::TargetCursor;
use crate::entry::Entry;
use crate::error::{PlanError, Result};
use crate::listing::Listing;
use crate::location::{ObjectUrl, basename, is_recursive, join_path, strip_recursive};
use crate::plan::check_mirror_syntax;
use crate::storage::{EntryIter, Storage};

/// One source object and the target locations still missing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorInstruction {
    /// Source object as listed
    pub source: Entry,
    /// Full target object locations that need this object
    pub targets: Vec<ObjectUrl>,
}

/// Plan a mirror of `source` into every one of `targets`
///
/// `source` ending in a separator mirrors the directory's contents; without
/// one (including `dir/...`) the directory itself is recreated under each
/// target. Argument problems become the only item of the plan.
pub fn mirror(
    storage: Arc<dyn Storage>,
    source: &str,
    targets: &[String],
    force: bool,
) -> MirrorPlan {
    if let Err(e) = check_mirror_syntax(&*storage, source, targets) {
        return MirrorPlan::failed(e);
    }
    match MirrorPlan::start(storage, source, targets, force) {
        Ok(plan) => plan,
        Err(e) => MirrorPlan::failed(e),
    }
}

/// Lazy stream of mirror instructions
///
/// Errors hit while evaluating a source object come out before that
/// object's instruction. Objects already present everywhere produce nothing.
pub struct MirrorPlan {
    walk: Option<SourceWalk>,
    cursors: Vec<TargetCursor>,
    pending: VecDeque<Result<MirrorInstruction>>,
}

struct SourceWalk {
    listing: Listing,
    prefix: String,
    base_dir: Option<String>,
    separator: char,
}

impl MirrorPlan {
    /// A plan whose only item is `error`
    pub fn failed(error: PlanError) -> Self {
        Self {
            walk: None,
            cursors: Vec::new(),
            pending: VecDeque::from([Err(error)]),
        }
    }

    fn start(
        storage: Arc<dyn Storage>,
        source: &str,
        targets: &[String],
        force: bool,
    ) -> Result<Self> {
        let stripped = strip_recursive(source);
        let source_url = ObjectUrl::parse(&stripped)?;
        let separator = source_url.separator();
        let base_dir = if is_recursive(source) || !stripped.ends_with(['/', separator]) {
            Some(basename(&stripped, separator).to_string())
                .filter(|name| !matches!(name.as_str(), "" | "." | ".."))
        } else {
            None
        };

        let mut cursors = Vec::with_capacity(targets.len());
        for target in targets {
            let root = ObjectUrl::parse(target)?.with_trailing_separator();
            let stream: EntryIter = match storage.stat(&root) {
                Err(e) if e.is_not_found() => {
                    debug!(target = %root, "target does not exist yet");
                    Box::new(iter::empty())
                }
                _ => Box::new(Listing::spawn(Arc::clone(&storage), root.clone(), true)),
            };
            cursors.push(TargetCursor::new(root, stream, force));
        }

        let source_url = source_url.with_trailing_separator();
        debug!(
            source = %source_url,
            base_dir = base_dir.as_deref().unwrap_or(""),
            targets = cursors.len(),
            force,
            "starting mirror"
        );
        Ok(Self {
            walk: Some(SourceWalk {
                prefix: source_url.to_string(),
                listing: Listing::spawn(storage, source_url, true),
                base_dir,
                separator,
            }),
            cursors,
            pending: VecDeque::new(),
        })
    }
}

impl SourceWalk {
    fn suffix_of(&self, entry: &Entry) -> Result<String> {
        let suffix = entry
            .path
            .strip_prefix(&self.prefix)
            .ok_or_else(|| PlanError::InvalidSource(entry.path.clone()))?;
        Ok(match &self.base_dir {
            Some(base) => join_path(base, suffix, self.separator),
            None => suffix.to_string(),
        })
    }
}

/// Ask every target about `entry`, queueing errors then the instruction
fn evaluate(
    walk: &SourceWalk,
    cursors: &mut [TargetCursor],
    entry: Entry,
    pending: &mut VecDeque<Result<MirrorInstruction>>,
) {
    let suffix = match walk.suffix_of(&entry) {
        Ok(suffix) => suffix,
        Err(e) => {
            pending.push_back(Err(e));
            return;
        }
    };

    let mut targets = Vec::new();
    for cursor in cursors.iter_mut() {
        match cursor.is_available(&suffix, entry.kind, entry.size) {
            Ok(true) => trace!(suffix, target = %cursor.root(), "already mirrored"),
            Ok(false) => targets.push(cursor.root().join(&suffix)),
            Err(e) => pending.push_back(Err(e)),
        }
    }

    if !targets.is_empty() {
        pending.push_back(Ok(MirrorInstruction {
            source: entry,
            targets,
        }));
    }
}

impl Iterator for MirrorPlan {
    type Item = Result<MirrorInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }

            let walk = self.walk.as_mut()?;
            match walk.listing.next() {
                None => {
                    self.walk = None;
                    return None;
                }
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(entry)) if !entry.kind.is_file() => {
                    if !entry.kind.is_dir() {
                        warn!(path = %entry.path, "skipping special file");
                    }
                }
                Some(Ok(entry)) => evaluate(walk, &mut self.cursors, entry, &mut self.pending),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalFs, MemoryStore, Router};
    use crate::transfer::TransferExecutor;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn path_of(tmp: &TempDir, rel: &str) -> String {
        tmp.path().join(rel).to_str().unwrap().to_string()
    }

    fn local() -> Arc<dyn Storage> {
        Arc::new(LocalFs::new())
    }

    fn pairs(plan: MirrorPlan) -> Vec<(String, Vec<String>)> {
        plan.map(|item| {
            let instruction = item.unwrap();
            let targets = instruction.targets.iter().map(ToString::to_string).collect();
            (instruction.source.path, targets)
        })
        .collect()
    }

    /// Copy every planned object the way a transfer would
    fn apply(plan: MirrorPlan) {
        for instruction in plan {
            let instruction = instruction.unwrap();
            for target in &instruction.targets {
                let path = target.as_path();
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::copy(&instruction.source.path, path).unwrap();
            }
        }
    }

    fn seeded() -> TempDir {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "src/a.txt", "aaaaa");
        create_test_file(tmp.path(), "src/sub/b.txt", "bbb");
        fs::create_dir(tmp.path().join("out")).unwrap();
        tmp
    }

    #[test]
    fn test_mirror_into_empty_target() {
        let tmp = seeded();
        let source = format!("{}/", path_of(&tmp, "src"));
        let targets = vec![path_of(&tmp, "out")];

        let plan = mirror(local(), &source, &targets, false);

        assert_eq!(
            pairs(plan),
            vec![
                (path_of(&tmp, "src/a.txt"), vec![path_of(&tmp, "out/a.txt")]),
                (
                    path_of(&tmp, "src/sub/b.txt"),
                    vec![path_of(&tmp, "out/sub/b.txt")]
                ),
            ]
        );
    }

    #[test]
    fn test_second_run_is_empty() {
        let tmp = seeded();
        let source = format!("{}/", path_of(&tmp, "src"));
        let targets = vec![path_of(&tmp, "out")];

        apply(mirror(local(), &source, &targets, false));
        assert_eq!(mirror(local(), &source, &targets, false).count(), 0);
    }

    #[test]
    fn test_size_mismatch_needs_force() {
        let tmp = seeded();
        create_test_file(tmp.path(), "out/a.txt", "old");
        let source = format!("{}/", path_of(&tmp, "src"));
        let targets = vec![path_of(&tmp, "out")];

        let plan: Vec<_> = mirror(local(), &source, &targets, false).collect();
        assert_eq!(plan.len(), 2);
        assert!(matches!(
            plan[0],
            Err(PlanError::OverwriteNotAllowed {
                source_size: 5,
                target_size: 3,
                ..
            })
        ));
        assert_eq!(
            plan[1].as_ref().unwrap().source.path,
            path_of(&tmp, "src/sub/b.txt")
        );

        let forced = pairs(mirror(local(), &source, &targets, true));
        assert_eq!(forced.len(), 2);
        assert_eq!(forced[0].1, vec![path_of(&tmp, "out/a.txt")]);
    }

    #[test]
    fn test_multiple_targets_list_only_missing_ones() {
        let tmp = seeded();
        create_test_file(tmp.path(), "full/a.txt", "aaaaa");
        create_test_file(tmp.path(), "full/sub/b.txt", "bbb");
        let source = format!("{}/", path_of(&tmp, "src"));
        let targets = vec![path_of(&tmp, "out"), path_of(&tmp, "full")];

        let plan = pairs(mirror(local(), &source, &targets, false));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].1, vec![path_of(&tmp, "out/a.txt")]);
        assert_eq!(plan[1].1, vec![path_of(&tmp, "out/sub/b.txt")]);
    }

    #[test]
    fn test_source_without_separator_keeps_directory_name() {
        let tmp = seeded();
        let targets = vec![path_of(&tmp, "out")];

        for source in [
            path_of(&tmp, "src"),
            format!("{}/...", path_of(&tmp, "src")),
            format!("{}/.../", path_of(&tmp, "src")),
        ] {
            let plan = pairs(mirror(local(), &source, &targets, false));
            assert_eq!(
                plan.iter().map(|(_, t)| t[0].clone()).collect::<Vec<_>>(),
                vec![path_of(&tmp, "out/src/a.txt"), path_of(&tmp, "out/src/sub/b.txt")]
            );
        }
    }

    #[test]
    fn test_missing_target_gets_everything() {
        let tmp = seeded();
        let source = format!("{}/", path_of(&tmp, "src"));
        let targets = vec![path_of(&tmp, "new/deep")];

        let plan = pairs(mirror(local(), &source, &targets, false));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].1, vec![path_of(&tmp, "new/deep/sub/b.txt")]);
    }

    #[test]
    fn test_directory_in_target_blocks_file() {
        let tmp = seeded();
        fs::create_dir_all(tmp.path().join("out/a.txt/inner")).unwrap();
        let source = format!("{}/", path_of(&tmp, "src"));
        let targets = vec![path_of(&tmp, "out")];

        let plan: Vec<_> = mirror(local(), &source, &targets, false).collect();
        assert_eq!(plan.len(), 2);
        assert!(matches!(plan[0], Err(PlanError::TypeMismatch { .. })));
        assert!(plan[1].is_ok());
    }

    #[test]
    fn test_source_listing_failure_does_not_stop_walk() {
        let store = Arc::new(MemoryStore::new());
        store.insert("https://mem.local/src/a.txt", "a").unwrap();
        store.insert("https://mem.local/src/b.txt", "b").unwrap();
        store.insert("https://mem.local/src/c.txt", "c").unwrap();
        store.fail_listing_at("https://mem.local/src/b.txt");
        store.insert("https://mem.local/dst/a.txt", "a").unwrap();
        let router: Arc<dyn Storage> = Arc::new(Router::new().with_remote("mem.local", store));

        let plan: Vec<_> = mirror(
            router,
            "https://mem.local/src/",
            &["https://mem.local/dst".to_string()],
            false,
        )
        .collect();

        assert_eq!(plan.len(), 2);
        assert!(matches!(plan[0], Err(PlanError::Listing { .. })));
        let instruction = plan[1].as_ref().unwrap();
        assert_eq!(instruction.source.path, "https://mem.local/src/c.txt");
        assert_eq!(instruction.targets[0].to_string(), "https://mem.local/dst/c.txt");
    }

    #[test]
    fn test_unusual_key_names_round_trip_through_remote() {
        let tmp = TempDir::new().unwrap();
        create_test_file(tmp.path(), "src/a b.txt", "spaced");
        create_test_file(tmp.path(), "src/日本語.txt", "kanji");
        let store = Arc::new(MemoryStore::new());
        store.make_bucket("https://mem.local/dst").unwrap();
        let router: Arc<dyn Storage> = Arc::new(
            Router::new().with_remote("mem.local", Arc::clone(&store) as Arc<dyn Storage>),
        );
        let executor = TransferExecutor::new(Arc::clone(&router), false);
        let run = |source: &str, target: String| {
            for instruction in mirror(Arc::clone(&router), source, &[target], false) {
                for (_, result) in executor.mirror(&instruction.unwrap()) {
                    result.unwrap();
                }
            }
        };

        let source = format!("{}/", path_of(&tmp, "src"));
        run(&source, "https://mem.local/dst".to_string());
        assert_eq!(store.read("https://mem.local/dst/a b.txt"), Some(b"spaced".to_vec()));
        assert_eq!(
            mirror(
                Arc::clone(&router),
                &source,
                &["https://mem.local/dst".to_string()],
                false
            )
            .count(),
            0
        );

        run("https://mem.local/dst/", path_of(&tmp, "out"));
        assert_eq!(fs::read_to_string(tmp.path().join("out/a b.txt")).unwrap(), "spaced");
        assert_eq!(fs::read_to_string(tmp.path().join("out/日本語.txt")).unwrap(), "kanji");
    }

    #[test]
    fn test_invalid_arguments_become_single_error() {
        let tmp = seeded();
        let plan: Vec<_> = mirror(local(), &path_of(&tmp, "missing"), &[path_of(&tmp, "out")], false)
            .collect();
        assert!(matches!(plan[..], [Err(PlanError::SourceNotFound(_))]));
    }
}
