//! Target repository resolution.
//!
//! Targets are the union, in first-seen order, of
//!
//! - **dependents**: non-archived repositories whose template is the invoking
//!   repository, narrowed by `dependents` patterns when any are given
//! - **additional**: non-archived repositories matching the `additional`
//!   patterns, regardless of their template

use tracing::{debug, info, warn};

use reposync_core::{PatternSet, Platform, RunContext, SyncConfig, TargetRepository};

use crate::SyncError;

/// Outcome of resolution. Neither variant is an error: a non-template
/// repository or an empty target list simply ends the run early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The invoking repository is not flagged as a template.
    NotTemplate,
    Targets(Vec<TargetRepository>),
}

/// Resolve the repositories that receive the template's files.
pub fn resolve(
    platform: &dyn Platform,
    ctx: &RunContext,
    config: &SyncConfig,
) -> Result<Resolution, SyncError> {
    let template = platform.repository(ctx.owner(), &ctx.template.name)?;
    if !template.is_template {
        warn!("{} is not a template repository", ctx.template);
        return Ok(Resolution::NotTemplate);
    }

    let all: Vec<_> = platform
        .list_repositories(ctx.owner(), template.owner_kind)?
        .into_iter()
        .filter(|r| !r.archived)
        .collect();
    debug!(
        "owner {} is a {:?} with {} active repositories",
        ctx.owner(),
        template.owner_kind,
        all.len()
    );

    let full_name = ctx.template.full_name();
    let mut dependents: Vec<&str> = all
        .iter()
        .filter(|r| r.template_full_name.as_deref() == Some(full_name.as_str()))
        .map(|r| r.name.as_str())
        .collect();
    let dependent_patterns = PatternSet::new(&config.dependents)?;
    if !dependent_patterns.is_empty() {
        dependents = dependent_patterns.filter(dependents);
    }
    info!("found {} repositories marked as dependents", dependents.len());
    if !dependents.is_empty() {
        debug!("dependents: {dependents:?}");
    }

    let mut additional: Vec<&str> = Vec::new();
    let additional_patterns = PatternSet::new(&config.additional)?;
    if !additional_patterns.is_empty() {
        additional = additional_patterns.filter(all.iter().map(|r| r.name.as_str()));
        info!("found {} repositories marked as additional", additional.len());
        if !additional.is_empty() {
            debug!("additional: {additional:?}");
        }
    }

    let targets = merge(&dependents, &additional);
    info!("final list of repos includes {} repositories", targets.len());
    Ok(Resolution::Targets(targets))
}

/// Union of both lists in first-seen order, flags merged.
fn merge(dependents: &[&str], additional: &[&str]) -> Vec<TargetRepository> {
    let mut targets: Vec<TargetRepository> = Vec::new();
    for name in dependents {
        if !targets.iter().any(|t| t.name.as_str() == *name) {
            targets.push(TargetRepository {
                name: (*name).into(),
                dependent: true,
                additional: false,
            });
        }
    }
    for name in additional {
        match targets.iter_mut().find(|t| t.name.as_str() == *name) {
            Some(existing) => existing.additional = true,
            None => targets.push(TargetRepository {
                name: (*name).into(),
                dependent: false,
                additional: true,
            }),
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use reposync_core::{EventKind, RepoSlug, RepositoryMeta};

    use super::*;
    use crate::fake::{dependent, meta, FakePlatform, OWNER, TEMPLATE};

    fn ctx() -> RunContext {
        RunContext {
            template: RepoSlug::new(OWNER, TEMPLATE),
            event: EventKind::Push,
            pull_request: None,
            dry_run: false,
        }
    }

    fn names(resolution: Resolution) -> Vec<String> {
        match resolution {
            Resolution::Targets(targets) => targets.into_iter().map(|t| t.name.0).collect(),
            Resolution::NotTemplate => panic!("expected targets"),
        }
    }

    #[test]
    fn non_template_repository_resolves_to_nothing() {
        let platform = FakePlatform::new().with_repo(meta(TEMPLATE));
        let resolution = resolve(&platform, &ctx(), &SyncConfig::default()).unwrap();
        assert_eq!(resolution, Resolution::NotTemplate);
        assert_eq!(platform.calls(), ["repository template"]);
    }

    #[test]
    fn dependents_filtered_by_patterns() {
        let platform = FakePlatform::new()
            .with_repo(dependent("include1"))
            .with_repo(dependent("include2"))
            .with_repo(dependent("exclude1"));
        let config = SyncConfig {
            dependents: vec!["include*".into(), "!exclude*".into()],
            ..SyncConfig::default()
        };
        let resolved = names(resolve(&platform, &ctx(), &config).unwrap());
        assert_eq!(resolved, ["include1", "include2"]);
    }

    #[test]
    fn only_exact_template_match_counts_as_dependent() {
        let other_template = RepositoryMeta {
            template_full_name: Some("acme/other-template".into()),
            ..meta("foreign")
        };
        let other_owner = RepositoryMeta {
            template_full_name: Some("someone/template".into()),
            ..meta("fork")
        };
        let platform = FakePlatform::new()
            .with_repo(dependent("mine"))
            .with_repo(other_template)
            .with_repo(other_owner);
        let resolved = names(resolve(&platform, &ctx(), &SyncConfig::default()).unwrap());
        assert_eq!(resolved, ["mine"]);
    }

    #[test]
    fn archived_repositories_are_ignored() {
        let archived = RepositoryMeta {
            archived: true,
            ..dependent("old")
        };
        let platform = FakePlatform::new()
            .with_repo(archived)
            .with_repo(dependent("new"));
        let config = SyncConfig {
            additional: vec!["*".into()],
            ..SyncConfig::default()
        };
        let resolved = names(resolve(&platform, &ctx(), &config).unwrap());
        assert!(!resolved.contains(&"old".to_string()));
        assert!(resolved.contains(&"new".to_string()));
    }

    #[test]
    fn empty_additional_selects_nothing_extra() {
        let mut platform = FakePlatform::new();
        for i in 0..50 {
            platform = platform.with_repo(meta(&format!("repo-{i}")));
        }
        let resolved = names(resolve(&platform, &ctx(), &SyncConfig::default()).unwrap());
        assert!(resolved.is_empty());
    }

    #[test]
    fn union_is_deduplicated_in_first_seen_order() {
        let platform = FakePlatform::new()
            .with_repo(dependent("b-dep"))
            .with_repo(meta("a-extra"))
            .with_repo(dependent("c-both"));
        let config = SyncConfig {
            additional: vec!["a-*".into(), "c-*".into()],
            ..SyncConfig::default()
        };
        let resolution = resolve(&platform, &ctx(), &config).unwrap();
        let Resolution::Targets(targets) = resolution else {
            panic!("expected targets");
        };
        let order: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(order, ["b-dep", "c-both", "a-extra"]);

        let both = &targets[1];
        assert!(both.dependent && both.additional);
        let extra = &targets[2];
        assert!(!extra.dependent && extra.additional);
    }

    #[test]
    fn wildcards_skip_dot_named_repositories() {
        let platform = FakePlatform::new()
            .with_repo(meta(".github"))
            .with_repo(dependent(".dotfiles"))
            .with_repo(meta("service"));
        let config = SyncConfig {
            dependents: vec!["!legacy".into()],
            additional: vec!["*".into()],
            ..SyncConfig::default()
        };
        let resolved = names(resolve(&platform, &ctx(), &config).unwrap());
        assert!(resolved.contains(&"service".to_string()));
        assert!(!resolved.iter().any(|name| name.starts_with('.')), "{resolved:?}");

        let explicit = SyncConfig {
            additional: vec![".github".into()],
            ..SyncConfig::default()
        };
        let resolved = names(resolve(&platform, &ctx(), &explicit).unwrap());
        assert_eq!(resolved, [".dotfiles", ".github"]);
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let platform = FakePlatform::new().with_repo(dependent("x"));
        let config = SyncConfig {
            dependents: vec!["[".into()],
            ..SyncConfig::default()
        };
        let err = resolve(&platform, &ctx(), &config).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)), "got: {err}");
    }
}
