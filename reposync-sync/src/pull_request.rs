//! Pull-request mode: one report comment per pull request, kept current.
//!
//! The comment is found again by the report header. When several comments
//! contain it, the first one listed is updated and the rest are left alone.

use tracing::{debug, info};

use reposync_core::{Platform, RunContext};
use reposync_renderer::SyncReport;

use crate::SyncError;

/// Which write the upsert performed, with the comment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created(u64),
    Updated(u64),
}

impl CommentAction {
    pub fn id(&self) -> u64 {
        match self {
            CommentAction::Created(id) | CommentAction::Updated(id) => *id,
        }
    }
}

/// Create or update the report comment on pull request `number` of the
/// invoking repository.
pub fn upsert_report(
    platform: &dyn Platform,
    ctx: &RunContext,
    number: u64,
    report: &SyncReport,
) -> Result<CommentAction, SyncError> {
    let owner = ctx.owner();
    let repo = ctx.template.name.as_str();

    let comments = platform.list_comments(owner, repo, number)?;
    debug!("pull request #{number} has {} comments", comments.len());

    let action = match comments.iter().find(|c| c.body.contains(report.header)) {
        Some(existing) => {
            let updated = platform.update_comment(owner, repo, existing.id, &report.body)?;
            info!("updated report comment {} on #{number}", updated.id);
            CommentAction::Updated(updated.id)
        }
        None => {
            let created = platform.create_comment(owner, repo, number, &report.body)?;
            info!("created report comment {} on #{number}", created.id);
            CommentAction::Created(created.id)
        }
    };
    Ok(action)
}

#[cfg(test)]
mod tests {
    use reposync_core::{EventKind, RepoSlug};
    use reposync_renderer::REPORT_HEADER;

    use super::*;
    use crate::fake::{FakePlatform, OWNER, TEMPLATE};

    fn ctx() -> RunContext {
        RunContext {
            template: RepoSlug::new(OWNER, TEMPLATE),
            event: EventKind::PullRequest,
            pull_request: Some(7),
            dry_run: false,
        }
    }

    fn report(body: &str) -> SyncReport {
        SyncReport {
            header: REPORT_HEADER,
            body: format!("{REPORT_HEADER}\n\n{body}\n"),
        }
    }

    #[test]
    fn creates_comment_when_none_exists() {
        let platform = FakePlatform::new().with_comment(3, "LGTM");
        let action = upsert_report(&platform, &ctx(), 7, &report("first")).unwrap();

        assert_eq!(action, CommentAction::Created(4));
        assert_eq!(platform.calls(), ["list_comments 7", "create_comment 7"]);
        let comments = platform.comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[1].body.contains("first"));
    }

    #[test]
    fn updates_existing_report_in_place() {
        let platform = FakePlatform::new()
            .with_comment(1, "unrelated")
            .with_comment(2, &format!("{REPORT_HEADER}\n\nstale"));
        let action = upsert_report(&platform, &ctx(), 7, &report("fresh")).unwrap();

        assert_eq!(action, CommentAction::Updated(2));
        assert_eq!(platform.calls(), ["list_comments 7", "update_comment 2"]);
        let comments = platform.comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[1].body.ends_with("fresh\n"));
        assert_eq!(comments[0].body, "unrelated");
    }

    #[test]
    fn first_of_several_reports_is_updated() {
        let platform = FakePlatform::new()
            .with_comment(5, &format!("{REPORT_HEADER}\nold"))
            .with_comment(9, &format!("{REPORT_HEADER}\nolder"));
        let action = upsert_report(&platform, &ctx(), 7, &report("new")).unwrap();

        assert_eq!(action, CommentAction::Updated(5));
        assert_eq!(action.id(), 5);
        assert_eq!(platform.comments()[1].body, format!("{REPORT_HEADER}\nolder"));
    }
}
