use super::{
    dispatch_rappel::dispatch_rappel,
    resolve_recipients::resolve_recipients,
    select_due_rappels::{DueRappel, SelectDueRappelsUseCase, SelectionError},
    RappelError,
};
use crate::shared::usecase::UseCase;
use rappel_scheduler_domain::CycleReport;
use rappel_scheduler_infra::RappelContext;
use tracing::{error, info, warn};

/// Sends every due `Rappel` once. Expected to run while holding the job lock.
#[derive(Debug)]
pub struct ProcessDueRappelsUseCase {}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessDueRappelsUseCase {
    type Response = CycleReport;

    type Errors = SelectionError;

    async fn execute(&mut self, ctx: &RappelContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_datetime();
        let mut report = CycleReport::new(now);

        // Without the settings it is unknown whether non-overdue issues may
        // be reminded, so nothing is sent this run.
        let overdue_only = match ctx.repos.settings.get().await {
            Ok(settings) => settings.overdue_only,
            Err(e) => {
                error!("Unable to read the rappel settings, skipping this run: {:?}", e);
                return Err(SelectionError::Settings(e));
            }
        };

        let mut select = SelectDueRappelsUseCase { now, overdue_only };
        let selection = select.execute(ctx).await?;
        report.due = selection.due;
        report.skipped = selection.skipped.len();
        report.failed = selection.failed.len();

        for due in selection.selected {
            let rappel_id = due.rappel.id;
            match process_rappel(ctx, due).await {
                Ok(Processed::Sent) => report.sent += 1,
                Ok(Processed::NoRecipients) => report.without_recipients += 1,
                Ok(Processed::Failed) => report.failed += 1,
                Err(e) => {
                    warn!("Rappel {} failed: {}", rappel_id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Rappel run done: {} due, {} skipped, {} without recipients, {} sent, {} failed",
            report.due, report.skipped, report.without_recipients, report.sent, report.failed
        );
        Ok(report)
    }
}

enum Processed {
    Sent,
    NoRecipients,
    Failed,
}

async fn process_rappel(ctx: &RappelContext, due: DueRappel) -> Result<Processed, RappelError> {
    let DueRappel { mut rappel, issue } = due;

    let recipients = resolve_recipients(ctx, &issue).await?;
    if recipients.is_empty() {
        warn!(
            "Rappel {} has no recipient for issue {}, nothing sent",
            rappel.id, issue.id
        );
        return Ok(Processed::NoRecipients);
    }
    info!(
        "Rappel {} for issue {} goes to: {}",
        rappel.id,
        issue.id,
        recipients
            .iter()
            .map(|user| user.login.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let report = dispatch_rappel(ctx, &mut rappel, &issue, &recipients).await?;
    if report.success() {
        Ok(Processed::Sent)
    } else {
        Ok(Processed::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::*;
    use chrono::Duration;
    use rappel_scheduler_domain::{Rappel, ID, OVERDUE_ONLY_KEY};
    use std::sync::Arc;

    #[actix_web::test]
    async fn sends_to_eligible_recipients_and_advances() {
        let test = setup();
        let ctx = &test.ctx;
        ctx.repos.settings.set(OVERDUE_ONLY_KEY, "1").await.unwrap();
        // Overdue issue, assignee active with mail, watcher inactive
        let mut issue = with_stakeholders(open_issue(1), 1, 1, &[2]);
        issue.due_date = due_date(2021, 2, 20);
        let rappel = Rappel::new(ID::new(1), issue.id);
        insert_all(
            ctx,
            &[issue],
            &[
                user(1, Some("assignee@example.com"), true),
                user(2, Some("watcher@example.com"), false),
            ],
            &[rappel],
        )
        .await;

        let report = ProcessDueRappelsUseCase {}.execute(ctx).await.unwrap();
        assert_eq!(report.due, 1);
        assert_eq!(report.sent, 1);

        let sent = test.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_address(), "assignee@example.com");

        let saved = ctx.repos.rappels.find(&ID::new(1)).await.unwrap();
        assert_eq!(saved.next_run_date, Some(now() + Duration::days(1)));
    }

    #[actix_web::test]
    async fn partial_failure_keeps_schedule() {
        let test = setup();
        let ctx = &test.ctx;
        test.mailer.fail_for("author@example.com");
        let issue = with_stakeholders(open_issue(1), 1, 2, &[]);
        let mut rappel = Rappel::new(ID::new(1), issue.id);
        rappel.next_run_date = Some(now() - Duration::minutes(5));
        insert_all(
            ctx,
            &[issue],
            &[
                user(1, Some("assignee@example.com"), true),
                user(2, Some("author@example.com"), true),
            ],
            &[rappel.clone()],
        )
        .await;

        let report = ProcessDueRappelsUseCase {}.execute(ctx).await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(ctx.repos.rappels.find(&rappel.id).await.unwrap(), rappel);
    }

    #[actix_web::test]
    async fn rappel_without_recipients_is_not_advanced() {
        let test = setup();
        let ctx = &test.ctx;
        let issue = with_stakeholders(open_issue(1), 1, 1, &[]);
        let rappel = Rappel::new(ID::new(1), issue.id);
        insert_all(ctx, &[issue], &[user(1, None, true)], &[rappel.clone()]).await;

        let report = ProcessDueRappelsUseCase {}.execute(ctx).await.unwrap();
        assert_eq!(report.without_recipients, 1);
        assert!(test.mailer.sent().is_empty());
        assert_eq!(ctx.repos.rappels.find(&rappel.id).await.unwrap(), rappel);
    }

    #[actix_web::test]
    async fn failing_rappel_does_not_stop_the_others() {
        let test = setup();
        let ctx = &test.ctx;
        test.mailer.fail_for("first@example.com");
        let first = with_stakeholders(open_issue(1), 1, 1, &[]);
        let second = with_stakeholders(open_issue(2), 2, 2, &[]);
        insert_all(
            ctx,
            &[first, second],
            &[
                user(1, Some("first@example.com"), true),
                user(2, Some("second@example.com"), true),
            ],
            &[
                Rappel::new(ID::new(1), ID::new(1)),
                Rappel::new(ID::new(2), ID::new(2)),
            ],
        )
        .await;

        let report = ProcessDueRappelsUseCase {}.execute(ctx).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(test.mailer.sent()[0].to_address(), "second@example.com");
    }

    #[actix_web::test]
    async fn honors_overdue_only_setting() {
        let test = setup();
        let ctx = &test.ctx;
        ctx.repos.settings.set(OVERDUE_ONLY_KEY, "1").await.unwrap();
        let issue = with_stakeholders(open_issue(1), 1, 1, &[]);
        insert_all(
            ctx,
            &[issue],
            &[user(1, Some("jane@example.com"), true)],
            &[Rappel::new(ID::new(1), ID::new(1))],
        )
        .await;

        let report = ProcessDueRappelsUseCase {}.execute(ctx).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert!(test.mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn unreadable_settings_skip_the_run() {
        let mut test = setup();
        let issue = with_stakeholders(open_issue(1), 1, 1, &[]);
        insert_all(
            &test.ctx,
            &[issue],
            &[user(1, Some("jane@example.com"), true)],
            &[Rappel::new(ID::new(1), ID::new(1))],
        )
        .await;
        test.ctx.repos.settings = Arc::new(FailingSettingsRepo);

        let res = ProcessDueRappelsUseCase {}.execute(&test.ctx).await;
        assert!(matches!(res, Err(SelectionError::Settings(_))));
        assert!(test.mailer.sent().is_empty());
        let saved = test.ctx.repos.rappels.find(&ID::new(1)).await.unwrap();
        assert_eq!(saved.next_run_date, None);
    }

    #[actix_web::test]
    async fn selection_failure_aborts_the_run() {
        let mut ctx = setup().ctx;
        ctx.repos.rappels = Arc::new(FailingRappelRepo);

        let res = ProcessDueRappelsUseCase {}.execute(&ctx).await;
        assert!(matches!(res, Err(SelectionError::Query(_))));
    }
}
