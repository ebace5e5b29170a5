use super::RappelError;
use itertools::Itertools;
use rappel_scheduler_domain::{Issue, User};
use rappel_scheduler_infra::RappelContext;
use tracing::debug;

/// The users to notify about `issue`: the assignee, the author and the
/// watchers who are active and have a mail address. Ordered like
/// `Issue::stakeholder_ids`, each user at most once.
pub async fn resolve_recipients(
    ctx: &RappelContext,
    issue: &Issue,
) -> Result<Vec<User>, RappelError> {
    let stakeholder_ids = issue.stakeholder_ids();
    if stakeholder_ids.is_empty() {
        return Ok(Vec::new());
    }

    let users = ctx
        .repos
        .users
        .find_many(&stakeholder_ids)
        .await
        .map_err(RappelError::RecipientLookup)?;

    let recipients = stakeholder_ids
        .iter()
        .filter_map(|id| users.iter().find(|user| user.id == *id))
        .filter(|user| {
            let eligible = user.can_receive_mail();
            if !eligible {
                debug!("User {} of issue {} cannot receive mail", user.id, issue.id);
            }
            eligible
        })
        .unique_by(|user| user.id)
        .cloned()
        .collect();

    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::*;

    fn ids(users: &[User]) -> Vec<i64> {
        users.iter().map(|u| u.id.inner()).collect()
    }

    #[actix_web::test]
    async fn keeps_active_users_with_mail() {
        let ctx = setup().ctx;
        let issue = with_stakeholders(open_issue(1), 1, 2, &[3, 4, 5, 1]);
        insert_all(
            &ctx,
            &[],
            &[
                user(1, Some("assignee@example.com"), true),
                user(2, Some("author@example.com"), true),
                user(3, Some("inactive@example.com"), false),
                user(4, None, true),
                user(5, Some("   "), true),
            ],
            &[],
        )
        .await;

        let recipients = resolve_recipients(&ctx, &issue).await.unwrap();
        assert_eq!(ids(&recipients), vec![1, 2]);
    }

    #[actix_web::test]
    async fn unknown_principals_are_left_out() {
        let ctx = setup().ctx;
        // 7 is a group or a deleted user
        let issue = with_stakeholders(open_issue(1), 7, 2, &[]);
        insert_all(&ctx, &[], &[user(2, Some("author@example.com"), true)], &[]).await;

        let recipients = resolve_recipients(&ctx, &issue).await.unwrap();
        assert_eq!(ids(&recipients), vec![2]);
    }

    #[actix_web::test]
    async fn issue_without_stakeholders_has_no_recipients() {
        let ctx = setup().ctx;
        let recipients = resolve_recipients(&ctx, &open_issue(1)).await.unwrap();
        assert!(recipients.is_empty());
    }
}
