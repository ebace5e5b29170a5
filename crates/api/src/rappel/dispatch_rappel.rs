use super::{rappel_email::render_rappel_email, DeliveryError, RappelError};
use rappel_scheduler_domain::{Issue, Rappel, User};
use rappel_scheduler_infra::RappelContext;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Logins of the users the notification was sent to
    pub delivered: Vec<String>,
    pub failures: Vec<DeliveryError>,
}

impl DispatchReport {
    /// Every recipient of a non-empty set got the notification
    pub fn success(&self) -> bool {
        !self.delivered.is_empty() && self.failures.is_empty()
    }
}

/// Sends the notification about `issue` to every recipient. When all of
/// them succeed the `Rappel` is marked as sent and saved, otherwise it is
/// left untouched and retried on the next run.
pub async fn dispatch_rappel(
    ctx: &RappelContext,
    rappel: &mut Rappel,
    issue: &Issue,
    recipients: &[User],
) -> Result<DispatchReport, RappelError> {
    let mut report = DispatchReport::default();
    for user in recipients {
        match send_to(ctx, rappel, issue, user).await {
            Ok(()) => {
                info!("Rappel {} sent to {}", rappel.id, user.login);
                report.delivered.push(user.login.clone());
            }
            Err(e) => {
                warn!("Rappel {}: {}", rappel.id, e);
                report.failures.push(e);
            }
        }
    }

    if !report.success() {
        warn!(
            "Rappel {} was not sent to every recipient ({} failed), it will be retried",
            rappel.id,
            report.failures.len()
        );
        return Ok(report);
    }

    let now = ctx.sys.get_datetime();
    rappel.mark_as_sent(now).map_err(RappelError::MarkAsSent)?;
    ctx.repos
        .rappels
        .save(rappel)
        .await
        .map_err(RappelError::MarkAsSent)?;
    if let Some(next_run_date) = rappel.next_run_date {
        info!("Rappel {} next run is at {}", rappel.id, next_run_date);
    }

    Ok(report)
}

async fn send_to(
    ctx: &RappelContext,
    rappel: &Rappel,
    issue: &Issue,
    user: &User,
) -> Result<(), DeliveryError> {
    let email = render_rappel_email(&ctx.config, rappel, issue, user)?;
    ctx.mailer
        .send(email)
        .await
        .map_err(|e| DeliveryError::Transport {
            recipient: user.login.clone(),
            reason: e.to_string(),
        })
}
