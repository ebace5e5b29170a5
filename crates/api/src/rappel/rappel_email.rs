use super::DeliveryError;
use rappel_scheduler_domain::{Issue, Rappel, User};
use rappel_scheduler_infra::{Config, RappelEmail};
use url::Url;

/// Absolute link to the issue in the issue tracker
pub fn issue_url(config: &Config, issue: &Issue) -> Result<Url, url::ParseError> {
    let base = Url::parse(&format!("{}://{}/", config.protocol, config.host_name))?;
    base.join(&format!("issues/{}", issue.id))
}

/// Renders the notification about `issue` for one recipient
pub fn render_rappel_email(
    config: &Config,
    rappel: &Rappel,
    issue: &Issue,
    user: &User,
) -> Result<RappelEmail, DeliveryError> {
    let render_error = |reason: String| DeliveryError::Render {
        recipient: user.login.clone(),
        reason,
    };

    let to = user
        .mailbox()
        .ok_or_else(|| render_error("user has no mail address".into()))?;
    let url = issue_url(config, issue).map_err(|e| render_error(e.to_string()))?;
    let due_date = issue
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into());

    let text_body = format!(
        "Rappel for issue #{id}: {subject}\n\nStatus: {status}\nDue date: {due_date}\n\n{url}\n",
        id = issue.id,
        subject = issue.subject,
        status = issue.status.name,
        due_date = due_date,
        url = url,
    );
    let html_body = format!(
        "<p>Rappel for issue <a href=\"{url}\">#{id}: {subject}</a></p>\n\
         <ul>\n<li>Status: {status}</li>\n<li>Due date: {due_date}</li>\n</ul>\n",
        url = escape_html(url.as_str()),
        id = issue.id,
        subject = escape_html(&issue.subject),
        status = escape_html(&issue.status.name),
        due_date = due_date,
    );

    RappelEmail::new(to, rappel.processed_title(issue), text_body, html_body)
        .map_err(|e| render_error(e.to_string()))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
