use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rappel_scheduler_domain::{Issue, IssueStatus, PluginSettings, Rappel, User, Watcher, ID};
use rappel_scheduler_infra::{
    IJobLockRepo, IRappelRepo, ISettingsRepo, ISys, InMemoryMailer, RappelContext,
};
use std::sync::Arc;

pub struct StaticTimeSys(pub i64);
impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}

/// 2021-02-21 09:00:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 2, 21, 9, 0, 0).unwrap()
}

pub struct TestContext {
    pub ctx: RappelContext,
    pub mailer: Arc<InMemoryMailer>,
}

/// In-memory context pinned at `now()`
pub fn setup() -> TestContext {
    let mailer = Arc::new(InMemoryMailer::new());
    let mut ctx = RappelContext::create_inmemory();
    ctx.sys = Arc::new(StaticTimeSys(now().timestamp_millis()));
    ctx.mailer = mailer.clone();
    ctx.config.lock_stale_secs = 600;
    ctx.config.host_name = "redmine.example.com".into();
    ctx.config.protocol = "https".into();
    TestContext { ctx, mailer }
}

pub fn set_time(ctx: &mut RappelContext, now: DateTime<Utc>) {
    ctx.sys = Arc::new(StaticTimeSys(now.timestamp_millis()));
}

pub fn open_issue(id: i64) -> Issue {
    Issue {
        id: ID::new(id),
        subject: format!("Issue {}", id),
        status: IssueStatus {
            id: ID::new(1),
            name: "New".into(),
            is_closed: false,
        },
        due_date: None,
        assigned_to_id: None,
        author_id: None,
        watchers: Vec::new(),
    }
}

pub fn with_stakeholders(mut issue: Issue, assignee: i64, author: i64, watchers: &[i64]) -> Issue {
    issue.assigned_to_id = Some(ID::new(assignee));
    issue.author_id = Some(ID::new(author));
    issue.watchers = watchers
        .iter()
        .map(|id| Watcher {
            user_id: ID::new(*id),
        })
        .collect();
    issue
}

pub fn due_date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn user(id: i64, mail: Option<&str>, active: bool) -> User {
    let mut user = User::new(ID::new(id), format!("user{}", id), mail.map(String::from));
    user.active = active;
    user
}

pub async fn insert_all(ctx: &RappelContext, issues: &[Issue], users: &[User], rappels: &[Rappel]) {
    for issue in issues {
        ctx.repos.issues.insert(issue).await.unwrap();
    }
    for user in users {
        ctx.repos.users.insert(user).await.unwrap();
    }
    for rappel in rappels {
        ctx.repos.rappels.insert(rappel).await.unwrap();
    }
}

/// Rappel store that is down
pub struct FailingRappelRepo;

#[async_trait::async_trait]
impl IRappelRepo for FailingRappelRepo {
    async fn insert(&self, _rappel: &Rappel) -> anyhow::Result<()> {
        anyhow::bail!("rappel store is down")
    }
    async fn save(&self, _rappel: &Rappel) -> anyhow::Result<()> {
        anyhow::bail!("rappel store is down")
    }
    async fn find(&self, _rappel_id: &ID) -> Option<Rappel> {
        None
    }
    async fn find_due(&self, _now: DateTime<Utc>) -> anyhow::Result<Vec<Rappel>> {
        anyhow::bail!("rappel store is down")
    }
}

/// Settings store that is down
pub struct FailingSettingsRepo;

#[async_trait::async_trait]
impl ISettingsRepo for FailingSettingsRepo {
    async fn get(&self) -> anyhow::Result<PluginSettings> {
        anyhow::bail!("settings store is down")
    }
    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("settings store is down")
    }
}

#[async_trait::async_trait]
impl IJobLockRepo for FailingSettingsRepo {
    async fn try_acquire(&self, _now_secs: i64, _stale_window_secs: i64) -> anyhow::Result<bool> {
        anyhow::bail!("settings store is down")
    }
    async fn release(&self) -> anyhow::Result<()> {
        anyhow::bail!("settings store is down")
    }
}

/// Lock store whose calls panic
pub struct PanickingJobLockRepo;

#[async_trait::async_trait]
impl IJobLockRepo for PanickingJobLockRepo {
    async fn try_acquire(&self, _now_secs: i64, _stale_window_secs: i64) -> anyhow::Result<bool> {
        panic!("lock store exploded")
    }
    async fn release(&self) -> anyhow::Result<()> {
        panic!("lock store exploded")
    }
}
