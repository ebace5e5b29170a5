use super::IUserRepo;
use rappel_scheduler_domain::{User, ID};
use sqlx::{FromRow, PgPool};

// Values of `users.status` and `users.type` in the issue tracker schema
const STATUS_ACTIVE: i32 = 1;
const STATUS_LOCKED: i32 = 3;
const TYPE_USER: &str = "User";

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    id: i64,
    login: String,
    status: i32,
    mail: Option<String>,
}

impl From<UserRaw> for User {
    fn from(raw: UserRaw) -> Self {
        User {
            id: raw.id.into(),
            login: raw.login,
            mail: raw.mail,
            active: raw.status == STATUS_ACTIVE,
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        let status = if user.active {
            STATUS_ACTIVE
        } else {
            STATUS_LOCKED
        };
        sqlx::query(
            r#"
            INSERT INTO users(id, login, status, type)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.inner())
        .bind(&user.login)
        .bind(status)
        .bind(TYPE_USER)
        .execute(&mut *tx)
        .await?;

        if let Some(mail) = &user.mail {
            sqlx::query(
                r#"
                INSERT INTO email_addresses(user_id, address, is_default)
                VALUES($1, $2, TRUE)
                "#,
            )
            .bind(user.id.inner())
            .bind(mail)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>> {
        let user_ids = user_ids.iter().map(|id| id.inner()).collect::<Vec<_>>();

        let users = sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT u.id, u.login, u.status, e.address AS mail
            FROM users AS u
            LEFT JOIN email_addresses AS e ON e.user_id = u.id AND e.is_default = TRUE
            WHERE u.id = ANY($1) AND u.type = $2
            "#,
        )
        .bind(&user_ids)
        .bind(TYPE_USER)
        .fetch_all(&self.pool)
        .await?;

        Ok(users.into_iter().map(|u| u.into()).collect())
    }
}
