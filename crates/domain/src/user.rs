use crate::shared::entity::{Entity, ID};

/// A `User` of the host issue tracker. Groups and other non-user
/// principals are never represented by this type.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub login: String,
    pub mail: Option<String>,
    pub active: bool,
}

impl User {
    pub fn new(id: ID, login: impl Into<String>, mail: Option<String>) -> Self {
        Self {
            id,
            login: login.into(),
            mail,
            active: true,
        }
    }

    /// The mail address if it is set and not blank
    pub fn mailbox(&self) -> Option<&str> {
        self.mail
            .as_deref()
            .map(str::trim)
            .filter(|mail| !mail.is_empty())
    }

    pub fn can_receive_mail(&self) -> bool {
        self.active && self.mailbox().is_some()
    }
}

impl Entity for User {
    fn id(&self) -> ID {
        self.id
    }
}
