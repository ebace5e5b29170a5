use super::{IMailer, RappelEmail};
use std::collections::HashSet;
use std::sync::Mutex;

/// Keeps the sent emails in memory instead of delivering them.
/// Sending to an address registered with `fail_for` returns an error.
pub struct InMemoryMailer {
    sent: Mutex<Vec<RappelEmail>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn sent(&self) -> Vec<RappelEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn send(&self, email: RappelEmail) -> anyhow::Result<()> {
        let address = email.to_address();
        if self.failing.lock().unwrap().contains(&address) {
            anyhow::bail!("Mail transport rejected {}", address);
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}
