use crate::domain::UserId;
use crate::ports::user_directory::{Result, UserDirectory, UserSummary};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// UserDirectoryのインメモリ実装
///
/// 利用者管理コンテキストの代わりに、登録された利用者だけを返す。
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, UserSummary>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 利用者を登録（同じIDは上書き）
    pub fn add_user(&self, user_id: UserId, name: &str, email: &str) -> Result<()> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| std::io::Error::other("user directory lock poisoned"))?;
        users.insert(
            user_id,
            UserSummary {
                user_id,
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    /// 指定された順で返す（未登録のIDは含めない）
    async fn find_summaries(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>> {
        let users = self
            .users
            .lock()
            .map_err(|_| std::io::Error::other("user directory lock poisoned"))?;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_users_are_skipped() {
        let directory = InMemoryUserDirectory::new();
        let alice = UserId::new();
        directory.add_user(alice, "Alice", "alice@example.com").unwrap();

        let found = directory
            .find_summaries(&[UserId::new(), alice])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alice");
    }
}
