//! Account provisioning.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::user::{Role, User, UserRepository, UserStatus};

/// Credentials and profile of an account to provision.
#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

/// Result of a single provisioning call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    Updated,
}

/// Per-account result of a batch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    Created,
    Skipped,
    Failed(String),
}

/// User manager.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    pwd: Arc<PasswordManager>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(pool: SqlitePool, pwd: Arc<PasswordManager>) -> Self {
        Self {
            repo: UserRepository::new(pool),
            pwd,
        }
    }

    /// Ensure exactly one approved row exists for the account's email with a
    /// freshly hashed password.
    ///
    /// Existing rows are updated in place. Only identifiers are logged.
    pub async fn provision(&self, account: &Account) -> Result<Provisioned> {
        let password_hash =
            self.pwd.hash_password(&account.password).map_err(|err| {
                ServerError::Internal {
                    details: "password hashing failed".into(),
                    source: Some(Box::new(err)),
                }
            })?;
        let now = Utc::now();

        match self.repo.find_by_email(&account.email).await? {
            Some(mut user) => {
                user.password_hash = password_hash;
                user.full_name = account.full_name.clone();
                user.role = account.role;
                user.status = UserStatus::Approved;
                user.approved_at.get_or_insert(now);
                user.updated_at = now;

                self.repo.update(&user).await?;

                tracing::info!(email = %account.email, role = ?account.role, "account updated");
                Ok(Provisioned::Updated)
            },
            None => {
                let user = User {
                    email: account.email.clone(),
                    password_hash,
                    full_name: account.full_name.clone(),
                    status: UserStatus::Approved,
                    role: account.role,
                    approved_at: Some(now),
                    created_at: now,
                    updated_at: now,
                };

                self.repo.insert(&user).await?;

                tracing::info!(email = %account.email, role = ?account.role, "account created");
                Ok(Provisioned::Created)
            },
        }
    }

    /// Provision a list of accounts, skipping emails that already exist.
    ///
    /// One failing account never aborts the batch; each entry gets its own
    /// outcome.
    pub async fn provision_batch(
        &self,
        accounts: &[Account],
    ) -> Vec<(String, BatchOutcome)> {
        let mut outcomes = Vec::with_capacity(accounts.len());

        for account in accounts {
            let outcome = match self.repo.find_by_email(&account.email).await {
                Ok(Some(_)) => BatchOutcome::Skipped,
                Ok(None) => match self.provision(account).await {
                    Ok(_) => BatchOutcome::Created,
                    Err(err) => {
                        tracing::warn!(email = %account.email, error = %err, "account not provisioned");
                        BatchOutcome::Failed(err.to_string())
                    },
                },
                Err(err) => {
                    tracing::warn!(email = %account.email, error = %err, "account lookup failed");
                    BatchOutcome::Failed(err.to_string())
                },
            };

            outcomes.push((account.email.clone(), outcome));
        }

        outcomes
    }
}

/// Accounts every deployment starts with.
pub fn well_known_accounts() -> Vec<Account> {
    vec![
        Account {
            email: "user@gmail.com".into(),
            password: "password123".into(),
            full_name: "Test User".into(),
            role: Role::Admin,
        },
        Account {
            email: "superadmin@esgrid.io".into(),
            password: "ChangeMe!Super1".into(),
            full_name: "Super Admin".into(),
            role: Role::SuperAdmin,
        },
        Account {
            email: "supervisor@esgrid.io".into(),
            password: "ChangeMe!Sup1".into(),
            full_name: "Site Supervisor".into(),
            role: Role::Supervisor,
        },
        Account {
            email: "dataentry@esgrid.io".into(),
            password: "ChangeMe!Data1".into(),
            full_name: "Data Entry".into(),
            role: Role::DataEntry,
        },
    ]
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::config::Argon2 as ArgonConfig;

    fn service(pool: SqlitePool) -> UserService {
        let pwd = PasswordManager::new(Some(ArgonConfig {
            memory_cost: 1024,
            iterations: 2,
            parallelism: 1,
            hash_length: 32,
        }))
        .unwrap();

        UserService::new(pool, Arc::new(pwd))
    }

    fn test_account() -> Account {
        Account {
            email: "user@gmail.com".into(),
            password: "password123".into(),
            full_name: "Test User".into(),
            role: Role::Admin,
        }
    }

    #[sqlx::test]
    async fn test_provision_creates_approved_account(pool: SqlitePool) {
        let service = service(pool);
        let account = test_account();

        let outcome = service.provision(&account).await.unwrap();
        assert_eq!(outcome, Provisioned::Created);

        let user = service
            .repo
            .find_by_email("user@gmail.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.status, UserStatus::Approved);
        assert_eq!(user.role, Role::Admin);
        assert!(user.approved_at.is_some());
        assert_ne!(user.password_hash, account.password);

        let pwd = PasswordManager::new(None).unwrap();
        assert!(pwd.verify_password("password123", &user.password_hash).is_ok());
    }

    #[sqlx::test]
    async fn test_provision_twice_updates_in_place(pool: SqlitePool) {
        let service = service(pool);
        let mut account = test_account();

        service.provision(&account).await.unwrap();
        let before = service
            .repo
            .find_by_email("user@gmail.com")
            .await
            .unwrap()
            .unwrap();

        account.password = "rotated456".into();
        let outcome = service.provision(&account).await.unwrap();
        assert_eq!(outcome, Provisioned::Updated);

        assert_eq!(
            service.repo.count_by_email("user@gmail.com").await.unwrap(),
            1
        );

        let after = service
            .repo
            .find_by_email("user@gmail.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(before.password_hash, after.password_hash);

        let pwd = PasswordManager::new(None).unwrap();
        assert!(pwd.verify_password("rotated456", &after.password_hash).is_ok());
        assert!(pwd.verify_password("password123", &after.password_hash).is_err());
    }

    #[sqlx::test]
    async fn test_batch_skips_existing(pool: SqlitePool) {
        let service = service(pool);

        service.provision(&test_account()).await.unwrap();

        let accounts = well_known_accounts();
        let outcomes = service.provision_batch(&accounts).await;
        assert_eq!(outcomes.len(), accounts.len());

        assert_eq!(outcomes[0].0, "user@gmail.com");
        assert_eq!(outcomes[0].1, BatchOutcome::Skipped);
        for (_, outcome) in &outcomes[1..] {
            assert_eq!(*outcome, BatchOutcome::Created);
        }
    }
}
