//! Identity collaborators
//!
//! The worker never mints tokens itself. It asks the smart-service repository
//! who owns a process instance and asks the token service for a token on
//! behalf of that user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ImportResult;

/// User token obtained from the token exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    jwt: String,
    user_id: String,
}

impl Token {
    pub fn new(jwt: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            jwt: jwt.into(),
            user_id: user_id.into(),
        }
    }

    /// Raw JWT, without any `Bearer` prefix
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Resolves the user owning a workflow process instance
#[async_trait]
pub trait InstanceUserResolver: Send + Sync {
    async fn get_instance_user(&self, process_instance_id: &str) -> ImportResult<String>;
}

/// Exchanges a user id for a usable token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange_user_token(&self, user_id: &str) -> ImportResult<Token>;
}
