pub mod delete;
pub mod probe;

pub use delete::DeleteCommand;
pub use probe::ProbeCommand;

use clap::Args;
use svcmod_import::Token;

/// Token used to authenticate against the deploy service
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    /// JWT of the acting user
    #[arg(long, env = "SVCMOD_JWT")]
    pub jwt: Option<String>,

    /// Id of the acting user, sent as X-UserId
    #[arg(long, env = "SVCMOD_USER_ID", requires = "jwt")]
    pub user_id: Option<String>,
}

impl Credentials {
    pub fn token(&self) -> Option<Token> {
        self.jwt
            .as_ref()
            .map(|jwt| Token::new(jwt.clone(), self.user_id.clone().unwrap_or_default()))
    }
}
