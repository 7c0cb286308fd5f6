//! User directory domain service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{UserDirectory, UserRepository, UserRepositoryError};
use crate::domain::{Error, NewUser, User, UserCandidate, UserId};

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateLogin { login } => {
            Error::invalid_request(format!("login `{login}` is already registered"))
                .with_details(json!({ "field": "login", "code": "login_taken" }))
        }
    }
}

/// User directory backed by a repository port.
#[derive(Clone)]
pub struct UserDirectoryService {
    users: Arc<dyn UserRepository>,
}

impl UserDirectoryService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for UserDirectoryService {
    async fn register(&self, candidate: UserCandidate) -> Result<User, Error> {
        let user = NewUser::try_from(candidate)
            .map_err(|err| Error::invalid_request(format!("invalid user: {err}")))?;
        self.users
            .create(&user)
            .await
            .map_err(map_user_repository_error)
    }

    async fn get(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("user {id} not found"))
                    .with_details(json!({ "id": id.value() }))
            })
    }
}
