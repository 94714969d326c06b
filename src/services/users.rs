use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::users::{NewUser, User};
use crate::repositories::users::UserRepository;

pub enum UserRequest {
    CreateUser {
        new_user: NewUser,
        response: oneshot::Sender<Result<User, ServiceError>>,
    },
    GetUser {
        id: String,
        response: oneshot::Sender<Result<Option<User>, ServiceError>>,
    },
    ListUsers {
        response: oneshot::Sender<Result<Vec<User>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    repository: UserRepository,
}

impl UserRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = UserRepository::new(sql_conn);

        UserRequestHandler { repository }
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        Ok(self.repository.insert_user(new_user).await?)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.repository.get_user_by_id(id).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repository.get_all_users().await?)
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::CreateUser { new_user, response } => {
                let user = self.create_user(new_user).await;
                let _ = response.send(user);
            }
            UserRequest::GetUser { id, response } => {
                let user = self.get_user(&id).await;
                let _ = response.send(user);
            }
            UserRequest::ListUsers { response } => {
                let users = self.list_users().await;
                let _ = response.send(users);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}
