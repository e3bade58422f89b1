use crate::common::UserId;
use crate::domains::auth::errors::AuthError;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

pub async fn current_user(user_id: UserId, deps: &ServerDeps) -> Result<User, AuthError> {
    User::find_by_id(user_id, &deps.db_pool)
        .await?
        .ok_or(AuthError::UserNotFound)
}
