//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Email, HashedPassword, User, UserId, UserRole};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::refresh_token::Entity")]
    RefreshToken,
}

impl Related<super::refresh_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Reconstruct the domain entity from its persistence shape.
///
/// Stored values are revalidated on the way out; a row that fails its
/// own invariants indicates corruption, surfaced as an internal error.
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(model.id),
            email: Email::new(&model.email)
                .map_err(|_| AppError::internal("Stored email fails validation"))?,
            first_name: model.first_name,
            last_name: model.last_name,
            password_hash: HashedPassword::from_hash(model.password_hash)?,
            role: UserRole::parse(&model.role)
                .map_err(|_| AppError::internal("Stored role is unknown"))?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Convert the domain entity into an insertable active model
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id.as_uuid()),
            email: Set(user.email.as_str().to_string()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.as_str().to_string()),
            role: Set(user.role.to_string()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
    }
}
