//! Refresh token database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{RefreshToken, RefreshTokenId, UserId};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub token: String,
    pub user_id: Uuid,
    /// NULL = active, set = revoked (permanently)
    pub revoked_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Reconstruct the domain entity from its persistence shape
impl TryFrom<Model> for RefreshToken {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(RefreshToken::from_parts(
            RefreshTokenId::from_uuid(model.id),
            model.token,
            UserId::from_uuid(model.user_id),
            model.revoked_at,
            model.created_at,
        ))
    }
}

/// Convert the domain entity into a writable active model
impl From<&RefreshToken> for ActiveModel {
    fn from(token: &RefreshToken) -> Self {
        ActiveModel {
            id: Set(token.id.as_uuid()),
            token: Set(token.token.clone()),
            user_id: Set(token.user_id.as_uuid()),
            revoked_at: Set(token.revoked_at),
            created_at: Set(token.created_at),
        }
    }
}
