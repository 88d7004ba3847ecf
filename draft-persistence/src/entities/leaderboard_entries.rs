use sea_orm::entity::prelude::*;

/// One ranked result inside a weekly bucket. Rows are written once at
/// submission time and only ever removed again by the trim pass.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "leaderboard_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub week_id: String,
    pub user_id: String,
    pub score: f64,
    pub players: Json,
    pub submitted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
