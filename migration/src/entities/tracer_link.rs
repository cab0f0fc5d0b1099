//! Tracer link entity: (job, source path, destination) -> public token

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tracer_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub token: String,
    pub job_id: String,
    pub source_path: String,
    pub source_label: String,
    #[sea_orm(column_type = "Text")]
    pub destination_url: String,
    pub destination_url_hash: String, // CHAR(64) sha-256 hex
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tracer_click_event::Entity")]
    ClickEvents,
}

impl Related<super::tracer_click_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClickEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
