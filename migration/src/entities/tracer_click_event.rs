//! Click event entity for tracer link redirects
//!
//! Only classifier outputs and hashes are stored, never the raw IP or UA.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tracer_click_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tracer_link_id: String,
    /// Unix seconds
    pub clicked_at: i64,
    pub request_id: Option<String>,
    pub is_likely_bot: bool,
    pub device_type: String,
    pub ua_family: String,
    pub os_family: String,
    pub referrer_host: Option<String>,
    pub ip_hash: Option<String>,
    pub unique_fingerprint_hash: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tracer_link::Entity",
        from = "Column::TracerLinkId",
        to = "super::tracer_link::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TracerLink,
}

impl Related<super::tracer_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TracerLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
