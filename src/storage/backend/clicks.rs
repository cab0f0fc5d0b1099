//! Click event persistence

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{click_event_active_model, model_to_click_event};
use super::retry;
use crate::errors::{Result, TracerError};
use crate::storage::{ClickEvent, NewClickEvent};

use migration::entities::tracer_click_event;

impl SeaOrmStorage {
    /// 写入一条点击事件
    pub async fn record_click(&self, event: &NewClickEvent) -> Result<()> {
        let db = &self.db;
        retry::with_retry("record_click", self.retry_config, || async {
            tracer_click_event::Entity::insert(click_event_active_model(event))
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| TracerError::database_operation(format!("写入点击事件失败: {}", e)))?;

        debug!(
            "Click recorded for link {} (bot: {}, device: {})",
            event.tracer_link_id, event.is_likely_bot, event.device_type
        );
        Ok(())
    }

    /// 某链接的全部点击事件，按时间升序
    pub async fn list_link_clicks(&self, tracer_link_id: &str) -> Result<Vec<ClickEvent>> {
        let db = &self.db;
        let models = retry::with_retry("list_link_clicks", self.retry_config, || async {
            tracer_click_event::Entity::find()
                .filter(tracer_click_event::Column::TracerLinkId.eq(tracer_link_id))
                .order_by_asc(tracer_click_event::Column::ClickedAt)
                .order_by_asc(tracer_click_event::Column::Id)
                .all(db)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_click_event).collect())
    }
}
