use crate::storage::{ClickEvent, NewClickEvent, NewTracerLink, TracerLink};
use migration::entities::{tracer_click_event, tracer_link};

/// 将 Sea-ORM Model 转换为 TracerLink
pub fn model_to_tracer_link(model: tracer_link::Model) -> TracerLink {
    TracerLink {
        id: model.id,
        token: model.token,
        job_id: model.job_id,
        source_path: model.source_path,
        source_label: model.source_label,
        destination_url: model.destination_url,
        destination_url_hash: model.destination_url_hash,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 新链接的 ActiveModel（id 为新的 UUID v4）
pub fn new_link_active_model(link: &NewTracerLink, token: &str) -> tracer_link::ActiveModel {
    use sea_orm::ActiveValue::Set;

    let now = chrono::Utc::now();
    tracer_link::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        token: Set(token.to_string()),
        job_id: Set(link.job_id.clone()),
        source_path: Set(link.source_path.clone()),
        source_label: Set(link.source_label.clone()),
        destination_url: Set(link.destination_url.clone()),
        destination_url_hash: Set(link.destination_url_hash.clone()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

pub fn model_to_click_event(model: tracer_click_event::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        tracer_link_id: model.tracer_link_id,
        clicked_at: model.clicked_at,
        request_id: model.request_id,
        is_likely_bot: model.is_likely_bot,
        device_type: model.device_type,
        ua_family: model.ua_family,
        os_family: model.os_family,
        referrer_host: model.referrer_host,
        ip_hash: model.ip_hash,
        unique_fingerprint_hash: model.unique_fingerprint_hash,
    }
}

pub fn click_event_active_model(event: &NewClickEvent) -> tracer_click_event::ActiveModel {
    use sea_orm::ActiveValue::{NotSet, Set};

    tracer_click_event::ActiveModel {
        id: NotSet,
        tracer_link_id: Set(event.tracer_link_id.clone()),
        clicked_at: Set(event.clicked_at),
        request_id: Set(event.request_id.clone()),
        is_likely_bot: Set(event.is_likely_bot),
        device_type: Set(event.device_type.clone()),
        ua_family: Set(event.ua_family.clone()),
        os_family: Set(event.os_family.clone()),
        referrer_host: Set(event.referrer_host.clone()),
        ip_hash: Set(event.ip_hash.clone()),
        unique_fingerprint_hash: Set(event.unique_fingerprint_hash.clone()),
    }
}
