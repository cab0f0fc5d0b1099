pub mod tracer_click_event;
pub mod tracer_link;

pub use tracer_click_event::Entity as TracerClickEventEntity;
pub use tracer_link::Entity as TracerLinkEntity;
