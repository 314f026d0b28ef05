pub mod prelude;

pub mod campaign;
pub mod character;
pub mod item;
pub mod location;
pub mod lore;
pub mod organization;
pub mod organization_member;
pub mod sea_orm_active_enums;
pub mod session_entity;
pub mod session_summary;

pub use sea_orm_active_enums::EntityKind;
