pub use super::campaign::Entity as Campaign;
pub use super::character::Entity as Character;
pub use super::item::Entity as Item;
pub use super::location::Entity as Location;
pub use super::lore::Entity as Lore;
pub use super::organization::Entity as Organization;
pub use super::organization_member::Entity as OrganizationMember;
pub use super::sea_orm_active_enums::EntityKind;
pub use super::session_entity::Entity as SessionEntity;
pub use super::session_summary::Entity as SessionSummary;
