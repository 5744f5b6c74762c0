//! Domain models shared by the recurrence engine, the scorer and the
//! persistence layer.

pub mod macros;

pub mod directory;
pub mod interaction;
pub mod recurrence;
pub mod reminder;
pub mod score;
pub mod slot;

crate::define_id_type!(i64, TemplateId);
crate::define_id_type!(i64, SlotId);
crate::define_id_type!(i64, ContactId);
crate::define_id_type!(i64, FamilyId);
crate::define_id_type!(i64, GroupId);
crate::define_id_type!(i64, InteractionId);
crate::define_id_type!(i64, ReminderId);

pub use directory::*;
pub use interaction::*;
pub use recurrence::*;
pub use reminder::*;
pub use score::*;
pub use slot::*;
