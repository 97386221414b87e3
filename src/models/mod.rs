// src/models/mod.rs
pub mod change;
pub mod outreach;
pub mod profile;

pub use change::{Change, ChangeCategory};
pub use outreach::OutreachRecord;
pub use profile::{EducationEntry, OutreachStatus, Profile, TrackingStatus};
