pub mod clinician;
pub mod draft;
pub mod epds;
pub mod record;
pub mod result;
