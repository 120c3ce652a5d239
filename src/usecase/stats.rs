use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditStats {
    pub cleared: usize,
    pub removed: usize,
    pub not_found: usize,
    pub added: usize,
    pub duplicates_skipped: usize,
}
