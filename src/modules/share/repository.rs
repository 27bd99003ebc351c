use crate::modules::share::schema::ShareRecord;

/// Registry of live shares keyed by code.
#[async_trait::async_trait]
pub trait ShareRepository {
    /// Insert a record, silently replacing any record under the same code.
    async fn put(&self, code: &str, record: ShareRecord);

    async fn get(&self, code: &str) -> Option<ShareRecord>;

    /// Remove a record. Backing files are the caller's concern.
    async fn delete(&self, code: &str) -> Option<ShareRecord>;

    /// Snapshot of the current codes, safe to iterate while the registry changes.
    async fn all_codes(&self) -> Vec<String>;
}
