use async_trait::async_trait;

/// Repository for durable blob storage of voice clips.
/// Abstracts the object store so the upload/delete handlers depend only on
/// put/remove-by-path plus public URL resolution.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload a blob at the given path, overwriting any existing object
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), String>;

    /// Resolve the durable public URL for a stored object
    fn public_url(&self, path: &str) -> String;

    /// Derive the object path back from a public URL, if it points into
    /// this store
    fn path_from_url(&self, url: &str) -> Option<String>;

    /// Remove the object at the given path
    async fn remove(&self, path: &str) -> Result<(), String>;
}
