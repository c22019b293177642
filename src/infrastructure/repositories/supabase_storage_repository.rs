use super::storage_repository::StorageRepository;
use async_trait::async_trait;

/// Supabase Storage implementation of the blob store.
///
/// Objects live under a single bucket; the service key authorizes admin
/// operations. Public URLs follow the fixed
/// `/storage/v1/object/public/{bucket}/{path}` scheme.
pub struct SupabaseStorageRepository {
    base_url: String,
    service_key: String,
    bucket: String,
    http_client: reqwest::Client,
}

impl SupabaseStorageRepository {
    pub fn new(base_url: String, service_key: String, bucket: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
            http_client: reqwest::Client::new(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl StorageRepository for SupabaseStorageRepository {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String> {
        let response = self
            .http_client
            .post(self.object_url(path))
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", content_type)
            // Overwrite on re-record of the same voice name
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| format!("storage upload failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("storage upload rejected ({}): {}", status, body));
        }

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/storage/v1/object/public/{}/", self.base_url, self.bucket);
        url.strip_prefix(&prefix)
            .filter(|p| !p.is_empty())
            .map(|p| p.to_string())
    }

    async fn remove(&self, path: &str) -> Result<(), String> {
        let response = self
            .http_client
            .delete(self.object_url(path))
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await
            .map_err(|e| format!("storage delete failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("storage delete rejected ({}): {}", status, body));
        }

        Ok(())
    }
}
