use super::{error::ApiError, models::*};
use async_trait::async_trait;

#[async_trait]
pub trait DnsApiClient: Send + Sync {
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ApiDnsRecord>, ApiError>;

    async fn create_record(
        &self,
        zone_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError>;

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError>;
}

#[async_trait]
impl<T: DnsApiClient + ?Sized> DnsApiClient for std::sync::Arc<T> {
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ApiDnsRecord>, ApiError> {
        (**self).list_records(zone_id, name, record_type).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError> {
        (**self).create_record(zone_id, body).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError> {
        (**self).update_record(zone_id, record_id, body).await
    }
}
