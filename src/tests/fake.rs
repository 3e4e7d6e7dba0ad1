use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::api::{ApiDnsRecord, ApiError, DnsApiClient, RecordBody, RecordType};

/// In-memory zone. Names listed in `failing` reject every request.
#[derive(Default)]
pub struct FakeZone {
    records: Mutex<Vec<ApiDnsRecord>>,
    failing: HashSet<String>,
    writes: Mutex<Vec<String>>,
}

impl FakeZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_record(self, id: &str, name: &str, content: &str) -> Self {
        self.records.lock().unwrap().push(ApiDnsRecord {
            id: id.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            r#type: "A".to_string(),
            proxied: false,
            ttl: 300,
        });
        self
    }

    /// Mutating calls so far, as "POST name" / "PUT id".
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn content_of(&self, name: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.content.clone())
    }

    fn check(&self, name: &str) -> Result<(), ApiError> {
        if self.failing.contains(name) {
            return Err(ApiError::Provider {
                status: 500,
                errors: vec![json!({ "code": 1000, "message": "internal error" })],
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DnsApiClient for FakeZone {
    async fn list_records(
        &self,
        _zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ApiDnsRecord>, ApiError> {
        self.check(name)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name == name && r.r#type == record_type.as_str())
            .cloned()
            .collect())
    }

    async fn create_record(
        &self,
        _zone_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError> {
        self.check(&body.name)?;
        let mut records = self.records.lock().unwrap();
        let record = ApiDnsRecord {
            id: format!("rec-{}", records.len() + 1),
            name: body.name.clone(),
            content: body.content.clone(),
            r#type: body.r#type.to_string(),
            proxied: body.proxied,
            ttl: body.ttl,
        };
        records.push(record.clone());
        self.writes.lock().unwrap().push(format!("POST {}", body.name));
        Ok(record)
    }

    async fn update_record(
        &self,
        _zone_id: &str,
        record_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError> {
        self.check(&body.name)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .expect("update of unknown record");
        record.content = body.content.clone();
        record.ttl = body.ttl;
        record.proxied = body.proxied;
        self.writes.lock().unwrap().push(format!("PUT {}", record_id));
        Ok(record.clone())
    }
}
