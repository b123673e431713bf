//! # Content Resolver
//!
//! Dispatches on `StorageType`:
//!
//! | Type | Source |
//! |------|--------|
//! | 0 embedded | inline payload, else `<type>+<title>+<body>` |
//! | 1 IPFS | `ContentStore::get_by_pointer` |
//! | 2 direct | inline payload |
//! | 3 subgraph | inline raw JSON, else two query shapes in sequence |
//! | 4 chat | stored chat/video/space message |

use crate::domain::entities::{ChatPointer, ContentConfig, SubgraphPointer};
use crate::domain::errors::ContentError;
use crate::domain::formatter::{
    embedded_payload, format_chat_message, format_subgraph_notification, normalize_recipients,
};
use crate::ports::inbound::ContentApi;
use crate::ports::outbound::ContentStore;
use async_trait::async_trait;
use np_01_payload_codec::{PayloadIdentity, StorageType};
use serde_json::Value;
use shared_types::ChatDirectory;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ContentResolver {
    store: Arc<dyn ContentStore>,
    chats: Arc<dyn ChatDirectory>,
    config: ContentConfig,
}

impl ContentResolver {
    pub fn new(
        store: Arc<dyn ContentStore>,
        chats: Arc<dyn ChatDirectory>,
        config: ContentConfig,
    ) -> Self {
        Self {
            store,
            chats,
            config,
        }
    }

    async fn resolve_ipfs(&self, cid: &str) -> Result<Value, ContentError> {
        let mut payload = self
            .store
            .get_by_pointer(cid)
            .await
            .map_err(|e| ContentError::Ipfs(e.to_string()))?;
        if !payload.is_object() {
            return Err(ContentError::Ipfs(format!("{cid} is not a JSON object")));
        }
        normalize_recipients(&mut payload);
        Ok(payload)
    }

    async fn resolve_subgraph(&self, pointer: &str) -> Result<Value, ContentError> {
        let pointer = SubgraphPointer::parse(pointer)?;
        let endpoint = self.config.subgraph_endpoint(&pointer.subgraph_id);

        let mut last_error = ContentError::Subgraph("no query attempted".into());
        for (field, query) in pointer.queries() {
            match self.fetch_subgraph_record(&endpoint, field, &query).await {
                Ok(record) => return format_subgraph_notification(&record),
                Err(e) => {
                    debug!("[np-03] Subgraph query {} failed: {}", field, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn fetch_subgraph_record(
        &self,
        endpoint: &str,
        field: &str,
        query: &str,
    ) -> Result<Value, ContentError> {
        let response = self
            .store
            .query(endpoint, query)
            .await
            .map_err(|e| ContentError::Subgraph(e.to_string()))?;
        if let Some(errors) = response.get("errors") {
            return Err(ContentError::Subgraph(errors.to_string()));
        }
        response
            .get("data")
            .and_then(|data| data.get(field))
            .and_then(Value::as_array)
            .and_then(|records| records.first())
            .cloned()
            .ok_or_else(|| ContentError::Subgraph(format!("{field}: no matching record")))
    }

    async fn resolve_chat(&self, pointer: &str) -> Result<Value, ContentError> {
        let pointer = ChatPointer::parse(pointer)?;
        let reference = pointer.reference();
        let message = self
            .chats
            .get_message_by_reference(&reference)
            .await?
            .ok_or_else(|| ContentError::Chat(format!("message {reference} not found")))?;
        Ok(format_chat_message(pointer.kind, &message))
    }
}

#[async_trait]
impl ContentApi for ContentResolver {
    async fn resolve(
        &self,
        identity: &PayloadIdentity,
        inline: Option<&Value>,
    ) -> Result<Value, ContentError> {
        let pointer = identity.storage_pointer.as_str();
        let result = match identity.storage_type {
            StorageType::Embedded => match inline {
                Some(payload) => Ok(payload.clone()),
                None => embedded_payload(pointer),
            },
            StorageType::Ipfs => self.resolve_ipfs(pointer).await,
            StorageType::Direct => match inline {
                Some(payload) => {
                    let mut payload = payload.clone();
                    normalize_recipients(&mut payload);
                    Ok(payload)
                }
                None => Err(ContentError::InvalidPayload(
                    "direct identity without a payload".into(),
                )),
            },
            StorageType::Subgraph => match inline {
                Some(raw) if raw.get("notification").is_some_and(Value::is_string) => {
                    format_subgraph_notification(raw)
                }
                Some(raw) => {
                    let mut payload = raw.clone();
                    normalize_recipients(&mut payload);
                    Ok(payload)
                }
                None => self.resolve_subgraph(pointer).await,
            },
            StorageType::Chat => self.resolve_chat(pointer).await,
        };

        if let Err(e) = &result {
            warn!(
                storage_type = identity.storage_type.code(),
                "[np-03] {}", e
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::ContentStoreError;
    use parking_lot::RwLock;
    use serde_json::json;
    use shared_types::{ChatMessage, InMemoryDirectory};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStore {
        documents: HashMap<String, Value>,
        /// query field -> response
        responses: HashMap<String, Value>,
        queried: RwLock<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ContentStore for MockStore {
        async fn get_by_pointer(&self, pointer: &str) -> Result<Value, ContentStoreError> {
            self.documents
                .get(pointer)
                .cloned()
                .ok_or_else(|| ContentStoreError::NotFound(pointer.to_string()))
        }

        async fn query(&self, endpoint: &str, query: &str) -> Result<Value, ContentStoreError> {
            self.queried
                .write()
                .push((endpoint.to_string(), query.to_string()));
            self.responses
                .iter()
                .find(|(field, _)| query.contains(&format!("{{ {field}(")))
                .map(|(_, response)| response.clone())
                .ok_or_else(|| ContentStoreError::Backend("query failed".into()))
        }
    }

    fn resolver(store: MockStore, chats: Arc<InMemoryDirectory>) -> (ContentResolver, Arc<MockStore>) {
        let store = Arc::new(store);
        let config = ContentConfig {
            ipfs_gateway: "http://ipfs".into(),
            subgraph_base_url: "http://graph".into(),
        };
        (ContentResolver::new(store.clone(), chats, config), store)
    }

    fn identity(text: &str) -> PayloadIdentity {
        PayloadIdentity::decode_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_embedded_without_inline() {
        let (resolver, _) = resolver(MockStore::default(), Arc::new(InMemoryDirectory::new()));
        let payload = resolver
            .resolve(&identity("0+1+Title+Body"), None)
            .await
            .unwrap();
        assert_eq!(payload["notification"]["title"], "Title");
        assert_eq!(payload["data"]["type"], "1");
    }

    #[tokio::test]
    async fn test_ipfs_normalizes_recipients() {
        let mut store = MockStore::default();
        store.documents.insert(
            "bafycid".into(),
            json!({"notification": {"title": "t"}, "recipients": {"eip155:1:0xa": null}}),
        );
        let (resolver, _) = resolver(store, Arc::new(InMemoryDirectory::new()));

        let payload = resolver.resolve(&identity("1+bafycid"), None).await.unwrap();
        assert_eq!(payload["recipients"], json!({"0xa": null}));

        let missing = resolver.resolve(&identity("1+missing"), None).await;
        assert!(matches!(missing, Err(ContentError::Ipfs(_))));
    }

    #[tokio::test]
    async fn test_direct_uses_inline_payload() {
        let (resolver, _) = resolver(MockStore::default(), Arc::new(InMemoryDirectory::new()));
        let id = identity(r#"2+{"recipients":"eip155:1:0xabc","data":{"type":"3"}}"#);
        let inline = id.inline_json();

        let payload = resolver.resolve(&id, inline.as_ref()).await.unwrap();
        assert_eq!(payload["recipients"], "0xabc");

        assert!(matches!(
            resolver.resolve(&id, None).await,
            Err(ContentError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_subgraph_falls_back_to_second_query() {
        let mut store = MockStore::default();
        store.responses.insert(
            "pushNotifications".into(),
            json!({"data": {"pushNotifications": [{
                "notificationNumber": "7",
                "recipient": "0xabc",
                "notification": json!({"type": 1, "title": "T", "body": "B"}).to_string()
            }]}}),
        );
        let (resolver, store) = resolver(store, Arc::new(InMemoryDirectory::new()));

        let payload = resolver
            .resolve(&identity("3+graph:org/sub+7"), None)
            .await
            .unwrap();
        assert_eq!(payload["notification"]["title"], "T");

        let queried = store.queried.read();
        assert_eq!(queried.len(), 2);
        assert_eq!(queried[0].0, "http://graph/org/sub");
        assert!(queried[0].1.contains("epnsPushNotifications"));
    }

    #[tokio::test]
    async fn test_subgraph_both_queries_fail() {
        let (resolver, _) = resolver(MockStore::default(), Arc::new(InMemoryDirectory::new()));
        let result = resolver.resolve(&identity("3+graph:org/sub+7"), None).await;
        assert!(matches!(result, Err(ContentError::Subgraph(_))));
    }

    #[tokio::test]
    async fn test_subgraph_inline_raw_record() {
        let (resolver, store) = resolver(MockStore::default(), Arc::new(InMemoryDirectory::new()));
        let raw = json!({
            "recipient": "0xabc",
            "notification": json!({"type": 3, "title": "T", "body": "B"}).to_string()
        });
        let id = identity(&format!("3+{raw}"));
        let inline = id.inline_json();

        let payload = resolver.resolve(&id, inline.as_ref()).await.unwrap();
        assert_eq!(payload["data"]["type"], "3");
        assert!(store.queried.read().is_empty());
    }

    #[tokio::test]
    async fn test_chat_message_lookup() {
        let chats = Arc::new(InMemoryDirectory::new());
        chats.insert_message(ChatMessage {
            reference: "v2:bafymsg".into(),
            from_did: "eip155:0xaaa".into(),
            to_did: "eip155:0xbbb".into(),
            message_type: "Text".into(),
            message_content: "hello".into(),
            ..Default::default()
        });
        let (resolver, _) = resolver(MockStore::default(), chats);

        let payload = resolver
            .resolve(&identity("4+chat:bafymsg"), None)
            .await
            .unwrap();
        assert_eq!(payload["notification"]["body"], "hello");

        assert!(matches!(
            resolver.resolve(&identity("4+chat:unknown"), None).await,
            Err(ContentError::Chat(_))
        ));
    }
}
