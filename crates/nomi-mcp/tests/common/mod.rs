//! Shared test doubles for nomi-mcp integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nomi_api::{ApiError, NomiApi, RemoteCall};
use nomi_mcp::{CredentialSource, Dispatcher, NomiMcpServer};
use serde_json::Value;

pub const TEST_KEY: &str = "test-api-key";

/// How the fake API answers every call
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Remote { status: u16, message: &'static str },
    Transport(&'static str),
    /// Never completes
    Hang,
}

/// Records every request and answers with a fixed reply
pub struct FakeApi {
    reply: Reply,
    calls: Mutex<Vec<(String, RemoteCall)>>,
}

impl FakeApi {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(value: Value) -> Arc<Self> {
        Self::new(Reply::Json(value))
    }

    pub fn calls(&self) -> Vec<(String, RemoteCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> RemoteCall {
        self.calls()
            .pop()
            .map(|(_, call)| call)
            .expect("no call recorded")
    }
}

#[async_trait]
impl NomiApi for FakeApi {
    async fn call(&self, credential: &str, request: &RemoteCall) -> nomi_api::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));

        match &self.reply {
            Reply::Json(value) => Ok(value.clone()),
            Reply::Remote { status, message } => Err(ApiError::Remote {
                status: *status,
                message: message.to_string(),
            }),
            Reply::Transport(message) => Err(ApiError::Transport {
                message: message.to_string(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn credentials() -> CredentialSource {
    CredentialSource::Fixed(Some(TEST_KEY.to_string()))
}

pub fn dispatcher(api: Arc<FakeApi>) -> Dispatcher {
    Dispatcher::new(api, credentials())
}

pub fn server(api: Arc<FakeApi>) -> NomiMcpServer {
    NomiMcpServer::with_api(api, credentials())
}

/// Every tool name paired with arguments that satisfy its schema
pub fn valid_calls() -> Vec<(&'static str, Value)> {
    use serde_json::json;
    vec![
        ("list_nomis", json!({})),
        ("get_nomi", json!({"nomi_id": "n1"})),
        ("send_message_to_nomi", json!({"nomi_id": "n1", "message": "hi"})),
        ("get_nomi_avatar", json!({"nomi_id": "n1"})),
        ("list_rooms", json!({})),
        (
            "create_room",
            json!({
                "name": "Den",
                "note": "evening chat",
                "backchanneling_enabled": true,
                "nomi_uuids": ["n1", "n2"]
            }),
        ),
        ("get_room", json!({"room_id": "r1"})),
        ("update_room", json!({"room_id": "r1", "name": "Lounge"})),
        ("delete_room", json!({"room_id": "r1"})),
        ("send_room_message", json!({"room_id": "r1", "message": "hello all"})),
        ("request_nomi_message", json!({"room_id": "r1", "nomi_uuid": "n2"})),
    ]
}
