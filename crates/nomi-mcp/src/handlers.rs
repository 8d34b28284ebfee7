//! MCP Tool Handlers
//!
//! Translates tool calls into Nomi API requests. Each tool has one entry in
//! [`ROUTES`] pointing at a pure translation function that turns the argument
//! object into a [`RemoteCall`]. The [`Dispatcher`] resolves the credential,
//! runs the translation, performs the call and folds every outcome into a
//! [`ToolResult`] envelope.

use std::future::Future;
use std::sync::Arc;

use nomi_api::{NomiApi, RemoteCall};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::CredentialSource;
use crate::patch::Patch;
use crate::tools::ToolResult;
use crate::{Error, Result};

/// Tool call arguments
pub type Arguments = Map<String, Value>;

type Translate = fn(&Arguments) -> Result<RemoteCall>;

/// Dispatch table entry: tool name to request translation
pub struct Route {
    pub name: &'static str,
    translate: Translate,
}

impl Route {
    pub fn translate(&self, arguments: &Arguments) -> Result<RemoteCall> {
        (self.translate)(arguments)
    }
}

/// Every tool the dispatcher knows how to execute
pub const ROUTES: &[Route] = &[
    // Nomi Management
    Route {
        name: "list_nomis",
        translate: list_nomis,
    },
    Route {
        name: "get_nomi",
        translate: get_nomi,
    },
    Route {
        name: "send_message_to_nomi",
        translate: send_message_to_nomi,
    },
    Route {
        name: "get_nomi_avatar",
        translate: get_nomi_avatar,
    },
    // Room Management
    Route {
        name: "list_rooms",
        translate: list_rooms,
    },
    Route {
        name: "create_room",
        translate: create_room,
    },
    Route {
        name: "get_room",
        translate: get_room,
    },
    Route {
        name: "update_room",
        translate: update_room,
    },
    Route {
        name: "delete_room",
        translate: delete_room,
    },
    Route {
        name: "send_room_message",
        translate: send_room_message,
    },
    Route {
        name: "request_nomi_message",
        translate: request_nomi_message,
    },
];

/// Look up a route by tool name
pub fn find_route(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Translate a tool call into the request it stands for
pub fn translate(name: &str, arguments: &Arguments) -> Result<RemoteCall> {
    let route = find_route(name).ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
    route.translate(arguments)
}

/// Executes tool calls against the Nomi API
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn NomiApi>,
    credentials: CredentialSource,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn NomiApi>, credentials: CredentialSource) -> Self {
        Self { api, credentials }
    }

    /// Run a tool call to completion
    ///
    /// Always yields exactly one envelope; failures become `isError: true`
    /// results whose text is `Error: <message>`.
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        match self.execute(name, arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => failure(name, e),
        }
    }

    /// Like [`Dispatcher::invoke`], but gives up when `cancelled` resolves
    ///
    /// Dropping the in-flight call aborts the pending HTTP request; the caller
    /// still receives an error envelope carrying the cancellation reason.
    pub async fn invoke_until<F>(&self, name: &str, arguments: Value, cancelled: F) -> ToolResult
    where
        F: Future<Output = Option<String>>,
    {
        tokio::select! {
            result = self.invoke(name, arguments) => result,
            reason = cancelled => failure(name, Error::Cancelled { reason }),
        }
    }

    async fn execute(&self, name: &str, arguments: Value) -> Result<String> {
        let arguments = match arguments {
            Value::Null => return Err(Error::MissingArguments),
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidArguments {
                    message: format!("expected an object, got {}", json_type(&other)),
                });
            }
        };

        let credential = self.credentials.resolve()?;
        let call = translate(name, &arguments)?;

        tracing::debug!(tool = %name, method = %call.method, path = %call.path(), "Dispatching tool call");

        let result = self.api.call(&credential, &call).await?;
        Ok(serde_json::to_string_pretty(&result)?)
    }
}

fn failure(name: &str, error: Error) -> ToolResult {
    tracing::warn!(tool = %name, error = %error, "Tool call failed");
    ToolResult::error(format!("Error: {}", error))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Argument extraction
// ============================================================================

/// Read an identifier that becomes a path segment
///
/// Strings are used as-is and other scalars by their JSON text. Missing, null
/// or empty identifiers are rejected, since they would address a different
/// endpoint.
fn path_param(arguments: &Arguments, key: &str) -> Result<String> {
    let id = match arguments.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    id.filter(|id| !id.is_empty())
        .ok_or_else(|| Error::InvalidArguments {
            message: format!("missing required argument: {}", key),
        })
}

/// Build a JSON body by copying `(argument, body field)` pairs
///
/// Values are copied untouched so the remote service validates their types.
/// Arguments that were not supplied are left out.
fn body(arguments: &Arguments, fields: &[(&str, &str)]) -> Value {
    let mut body = Map::new();
    for (argument, field) in fields {
        if let Some(value) = arguments.get(*argument) {
            body.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(body)
}

/// Partial room update; only supplied attributes are sent
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<Value>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub note: Patch<Value>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub nomi_uuids: Patch<Value>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub backchanneling_enabled: Patch<Value>,
}

impl RoomUpdate {
    pub fn from_arguments(arguments: &Arguments) -> Self {
        let field = |key: &str| Patch::from(arguments.get(key).cloned());
        Self {
            name: field("name"),
            note: field("note"),
            nomi_uuids: field("nomi_uuids"),
            backchanneling_enabled: field("backchanneling_enabled"),
        }
    }
}

// ============================================================================
// Nomi Management
// ============================================================================

fn list_nomis(_arguments: &Arguments) -> Result<RemoteCall> {
    Ok(RemoteCall::get(["nomis"]))
}

fn get_nomi(arguments: &Arguments) -> Result<RemoteCall> {
    let nomi_id = path_param(arguments, "nomi_id")?;
    Ok(RemoteCall::get(["nomis".to_string(), nomi_id]))
}

fn send_message_to_nomi(arguments: &Arguments) -> Result<RemoteCall> {
    let nomi_id = path_param(arguments, "nomi_id")?;
    Ok(RemoteCall::post(
        ["nomis".to_string(), nomi_id, "chat".to_string()],
        body(arguments, &[("message", "messageText")]),
    ))
}

fn get_nomi_avatar(arguments: &Arguments) -> Result<RemoteCall> {
    let nomi_id = path_param(arguments, "nomi_id")?;
    Ok(RemoteCall::get([
        "nomis".to_string(),
        nomi_id,
        "avatar".to_string(),
    ]))
}

// ============================================================================
// Room Management
// ============================================================================

fn list_rooms(_arguments: &Arguments) -> Result<RemoteCall> {
    Ok(RemoteCall::get(["rooms"]))
}

fn create_room(arguments: &Arguments) -> Result<RemoteCall> {
    Ok(RemoteCall::post(
        ["rooms"],
        body(
            arguments,
            &[
                ("name", "name"),
                ("note", "note"),
                ("backchanneling_enabled", "backchannelingEnabled"),
                ("nomi_uuids", "nomiUuids"),
            ],
        ),
    ))
}

fn get_room(arguments: &Arguments) -> Result<RemoteCall> {
    let room_id = path_param(arguments, "room_id")?;
    Ok(RemoteCall::get(["rooms".to_string(), room_id]))
}

fn update_room(arguments: &Arguments) -> Result<RemoteCall> {
    let room_id = path_param(arguments, "room_id")?;
    let update = RoomUpdate::from_arguments(arguments);
    Ok(RemoteCall::put(
        ["rooms".to_string(), room_id],
        serde_json::to_value(update)?,
    ))
}

fn delete_room(arguments: &Arguments) -> Result<RemoteCall> {
    let room_id = path_param(arguments, "room_id")?;
    Ok(RemoteCall::delete(["rooms".to_string(), room_id]))
}

fn send_room_message(arguments: &Arguments) -> Result<RemoteCall> {
    let room_id = path_param(arguments, "room_id")?;
    Ok(RemoteCall::post(
        ["rooms".to_string(), room_id, "chat".to_string()],
        body(arguments, &[("message", "messageText")]),
    ))
}

fn request_nomi_message(arguments: &Arguments) -> Result<RemoteCall> {
    let room_id = path_param(arguments, "room_id")?;
    Ok(RemoteCall::post(
        [
            "rooms".to_string(),
            room_id,
            "chat".to_string(),
            "request".to_string(),
        ],
        body(arguments, &[("nomi_uuid", "nomiUuid")]),
    ))
}
