//! MCP Tool definitions
//!
//! The fixed catalog of tools exposed to the host. Each tool maps to exactly
//! one Nomi API endpoint; the mapping itself lives in [`crate::handlers`].
//!
//! # Tool Categories
//!
//! ## Nomi Management
//! - `list_nomis` - List all Nomis on the account
//! - `get_nomi` - Get one Nomi
//! - `send_message_to_nomi` - Chat with a Nomi
//! - `get_nomi_avatar` - Get a Nomi's avatar
//!
//! ## Room Management
//! - `list_rooms` - List all rooms
//! - `create_room` - Create a room with 1-10 Nomis
//! - `get_room` - Get one room
//! - `update_room` - Partially update a room
//! - `delete_room` - Delete a room
//! - `send_room_message` - Post a message in a room
//! - `request_nomi_message` - Ask a Nomi to post in a room

use serde::{Deserialize, Serialize};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Concatenated text of all content blocks
    pub fn text_payload(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect()
    }
}

/// Get all available tool definitions, in the order presented to the host
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Nomi Management
        ToolDefinition {
            name: "list_nomis".to_string(),
            description: "List all Nomis associated with your account".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "get_nomi".to_string(),
            description: "Get details of a specific Nomi".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "nomi_id": {
                        "type": "string",
                        "description": "UUID of the Nomi"
                    }
                },
                "required": ["nomi_id"]
            }),
        },
        ToolDefinition {
            name: "send_message_to_nomi".to_string(),
            description: "Send a message to a specific Nomi and get their reply".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "nomi_id": {
                        "type": "string",
                        "description": "UUID of the Nomi"
                    },
                    "message": {
                        "type": "string",
                        "description": "Message text to send"
                    }
                },
                "required": ["nomi_id", "message"]
            }),
        },
        ToolDefinition {
            name: "get_nomi_avatar".to_string(),
            description: "Get the avatar URL of a specific Nomi".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "nomi_id": {
                        "type": "string",
                        "description": "UUID of the Nomi"
                    }
                },
                "required": ["nomi_id"]
            }),
        },
        // Room Management
        ToolDefinition {
            name: "list_rooms".to_string(),
            description: "List all rooms associated with your account".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "create_room".to_string(),
            description: "Create a new room with one or more Nomis".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Room name (100 characters max)"
                    },
                    "note": {
                        "type": "string",
                        "description": "Room note/description (1000 characters max)"
                    },
                    "backchanneling_enabled": {
                        "type": "boolean",
                        "description": "Enable backchanneling for the room"
                    },
                    "nomi_uuids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "maxItems": 10,
                        "description": "Array of Nomi UUIDs (min 1, max 10)"
                    }
                },
                "required": ["name", "note", "backchanneling_enabled", "nomi_uuids"]
            }),
        },
        ToolDefinition {
            name: "get_room".to_string(),
            description: "Get details of a specific room".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "room_id": {
                        "type": "string",
                        "description": "UUID of the room"
                    }
                },
                "required": ["room_id"]
            }),
        },
        ToolDefinition {
            name: "update_room".to_string(),
            description: "Update room information".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "room_id": {
                        "type": "string",
                        "description": "UUID of the room"
                    },
                    "name": {
                        "type": "string",
                        "description": "New room name (optional)"
                    },
                    "note": {
                        "type": "string",
                        "description": "New room note (optional)"
                    },
                    "nomi_uuids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "maxItems": 10,
                        "description": "New list of Nomi UUIDs (optional, min 1, max 10)"
                    },
                    "backchanneling_enabled": {
                        "type": "boolean",
                        "description": "Enable/disable backchanneling (optional)"
                    }
                },
                "required": ["room_id"]
            }),
        },
        ToolDefinition {
            name: "delete_room".to_string(),
            description: "Delete a specific room".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "room_id": {
                        "type": "string",
                        "description": "UUID of the room to delete"
                    }
                },
                "required": ["room_id"]
            }),
        },
        ToolDefinition {
            name: "send_room_message".to_string(),
            description: "Send a message in a specific room".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "room_id": {
                        "type": "string",
                        "description": "UUID of the room"
                    },
                    "message": {
                        "type": "string",
                        "description": "Message text to send"
                    }
                },
                "required": ["room_id", "message"]
            }),
        },
        ToolDefinition {
            name: "request_nomi_message".to_string(),
            description: "Request a specific Nomi to post a message in a room".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "room_id": {
                        "type": "string",
                        "description": "UUID of the room"
                    },
                    "nomi_uuid": {
                        "type": "string",
                        "description": "UUID of the Nomi to request a message from"
                    }
                },
                "required": ["room_id", "nomi_uuid"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn required_fields(tool: &ToolDefinition) -> Vec<&str> {
        tool.input_schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|fields| fields.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    fn find(name: &str) -> ToolDefinition {
        get_tool_definitions()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap()
    }

    #[test]
    fn test_tool_definitions_order() {
        let names: Vec<String> = get_tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "list_nomis",
                "get_nomi",
                "send_message_to_nomi",
                "get_nomi_avatar",
                "list_rooms",
                "create_room",
                "get_room",
                "update_room",
                "delete_room",
                "send_room_message",
                "request_nomi_message",
            ]
        );
    }

    #[test]
    fn test_tool_names_unique() {
        let tools = get_tool_definitions();
        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn test_tool_definitions_stable() {
        let first = serde_json::to_value(get_tool_definitions()).unwrap();
        let second = serde_json::to_value(get_tool_definitions()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_each_tool_has_valid_schema() {
        for tool in get_tool_definitions() {
            assert!(!tool.description.is_empty(), "{} lacks description", tool.name);
            let schema = tool.input_schema.as_object().unwrap();
            assert_eq!(
                schema.get("type").and_then(|v| v.as_str()),
                Some("object"),
                "Tool {} schema type should be 'object'",
                tool.name
            );
            let properties = schema.get("properties").and_then(|v| v.as_object()).unwrap();
            for field in required_fields(&tool) {
                assert!(
                    properties.contains_key(field),
                    "Tool {} requires undeclared field {}",
                    tool.name,
                    field
                );
            }
        }
    }

    #[test]
    fn test_required_fields() {
        assert!(required_fields(&find("list_nomis")).is_empty());
        assert!(required_fields(&find("list_rooms")).is_empty());
        assert_eq!(required_fields(&find("send_message_to_nomi")), vec!["nomi_id", "message"]);
        assert_eq!(
            required_fields(&find("create_room")),
            vec!["name", "note", "backchanneling_enabled", "nomi_uuids"]
        );
        assert_eq!(required_fields(&find("update_room")), vec!["room_id"]);
        assert_eq!(
            required_fields(&find("request_nomi_message")),
            vec!["room_id", "nomi_uuid"]
        );
    }

    #[test]
    fn test_room_member_list_bounds() {
        for name in ["create_room", "update_room"] {
            let tool = find(name);
            let members = &tool.input_schema["properties"]["nomi_uuids"];
            assert_eq!(members["type"], "array");
            assert_eq!(members["items"]["type"], "string");
            assert_eq!(members["minItems"], 1);
            assert_eq!(members["maxItems"], 10);
        }
    }

    #[test]
    fn test_tool_definition_serializes_camel_case() {
        let json = serde_json::to_value(find("get_nomi")).unwrap();
        assert!(json.get("inputSchema").is_some());
        assert!(json.get("input_schema").is_none());
    }

    #[test]
    fn test_tool_result_serialize() {
        let result = ToolResult::text("Hello, world!");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "Hello, world!");
        assert_eq!(json["isError"], false);

        let error_json = serde_json::to_value(ToolResult::error("Error: boom")).unwrap();
        assert_eq!(error_json["isError"], true);
    }

    #[test]
    fn test_text_payload() {
        assert_eq!(ToolResult::error("Error: x").text_payload(), "Error: x");
    }
}
