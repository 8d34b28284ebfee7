//! Presence-tracking field wrapper for partial updates

use serde::{Serialize, Serializer};

/// A field of a partial update
///
/// `Absent` fields are left out of the serialized payload entirely (use with
/// `#[serde(skip_serializing_if = "Patch::is_absent")]`). `Set` fields are
/// always sent, even when the value is `null`, so "not supplied" and
/// "explicitly cleared" stay distinct on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent => serializer.serialize_none(),
            Patch::Set(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[derive(Serialize)]
    struct Probe {
        #[serde(skip_serializing_if = "Patch::is_absent")]
        a: Patch<Value>,
        #[serde(skip_serializing_if = "Patch::is_absent")]
        b: Patch<Value>,
    }

    #[test]
    fn absent_fields_are_omitted() {
        let probe = Probe {
            a: Patch::Set(json!("x")),
            b: Patch::Absent,
        };
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({"a": "x"}));
    }

    #[test]
    fn explicit_null_is_sent() {
        let probe = Probe {
            a: Patch::Set(Value::Null),
            b: Patch::Absent,
        };
        assert_eq!(serde_json::to_value(&probe).unwrap(), json!({"a": null}));
    }

    #[test]
    fn from_option() {
        assert!(Patch::<i32>::from(None).is_absent());
        assert_eq!(Patch::from(Some(3)), Patch::Set(3));
    }
}
