//! Presentation adapter
//! Reference-data catalogs and the form field the host page persists the plan through

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::codec;
use crate::config::EditorConfig;
use crate::editor::{Editor, Effect};
use crate::plan::{MachineType, Plan};

#[cfg(test)]
mod tests;

/// One entry of the zone-type reference list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneType {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
}

/// Reference data may key zone types by number or by string
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "zone type id must be a string or number, got {}",
            other
        ))),
    }
}

/// Display names for zone and machine types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    zone_types: Vec<ZoneType>,
}

impl Catalog {
    pub fn new(zone_types: Vec<ZoneType>) -> Self {
        Self { zone_types }
    }

    /// Build from a reference-data payload (`[{id, name}, ...]`). Malformed entries
    /// are skipped.
    pub fn from_reference_data(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            log::warn!("zone-type reference data is not a list");
            return Self::default();
        };
        let zone_types = items
            .iter()
            .filter_map(|item| match ZoneType::deserialize(item) {
                Ok(zone_type) => Some(zone_type),
                Err(e) => {
                    log::warn!("skipping zone type {}: {}", item, e);
                    None
                }
            })
            .collect();
        Self { zone_types }
    }

    pub fn zone_types(&self) -> &[ZoneType] {
        &self.zone_types
    }

    /// Display name for a zone-type id, falling back to the id itself
    pub fn zone_type_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.zone_types
            .iter()
            .find(|t| t.id == id)
            .map_or(id, |t| t.name.as_str())
    }

    pub fn machine_types(&self) -> &'static [MachineType] {
        &MachineType::ALL
    }

    pub fn machine_type_name(&self, machine_type: MachineType) -> &'static str {
        machine_type.label()
    }
}

/// The single host form value the editor reads on load and writes after each commit
pub trait FormField {
    fn value(&self) -> Option<&Value>;
    fn set_value(&mut self, value: Value);
}

/// In-memory form field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonField {
    value: Option<Value>,
    /// Number of writes, so hosts can tell when the payload changed
    pub revision: u64,
}

impl JsonField {
    pub fn new(value: Option<Value>) -> Self {
        Self { value, revision: 0 }
    }
}

impl FormField for JsonField {
    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn set_value(&mut self, value: Value) {
        self.value = Some(value);
        self.revision += 1;
    }
}

/// Connects an editor to a host form field
pub struct PlanBinding<F: FormField> {
    field: F,
}

impl<F: FormField> PlanBinding<F> {
    pub fn new(field: F) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Plan currently stored in the field (empty if none or unreadable)
    pub fn stored_plan(&self) -> Plan {
        self.field.value().map(codec::deserialize).unwrap_or_default()
    }

    /// Open an editor on the stored plan
    pub fn open_editor(&self, config: &EditorConfig) -> Editor {
        Editor::with_plan(self.stored_plan(), config)
    }

    /// Mirror the plan into the field when the effects include a commit.
    /// Returns `true` when the field was written.
    pub fn apply(&mut self, editor: &Editor, effects: &[Effect]) -> bool {
        if !effects.contains(&Effect::Persist) {
            return false;
        }
        self.field.set_value(codec::serialize(editor.plan()));
        true
    }

    pub fn into_field(self) -> F {
        self.field
    }
}
