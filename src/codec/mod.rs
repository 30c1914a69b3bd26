//! Plan Codec
//! Plan <-> JSON. Encoding is a straight serde dump; decoding walks the JSON by hand
//! so that any value, however damaged, still yields a plan inside the invariants.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::geometry::{normalize_rotation, snap};
use crate::plan::{
    next_id, serial_for, DoorPoint, MachineItem, MachineStatus, MachineType, Plan, ZoneItem,
    MACHINE_MIN_H, MACHINE_MIN_W, ZONE_DEFAULT_H, ZONE_DEFAULT_W, ZONE_MIN_H, ZONE_MIN_W,
};

#[cfg(test)]
mod tests;

/// Zone type used when the stored one is missing
pub const DEFAULT_ZONE_TYPE: &str = "GENERAL";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed plan JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode a plan as the JSON value stored in the host form
pub fn serialize(plan: &Plan) -> Value {
    match serde_json::to_value(plan) {
        Ok(value) => value,
        Err(e) => {
            // Only reachable through non-string map keys, which Plan never has.
            log::error!("plan encoding failed: {}", e);
            Value::Null
        }
    }
}

pub fn to_json_string(plan: &Plan) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Decode a stored value: either the plan object itself or a JSON string holding it.
/// Never fails; anything unusable becomes an empty collection or an absent door.
pub fn deserialize(input: &Value) -> Plan {
    match input {
        Value::Object(map) => plan_from_object(map),
        Value::String(text) => decode_str(text),
        Value::Null => Plan::default(),
        other => {
            log::warn!("plan value is not an object: {}", kind_of(other));
            Plan::default()
        }
    }
}

/// Lenient text decoding
pub fn decode_str(text: &str) -> Plan {
    if text.trim().is_empty() {
        return Plan::default();
    }
    match serde_json::from_str::<Value>(text) {
        // A string inside a string would recurse forever on adversarial input; unwrap once.
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(map)) => plan_from_object(&map),
            _ => Plan::default(),
        },
        Ok(value) => deserialize(&value),
        Err(e) => {
            log::warn!("discarding unparseable plan: {}", e);
            Plan::default()
        }
    }
}

/// Like `decode_str`, but reports text that is not JSON at all
pub fn decode_strict(text: &str) -> CodecResult<Plan> {
    let value: Value = serde_json::from_str(text)?;
    Ok(deserialize(&value))
}

pub fn read_file(path: impl AsRef<Path>) -> CodecResult<Plan> {
    let data = std::fs::read_to_string(path)?;
    decode_strict(&data)
}

pub fn write_file(path: impl AsRef<Path>, plan: &Plan) -> CodecResult<()> {
    std::fs::write(path, to_json_string(plan)?)?;
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// FIELD COERCION
// ============================================================================

/// Numeric coercion in the spirit of a loose `Number(...)`: numbers, numeric strings
/// and booleans convert; anything else, or a non-finite result, is `None`.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn number_or(value: Option<&Value>, default: f64) -> f64 {
    number(value).unwrap_or(default)
}

fn positive_id(value: Option<&Value>) -> Option<u32> {
    let n = number(value)?.round();
    (n >= 1.0 && n <= f64::from(u32::MAX)).then_some(n as u32)
}

fn rotation(value: Option<&Value>) -> i32 {
    let r = number(value).unwrap_or(0.0).round() % 360.0;
    normalize_rotation(r as i32)
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coordinate(value: Option<&Value>) -> f64 {
    snap(number_or(value, 0.0).max(0.0))
}

fn size(value: Option<&Value>, default: f64, floor: f64) -> f64 {
    snap(number_or(value, default)).max(floor)
}

fn array<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match map.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            log::warn!("'{}' is a {}, expected array", key, kind_of(other));
            &[]
        }
        None => &[],
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

fn plan_from_object(map: &Map<String, Value>) -> Plan {
    let mut machines: Vec<(Option<u32>, MachineItem)> = array(map, "machines")
        .iter()
        .filter_map(Value::as_object)
        .map(machine_from)
        .collect();
    let mut zones: Vec<(Option<u32>, ZoneItem)> = array(map, "zones")
        .iter()
        .filter_map(Value::as_object)
        .map(zone_from)
        .collect();

    let machine_ids = assign_ids(machines.iter().map(|(id, _)| *id).collect());
    for ((stored, machine), id) in machines.iter_mut().zip(machine_ids) {
        if *stored != Some(id) {
            machine.id = id;
            if machine.label == 0 {
                machine.label = id;
            }
            if machine.serial.is_empty() {
                machine.serial = serial_for(machine.machine_type, id);
            }
            if machine.name.is_empty() {
                machine.name = format!("{} {}", machine.machine_type.label(), id);
            }
        }
    }
    let zone_ids = assign_ids(zones.iter().map(|(id, _)| *id).collect());
    for ((_, zone), id) in zones.iter_mut().zip(zone_ids) {
        zone.id = id;
    }

    Plan {
        machines: machines.into_iter().map(|(_, m)| m).collect(),
        zones: zones.into_iter().map(|(_, z)| z).collect(),
        entrada: door_from(map.get("entrada")),
        salida: door_from(map.get("salida")),
    }
}

/// Keep the first occurrence of each valid id; missing or repeated ids get fresh ones
/// past the current maximum.
fn assign_ids(stored: Vec<Option<u32>>) -> Vec<u32> {
    let mut taken = HashSet::new();
    let kept: Vec<Option<u32>> = stored
        .into_iter()
        .map(|id| match id {
            Some(id) if taken.insert(id) => Some(id),
            Some(dup) => {
                log::warn!("duplicate id {} re-assigned", dup);
                None
            }
            None => None,
        })
        .collect();

    kept.into_iter()
        .map(|id| {
            id.unwrap_or_else(|| {
                let fresh = next_id(taken.iter().copied());
                taken.insert(fresh);
                fresh
            })
        })
        .collect()
}

fn machine_from(obj: &Map<String, Value>) -> (Option<u32>, MachineItem) {
    let stored_id = positive_id(obj.get("id"));
    // Provisional id 0 is replaced in `plan_from_object`.
    let id = stored_id.unwrap_or(0);
    let machine_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(MachineType::from_label)
        .unwrap_or_default();
    let status = obj
        .get("status")
        .and_then(Value::as_str)
        .and_then(MachineStatus::from_label)
        .unwrap_or_default();

    let machine = MachineItem {
        id,
        label: positive_id(obj.get("label")).unwrap_or(id),
        machine_type,
        name: text(obj.get("name")).unwrap_or_else(|| {
            if stored_id.is_some() {
                format!("{} {}", machine_type.label(), id)
            } else {
                String::new()
            }
        }),
        status,
        serial: text(obj.get("serial")).unwrap_or_else(|| {
            stored_id
                .map(|id| serial_for(machine_type, id))
                .unwrap_or_default()
        }),
        image: text(obj.get("image")).unwrap_or_else(|| machine_type.default_image()),
        x: coordinate(obj.get("x")),
        y: coordinate(obj.get("y")),
        w: size(obj.get("w"), MACHINE_MIN_W, MACHINE_MIN_W),
        h: size(obj.get("h"), MACHINE_MIN_H, MACHINE_MIN_H),
        r: rotation(obj.get("r")),
    };
    (stored_id, machine)
}

fn zone_from(obj: &Map<String, Value>) -> (Option<u32>, ZoneItem) {
    let stored_id = positive_id(obj.get("id"));
    let zone = ZoneItem {
        id: stored_id.unwrap_or(0),
        zone_type: text(obj.get("type")).unwrap_or_else(|| DEFAULT_ZONE_TYPE.to_string()),
        x: coordinate(obj.get("x")),
        y: coordinate(obj.get("y")),
        w: size(obj.get("w"), ZONE_DEFAULT_W, ZONE_MIN_W),
        h: size(obj.get("h"), ZONE_DEFAULT_H, ZONE_MIN_H),
    };
    (stored_id, zone)
}

/// A door needs both coordinates; anything less is treated as no door
fn door_from(value: Option<&Value>) -> Option<DoorPoint> {
    let obj = value?.as_object()?;
    let x = number(obj.get("x"))?;
    let y = number(obj.get("y"))?;
    Some(DoorPoint {
        x: snap(x.max(0.0)),
        y: snap(y.max(0.0)),
        r: rotation(obj.get("r")),
    })
}
