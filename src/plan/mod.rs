//! Plan Data Structures
//! Machines, zones and doors placed on a bounded stage

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, normalize_rotation, snap, snap_down, snap_within, Point, Rect};
use crate::resolver;

#[cfg(test)]
mod tests;

pub const MACHINE_MIN_W: f64 = 180.0;
pub const MACHINE_MIN_H: f64 = 130.0;
pub const ZONE_MIN_W: f64 = 140.0;
pub const ZONE_MIN_H: f64 = 90.0;
pub const ZONE_DEFAULT_W: f64 = 260.0;
pub const ZONE_DEFAULT_H: f64 = 160.0;
pub const DOOR_W: f64 = 130.0;
pub const DOOR_H: f64 = 54.0;

/// Bounded canvas that all entities live on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub width: f64,
    pub height: f64,
    /// Right/bottom clearance kept free for machines and zones
    pub margin: f64,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 720.0,
            margin: 10.0,
        }
    }
}

impl Stage {
    pub fn new(width: f64, height: f64, margin: f64) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// Snapped width no smaller than `floor` and no wider than the usable stage.
    /// The floor wins on a stage too narrow for it.
    pub fn fit_width(&self, w: f64, floor: f64) -> f64 {
        fit(w, floor, self.width - self.margin)
    }

    pub fn fit_height(&self, h: f64, floor: f64) -> f64 {
        fit(h, floor, self.height - self.margin)
    }

    /// Snap and clamp the origin of a machine or zone rectangle
    pub fn place_box(&self, rect: Rect) -> Rect {
        rect.with_origin(
            snap_within(rect.x, 0.0, self.width - rect.w - self.margin),
            snap_within(rect.y, 0.0, self.height - rect.h - self.margin),
        )
    }

    /// Snap and clamp a door origin; doors may use the full stage
    pub fn place_door(&self, p: Point) -> Point {
        Point::new(
            snap_within(p.x, 0.0, self.width - DOOR_W),
            snap_within(p.y, 0.0, self.height - DOOR_H),
        )
    }
}

fn fit(v: f64, floor: f64, limit: f64) -> f64 {
    snap(v).max(floor).min(snap_down(limit).max(floor))
}

/// Machine type, one of a fixed set of four
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MachineType {
    #[default]
    Tragamonedas,
    Ruleta,
    Blackjack,
    Poker,
}

impl MachineType {
    pub const ALL: [MachineType; 4] = [
        MachineType::Tragamonedas,
        MachineType::Ruleta,
        MachineType::Blackjack,
        MachineType::Poker,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MachineType::Tragamonedas => "Tragamonedas",
            MachineType::Ruleta => "Ruleta",
            MachineType::Blackjack => "Blackjack",
            MachineType::Poker => "Poker",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label.trim()))
    }

    fn serial_prefix(&self) -> &'static str {
        match self {
            MachineType::Tragamonedas => "TRG",
            MachineType::Ruleta => "RUL",
            MachineType::Blackjack => "BJK",
            MachineType::Poker => "PKR",
        }
    }

    pub fn default_image(&self) -> String {
        format!("machines/{}.png", self.label().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MachineStatus {
    #[default]
    Activa,
    Mantenimiento,
}

impl MachineStatus {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Activa" => Some(MachineStatus::Activa),
            "Mantenimiento" => Some(MachineStatus::Mantenimiento),
            _ => None,
        }
    }
}

/// A gaming machine placed on the stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineItem {
    pub id: u32,
    /// Floor number shown on the machine
    pub label: u32,
    #[serde(rename = "type")]
    pub machine_type: MachineType,
    pub name: String,
    pub status: MachineStatus,
    /// Generated once at creation, never edited
    pub serial: String,
    pub image: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Rotation in whole degrees, `[0, 360)`
    pub r: i32,
}

impl MachineItem {
    pub fn new(id: u32, machine_type: MachineType) -> Self {
        Self {
            id,
            label: id,
            machine_type,
            name: format!("{} {}", machine_type.label(), id),
            status: MachineStatus::Activa,
            serial: serial_for(machine_type, id),
            image: machine_type.default_image(),
            x: 0.0,
            y: 0.0,
            w: MACHINE_MIN_W,
            h: MACHINE_MIN_H,
            r: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn set_origin(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
    }
}

pub fn serial_for(machine_type: MachineType, id: u32) -> String {
    format!("{}-{:05}", machine_type.serial_prefix(), id)
}

/// A typed floor area; zones may overlap each other and machines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneItem {
    pub id: u32,
    /// Zone-type id from the reference catalog
    #[serde(rename = "type")]
    pub zone_type: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ZoneItem {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    #[serde(rename = "ENTRADA")]
    Entrada,
    #[serde(rename = "SALIDA")]
    Salida,
}

impl DoorKind {
    pub fn label(&self) -> &'static str {
        match self {
            DoorKind::Entrada => "ENTRADA",
            DoorKind::Salida => "SALIDA",
        }
    }
}

/// Entry or exit door, fixed `DOOR_W` x `DOOR_H` footprint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DoorPoint {
    pub x: f64,
    pub y: f64,
    pub r: i32,
}

impl DoorPoint {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, DOOR_W, DOOR_H)
    }
}

/// The persisted layout of one zone
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plan {
    pub machines: Vec<MachineItem>,
    pub zones: Vec<ZoneItem>,
    pub entrada: Option<DoorPoint>,
    pub salida: Option<DoorPoint>,
}

/// `max(existing) + 1`, or 1 when empty. Once the maximum is `u32::MAX` the smallest
/// unused id is taken instead.
pub fn next_id(ids: impl IntoIterator<Item = u32>) -> u32 {
    let ids: Vec<u32> = ids.into_iter().collect();
    match ids.iter().max() {
        None => 1,
        Some(&max) if max < u32::MAX => max + 1,
        Some(_) => {
            let used: HashSet<u32> = ids.into_iter().collect();
            (1..=u32::MAX).find(|id| !used.contains(id)).unwrap_or(u32::MAX)
        }
    }
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
            && self.zones.is_empty()
            && self.entrada.is_none()
            && self.salida.is_none()
    }

    pub fn machine(&self, id: u32) -> Option<&MachineItem> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn zone(&self, id: u32) -> Option<&ZoneItem> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn door(&self, kind: DoorKind) -> Option<&DoorPoint> {
        match kind {
            DoorKind::Entrada => self.entrada.as_ref(),
            DoorKind::Salida => self.salida.as_ref(),
        }
    }

    fn door_slot(&mut self, kind: DoorKind) -> &mut Option<DoorPoint> {
        match kind {
            DoorKind::Entrada => &mut self.entrada,
            DoorKind::Salida => &mut self.salida,
        }
    }

    pub fn next_machine_id(&self) -> u32 {
        next_id(self.machines.iter().map(|m| m.id))
    }

    pub fn next_zone_id(&self) -> u32 {
        next_id(self.zones.iter().map(|z| z.id))
    }

    /// Rectangles of every machine except `id`
    pub fn machine_rects_except(&self, id: u32) -> Vec<Rect> {
        self.machines
            .iter()
            .filter(|m| m.id != id)
            .map(MachineItem::rect)
            .collect()
    }

    /// Add a machine at its default slot, relocated off any machine it would cover
    pub fn add_machine(&mut self, machine_type: MachineType, stage: &Stage) -> MachineItem {
        let id = self.next_machine_id();
        let mut machine = MachineItem::new(id, machine_type);
        let slot = Rect::new(
            40.0 + f64::from(id % 10) * 20.0,
            60.0 + f64::from(id % 6) * 20.0,
            machine.w,
            machine.h,
        );
        let candidate = stage.place_box(slot);
        let others = self.machine_rects_except(id);
        let resolved = resolver::resolve(candidate, &others, stage);
        machine.set_origin(resolved.rect);

        log::debug!(
            "added machine {} ({}) at ({}, {})",
            id,
            machine_type.label(),
            machine.x,
            machine.y
        );
        self.machines.push(machine.clone());
        machine
    }

    pub fn add_zone(&mut self, zone_type: impl Into<String>, stage: &Stage) -> ZoneItem {
        let id = self.next_zone_id();
        let slot = Rect::new(
            20.0 + f64::from(id % 8) * 30.0,
            20.0 + f64::from(id % 5) * 30.0,
            ZONE_DEFAULT_W,
            ZONE_DEFAULT_H,
        );
        let rect = stage.place_box(slot);
        let zone = ZoneItem {
            id,
            zone_type: zone_type.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        };
        log::debug!("added zone {} ({}) at ({}, {})", id, zone.zone_type, zone.x, zone.y);
        self.zones.push(zone.clone());
        zone
    }

    pub fn remove_machine(&mut self, id: u32) -> bool {
        let before = self.machines.len();
        self.machines.retain(|m| m.id != id);
        before != self.machines.len()
    }

    pub fn remove_zone(&mut self, id: u32) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != id);
        before != self.zones.len()
    }

    /// Place a door at a snapped, clamped point. Returns `false` without touching the
    /// plan when that door already exists.
    pub fn place_door(&mut self, kind: DoorKind, at: Point, stage: &Stage) -> bool {
        let placed = stage.place_door(at);
        let slot = self.door_slot(kind);
        if slot.is_some() {
            return false;
        }
        *slot = Some(DoorPoint {
            x: placed.x,
            y: placed.y,
            r: 0,
        });
        log::debug!("placed {} at ({}, {})", kind.label(), placed.x, placed.y);
        true
    }

    pub fn remove_door(&mut self, kind: DoorKind) -> bool {
        self.door_slot(kind).take().is_some()
    }

    /// Rename a machine; blank names are ignored
    pub fn rename(&mut self, machine_id: u32, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.machines.iter_mut().find(|m| m.id == machine_id) {
            Some(machine) => {
                machine.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_status(&mut self, machine_id: u32, status: MachineStatus) -> bool {
        match self.machines.iter_mut().find(|m| m.id == machine_id) {
            Some(machine) => {
                machine.status = status;
                true
            }
            None => false,
        }
    }

    pub fn rotate_machine(&mut self, machine_id: u32, delta: i32) -> bool {
        match self.machines.iter_mut().find(|m| m.id == machine_id) {
            Some(machine) => {
                machine.r = normalize_rotation(machine.r.saturating_add(delta));
                true
            }
            None => false,
        }
    }

    pub fn rotate_door(&mut self, kind: DoorKind, delta: i32) -> bool {
        match self.door_slot(kind) {
            Some(door) => {
                door.r = normalize_rotation(door.r.saturating_add(delta));
                true
            }
            None => false,
        }
    }

    /// Drop every entity and both doors
    pub fn clear(&mut self) {
        self.machines.clear();
        self.zones.clear();
        self.entrada = None;
        self.salida = None;
        log::info!("plan cleared");
    }

    /// Re-apply every invariant against `stage`: grid, bounds, size floors, rotation.
    pub fn normalize(&mut self, stage: &Stage) {
        for machine in &mut self.machines {
            machine.w = stage.fit_width(machine.w, MACHINE_MIN_W);
            machine.h = stage.fit_height(machine.h, MACHINE_MIN_H);
            let placed = stage.place_box(machine.rect());
            machine.set_origin(placed);
            machine.r = normalize_rotation(machine.r);
        }
        for zone in &mut self.zones {
            zone.w = stage.fit_width(zone.w, ZONE_MIN_W);
            zone.h = stage.fit_height(zone.h, ZONE_MIN_H);
            let placed = stage.place_box(zone.rect());
            zone.set_rect(placed);
        }
        for kind in [DoorKind::Entrada, DoorKind::Salida] {
            if let Some(door) = self.door_slot(kind) {
                let placed = stage.place_door(Point::new(door.x, door.y));
                door.x = placed.x;
                door.y = placed.y;
                door.r = normalize_rotation(door.r);
            }
        }
    }
}

/// Offset that keeps a grabbed entity under the pointer
pub fn grab_offset(pointer: Point, origin_x: f64, origin_y: f64) -> Point {
    Point::new(pointer.x - origin_x, pointer.y - origin_y)
}

/// `true` when `rect` lies entirely on the stage
pub fn within_stage(rect: &Rect, stage: &Stage) -> bool {
    rect.x >= 0.0 && rect.y >= 0.0 && rect.right() <= stage.width && rect.bottom() <= stage.height
}

/// `true` when `v` sits exactly on a grid line
pub fn on_grid(v: f64) -> bool {
    (v / geometry::GRID).fract() == 0.0
}
