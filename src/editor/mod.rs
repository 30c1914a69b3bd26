//! Layout Editor
//! Pointer-driven interaction state machine over a `Plan`.
//!
//! The host forwards pointer, key and timer events; every handler returns the
//! effects the host should act on (`Render` to repaint, `Persist` to write the
//! serialized plan back into its form field).

use std::time::Duration;

use crate::config::EditorConfig;
use crate::geometry::{
    clamp, guide_for, snap_down, snap_up, to_logical, Point, Rect, StageRect,
};
use crate::plan::{
    grab_offset, DoorKind, MachineStatus, MachineType, Plan, Stage, ZONE_MIN_H, ZONE_MIN_W,
};
use crate::resolver;

pub mod hold;

pub use hold::{HoldRotate, RotateDirection, RotateTarget};


pub const ZOOM_MIN: f64 = 0.6;
pub const ZOOM_MAX: f64 = 1.8;
pub const ZOOM_STEP: f64 = 0.1;
/// Side of the square grab area around each zone resize handle
pub const HANDLE_SIZE: f64 = 12.0;

/// What the host must do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Entities changed; repaint
    Render,
    /// A mutation was committed; write the serialized plan to the form field
    Persist,
}

/// Zone resize handle, named by compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::N,
        Handle::S,
        Handle::E,
        Handle::W,
        Handle::NE,
        Handle::NW,
        Handle::SE,
        Handle::SW,
    ];

    fn north(&self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    fn south(&self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    fn east(&self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    fn west(&self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    /// Centre of the handle on `rect`
    pub fn anchor(&self, rect: &Rect) -> Point {
        let x = if self.west() {
            rect.x
        } else if self.east() {
            rect.right()
        } else {
            rect.center().x
        };
        let y = if self.north() {
            rect.y
        } else if self.south() {
            rect.bottom()
        } else {
            rect.center().y
        };
        Point::new(x, y)
    }

    fn grab_area(&self, rect: &Rect) -> Rect {
        let a = self.anchor(rect);
        Rect::new(
            a.x - HANDLE_SIZE / 2.0,
            a.y - HANDLE_SIZE / 2.0,
            HANDLE_SIZE,
            HANDLE_SIZE,
        )
    }
}

/// The single interaction in progress
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle,
    PlacingDoor(DoorKind),
    DraggingMachine {
        id: u32,
        offset: Point,
    },
    DraggingZone {
        id: u32,
        offset: Point,
    },
    ResizingZone {
        id: u32,
        handle: Handle,
        start_rect: Rect,
        start_pointer: Point,
    },
    DraggingDoor {
        kind: DoorKind,
        offset: Point,
    },
    RotatingHold(HoldRotate),
}

impl Interaction {
    fn is_pointer_drag(&self) -> bool {
        matches!(
            self,
            Interaction::DraggingMachine { .. }
                | Interaction::DraggingZone { .. }
                | Interaction::ResizingZone { .. }
                | Interaction::DraggingDoor { .. }
        )
    }
}

/// Selected entity; a machine and a zone are never selected together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Machine(u32),
    Zone(u32),
}

/// Topmost entity under a stage point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Door(DoorKind),
    Machine(u32),
    ZoneHandle(u32, Handle),
    Zone(u32),
}

/// Snap lines the dragged machine is close to
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Guides {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Pointer position in client (screen) coordinates plus the stage origin it refers to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client: Point,
    pub stage: StageRect,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64, stage: StageRect) -> Self {
        Self {
            client: Point::new(client_x, client_y),
            stage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
}

pub struct Editor {
    plan: Plan,
    stage: Stage,
    zoom: f64,
    guide_threshold: f64,
    interaction: Interaction,
    selection: Selection,
    renaming: Option<u32>,
    guides: Guides,
}

impl Editor {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_plan(Plan::new(), config)
    }

    /// Start from a loaded plan; the plan is re-normalized against the configured stage
    pub fn with_plan(mut plan: Plan, config: &EditorConfig) -> Self {
        let stage = config.stage();
        plan.normalize(&stage);
        Self {
            plan,
            stage,
            zoom: clamp(config.zoom, ZOOM_MIN, ZOOM_MAX),
            guide_threshold: config.guide_threshold,
            interaction: Interaction::Idle,
            selection: Selection::None,
            renaming: None,
            guides: Guides::default(),
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn renaming(&self) -> Option<u32> {
        self.renaming
    }

    pub fn guides(&self) -> Guides {
        self.guides
    }

    /// Replace the whole plan, e.g. after loading a form value
    pub fn load(&mut self, mut plan: Plan) -> Vec<Effect> {
        plan.normalize(&self.stage);
        log::info!(
            "loaded plan: {} machines, {} zones",
            plan.machines.len(),
            plan.zones.len()
        );
        self.plan = plan;
        self.reset_interaction();
        self.selection = Selection::None;
        vec![Effect::Render]
    }

    fn reset_interaction(&mut self) {
        self.interaction = Interaction::Idle;
        self.renaming = None;
        self.guides = Guides::default();
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Effect> {
        self.zoom = clamp(zoom, ZOOM_MIN, ZOOM_MAX);
        vec![Effect::Render]
    }

    pub fn zoom_in(&mut self) -> Vec<Effect> {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Effect> {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    // ========================================================================
    // Selection & commands
    // ========================================================================

    pub fn select_machine(&mut self, id: u32) {
        if self.plan.machine(id).is_some() {
            self.selection = Selection::Machine(id);
        }
    }

    pub fn select_zone(&mut self, id: u32) {
        if self.plan.zone(id).is_some() {
            self.selection = Selection::Zone(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    pub fn add_machine(&mut self, machine_type: MachineType) -> Vec<Effect> {
        self.plan.add_machine(machine_type, &self.stage);
        vec![Effect::Render, Effect::Persist]
    }

    pub fn add_zone(&mut self, zone_type: impl Into<String>) -> Vec<Effect> {
        self.plan.add_zone(zone_type, &self.stage);
        vec![Effect::Render, Effect::Persist]
    }

    pub fn remove_machine(&mut self, id: u32) -> Vec<Effect> {
        if !self.plan.remove_machine(id) {
            return Vec::new();
        }
        if self.selection == Selection::Machine(id) {
            self.selection = Selection::None;
        }
        if self.renaming == Some(id) {
            self.renaming = None;
        }
        self.drop_hold_on(RotateTarget::Machine(id));
        vec![Effect::Render, Effect::Persist]
    }

    pub fn remove_zone(&mut self, id: u32) -> Vec<Effect> {
        if !self.plan.remove_zone(id) {
            return Vec::new();
        }
        if self.selection == Selection::Zone(id) {
            self.selection = Selection::None;
        }
        vec![Effect::Render, Effect::Persist]
    }

    pub fn remove_door(&mut self, kind: DoorKind) -> Vec<Effect> {
        if !self.plan.remove_door(kind) {
            return Vec::new();
        }
        self.drop_hold_on(RotateTarget::Door(kind));
        vec![Effect::Render, Effect::Persist]
    }

    fn drop_hold_on(&mut self, target: RotateTarget) {
        if matches!(&self.interaction, Interaction::RotatingHold(hold) if hold.target == target) {
            self.interaction = Interaction::Idle;
        }
    }

    pub fn clear_plan(&mut self) -> Vec<Effect> {
        self.plan.clear();
        self.reset_interaction();
        self.selection = Selection::None;
        vec![Effect::Render, Effect::Persist]
    }

    pub fn set_status(&mut self, machine_id: u32, status: MachineStatus) -> Vec<Effect> {
        if self.plan.set_status(machine_id, status) {
            vec![Effect::Render, Effect::Persist]
        } else {
            Vec::new()
        }
    }

    /// Arm door placement; the next pointer-down on empty stage drops the door.
    /// Ignored while that door already exists or another interaction is running.
    pub fn begin_placing_door(&mut self, kind: DoorKind) -> Vec<Effect> {
        if self.plan.door(kind).is_some() {
            log::debug!("{} already placed, ignoring", kind.label());
            return Vec::new();
        }
        if !matches!(
            self.interaction,
            Interaction::Idle | Interaction::PlacingDoor(_)
        ) {
            return Vec::new();
        }
        self.renaming = None;
        self.interaction = Interaction::PlacingDoor(kind);
        vec![Effect::Render]
    }

    pub fn cancel_placing_door(&mut self) -> Vec<Effect> {
        if matches!(self.interaction, Interaction::PlacingDoor(_)) {
            self.interaction = Interaction::Idle;
            return vec![Effect::Render];
        }
        Vec::new()
    }

    // ========================================================================
    // Rename in place
    // ========================================================================

    pub fn begin_rename(&mut self, machine_id: u32) -> Vec<Effect> {
        if self.plan.machine(machine_id).is_none() || self.interaction.is_pointer_drag() {
            return Vec::new();
        }
        if matches!(self.interaction, Interaction::PlacingDoor(_)) {
            self.interaction = Interaction::Idle;
        }
        self.selection = Selection::Machine(machine_id);
        self.renaming = Some(machine_id);
        vec![Effect::Render]
    }

    /// Apply the edited name and close the editor; blank names keep the old one
    pub fn commit_rename(&mut self, name: &str) -> Vec<Effect> {
        let Some(id) = self.renaming.take() else {
            return Vec::new();
        };
        if self.plan.rename(id, name) {
            vec![Effect::Render, Effect::Persist]
        } else {
            vec![Effect::Render]
        }
    }

    pub fn cancel_rename(&mut self) -> Vec<Effect> {
        if self.renaming.take().is_some() {
            vec![Effect::Render]
        } else {
            Vec::new()
        }
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    /// Topmost entity at a logical point: doors, then machines, then handles of the
    /// selected zone, then zone bodies. Later entities in a list sit above earlier ones.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        for kind in [DoorKind::Salida, DoorKind::Entrada] {
            if self.plan.door(kind).is_some_and(|d| d.rect().contains(p)) {
                return Some(Hit::Door(kind));
            }
        }
        if let Some(m) = self.plan.machines.iter().rev().find(|m| m.rect().contains(p)) {
            return Some(Hit::Machine(m.id));
        }
        if let Selection::Zone(id) = self.selection {
            if let Some(zone) = self.plan.zone(id) {
                let rect = zone.rect();
                if let Some(handle) = Handle::ALL
                    .into_iter()
                    .find(|h| h.grab_area(&rect).contains(p))
                {
                    return Some(Hit::ZoneHandle(id, handle));
                }
            }
        }
        self.plan
            .zones
            .iter()
            .rev()
            .find(|z| z.rect().contains(p))
            .map(|z| Hit::Zone(z.id))
    }

    fn logical(&self, ev: &PointerEvent) -> Point {
        to_logical(ev.client, ev.stage, self.zoom)
    }

    // ========================================================================
    // Pointer events
    // ========================================================================

    pub fn on_pointer_down(&mut self, ev: &PointerEvent) -> Vec<Effect> {
        let p = self.logical(ev);

        match self.interaction {
            Interaction::Idle | Interaction::PlacingDoor(_) => {}
            // A drag or hold already owns the pointer
            _ => return Vec::new(),
        }

        let hit = self.hit_test(p);

        if let Interaction::PlacingDoor(kind) = self.interaction {
            if hit.is_none() {
                self.interaction = Interaction::Idle;
                return if self.plan.place_door(kind, p, &self.stage) {
                    vec![Effect::Render, Effect::Persist]
                } else {
                    vec![Effect::Render]
                };
            }
        }

        let Some(hit) = hit else {
            self.selection = Selection::None;
            self.renaming = None;
            return vec![Effect::Render];
        };

        self.renaming = None;
        self.interaction = match hit {
            Hit::Door(kind) => {
                let Some(door) = self.plan.door(kind) else {
                    return Vec::new();
                };
                Interaction::DraggingDoor {
                    kind,
                    offset: grab_offset(p, door.x, door.y),
                }
            }
            Hit::Machine(id) => {
                let Some(machine) = self.plan.machine(id) else {
                    return Vec::new();
                };
                self.selection = Selection::Machine(id);
                Interaction::DraggingMachine {
                    id,
                    offset: grab_offset(p, machine.x, machine.y),
                }
            }
            Hit::ZoneHandle(id, handle) => {
                let Some(zone) = self.plan.zone(id) else {
                    return Vec::new();
                };
                self.selection = Selection::Zone(id);
                Interaction::ResizingZone {
                    id,
                    handle,
                    start_rect: zone.rect(),
                    start_pointer: p,
                }
            }
            Hit::Zone(id) => {
                let Some(zone) = self.plan.zone(id) else {
                    return Vec::new();
                };
                self.selection = Selection::Zone(id);
                Interaction::DraggingZone {
                    id,
                    offset: grab_offset(p, zone.x, zone.y),
                }
            }
        };
        log::debug!("pointer down at ({:.1}, {:.1}) -> {:?}", p.x, p.y, self.interaction);
        vec![Effect::Render]
    }

    pub fn on_pointer_move(&mut self, ev: &PointerEvent) -> Vec<Effect> {
        let p = self.logical(ev);

        match self.interaction.clone() {
            Interaction::DraggingMachine { id, offset } => self.drag_machine(id, p, offset),
            Interaction::DraggingZone { id, offset } => {
                let stage = self.stage;
                let Some(zone) = self.plan.zones.iter_mut().find(|z| z.id == id) else {
                    return Vec::new();
                };
                let placed = stage.place_box(zone.rect().with_origin(p.x - offset.x, p.y - offset.y));
                zone.set_rect(placed);
                vec![Effect::Render]
            }
            Interaction::ResizingZone {
                id,
                handle,
                start_rect,
                start_pointer,
            } => {
                let delta = Point::new(p.x - start_pointer.x, p.y - start_pointer.y);
                let resized = resize_rect(start_rect, handle, delta, &self.stage);
                let Some(zone) = self.plan.zones.iter_mut().find(|z| z.id == id) else {
                    return Vec::new();
                };
                zone.set_rect(resized);
                vec![Effect::Render]
            }
            Interaction::DraggingDoor { kind, offset } => {
                let placed = self
                    .stage
                    .place_door(Point::new(p.x - offset.x, p.y - offset.y));
                let door = match kind {
                    DoorKind::Entrada => self.plan.entrada.as_mut(),
                    DoorKind::Salida => self.plan.salida.as_mut(),
                };
                let Some(door) = door else {
                    return Vec::new();
                };
                door.x = placed.x;
                door.y = placed.y;
                vec![Effect::Render]
            }
            Interaction::Idle | Interaction::PlacingDoor(_) | Interaction::RotatingHold(_) => {
                Vec::new()
            }
        }
    }

    fn drag_machine(&mut self, id: u32, p: Point, offset: Point) -> Vec<Effect> {
        let others = self.plan.machine_rects_except(id);
        let stage = self.stage;
        // Threshold is in screen pixels; raw positions are logical
        let threshold = self.guide_threshold / self.zoom;
        let Some(machine) = self.plan.machines.iter_mut().find(|m| m.id == id) else {
            return Vec::new();
        };

        let raw_x = clamp(p.x - offset.x, 0.0, stage.width - machine.w - stage.margin);
        let raw_y = clamp(p.y - offset.y, 0.0, stage.height - machine.h - stage.margin);
        self.guides = Guides {
            x: guide_for(raw_x, threshold),
            y: guide_for(raw_y, threshold),
        };

        let candidate = stage.place_box(machine.rect().with_origin(raw_x, raw_y));
        let resolved = resolver::resolve(candidate, &others, &stage);
        machine.set_origin(resolved.rect);
        vec![Effect::Render]
    }

    /// Finish any drag or resize, committing its last position, and release any hold
    pub fn on_pointer_up(&mut self, _ev: &PointerEvent) -> Vec<Effect> {
        if self.interaction.is_pointer_drag() {
            log::debug!("committed {:?}", self.interaction);
            self.interaction = Interaction::Idle;
            self.guides = Guides::default();
            return vec![Effect::Render, Effect::Persist];
        }
        self.end_hold()
    }

    /// Pointer left the hold button; only the hold is cancelled
    pub fn on_pointer_leave(&mut self) -> Vec<Effect> {
        self.end_hold()
    }

    /// Window lost focus
    pub fn on_blur(&mut self) -> Vec<Effect> {
        self.end_hold()
    }

    pub fn on_key(&mut self, key: Key) -> Vec<Effect> {
        match key {
            Key::Escape => {
                let mut effects = self.cancel_rename();
                effects.extend(self.cancel_placing_door());
                effects
            }
            Key::Delete | Key::Backspace => {
                if self.renaming.is_some() || self.interaction != Interaction::Idle {
                    return Vec::new();
                }
                match self.selection {
                    Selection::Machine(id) => self.remove_machine(id),
                    Selection::Zone(id) => self.remove_zone(id),
                    Selection::None => Vec::new(),
                }
            }
        }
    }

    // ========================================================================
    // Hold-to-rotate
    // ========================================================================

    /// Press a rotate button: rotate one step now, then keep rotating on `advance`.
    /// A new hold replaces any previous one; drags are never interrupted.
    pub fn start_hold(&mut self, target: RotateTarget, direction: RotateDirection) -> Vec<Effect> {
        if self.interaction.is_pointer_drag() {
            return Vec::new();
        }
        let hold = HoldRotate::new(target, direction);
        if !self.rotate(target, hold.delta()) {
            self.interaction = Interaction::Idle;
            return Vec::new();
        }
        self.renaming = None;
        self.interaction = Interaction::RotatingHold(hold);
        vec![Effect::Render]
    }

    /// Feed elapsed time from the host's frame or timer loop
    pub fn advance(&mut self, dt: Duration) -> Vec<Effect> {
        let Interaction::RotatingHold(hold) = &mut self.interaction else {
            return Vec::new();
        };
        let target = hold.target;
        let deltas = hold.advance(dt);
        if deltas.is_empty() {
            return Vec::new();
        }
        for delta in deltas {
            if !self.rotate(target, delta) {
                self.interaction = Interaction::Idle;
                break;
            }
        }
        vec![Effect::Render]
    }

    /// Release a rotate button; commits the accumulated rotation
    pub fn end_hold(&mut self) -> Vec<Effect> {
        if let Interaction::RotatingHold(hold) = &self.interaction {
            log::debug!("hold released on {:?} at step {}", hold.target, hold.step);
            self.interaction = Interaction::Idle;
            return vec![Effect::Render, Effect::Persist];
        }
        Vec::new()
    }

    fn rotate(&mut self, target: RotateTarget, delta: i32) -> bool {
        match target {
            RotateTarget::Machine(id) => self.plan.rotate_machine(id, delta),
            RotateTarget::Door(kind) => self.plan.rotate_door(kind, delta),
        }
    }
}

/// New zone rectangle for a handle dragged by `delta` from `start`.
/// The moved edges snap toward the zone's interior, never shrink the zone below its
/// floor size and never leave the stage.
pub fn resize_rect(start: Rect, handle: Handle, delta: Point, stage: &Stage) -> Rect {
    let max_right = snap_down(stage.width - stage.margin);
    let max_bottom = snap_down(stage.height - stage.margin);
    let (mut left, mut top) = (start.x, start.y);
    let (mut right, mut bottom) = (start.right(), start.bottom());

    if handle.east() {
        right = clamp(snap_down(right + delta.x), left + ZONE_MIN_W, max_right);
    }
    if handle.west() {
        left = clamp(snap_up(left + delta.x), 0.0, right - ZONE_MIN_W);
    }
    if handle.south() {
        bottom = clamp(snap_down(bottom + delta.y), top + ZONE_MIN_H, max_bottom);
    }
    if handle.north() {
        top = clamp(snap_up(top + delta.y), 0.0, bottom - ZONE_MIN_H);
    }

    Rect::new(left, top, right - left, bottom - top)
}
