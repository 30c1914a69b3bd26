//! Floorplan GUI - Gaming-floor layout editor
//! Forwards egui pointer, key and frame events into the editor and paints the plan

use eframe::egui;
use std::path::Path;
use std::time::Duration;

use floorplan::catalog::{Catalog, FormField, JsonField, PlanBinding};
use floorplan::codec;
use floorplan::config::EditorConfig;
use floorplan::editor::{
    Editor, Effect, Guides, Handle, Interaction, Key, PointerEvent, RotateDirection, RotateTarget,
    Selection,
};
use floorplan::geometry::{Rect, StageRect};
use floorplan::plan::{DoorKind, MachineItem, MachineStatus, MachineType};

/// Zone-type reference list used when no catalog file is given
const DEFAULT_ZONE_TYPES: &str = r#"[
    { "id": 1, "name": "Salón principal" },
    { "id": 2, "name": "Sala VIP" },
    { "id": 3, "name": "Terraza" },
    { "id": 4, "name": "Bar" }
]"#;

/// Environment variable naming a zone-type reference JSON file
const ZONE_TYPES_ENV: &str = "FLOORPLAN_ZONE_TYPES";

/// Padding between the canvas border and the stage origin, in screen pixels
const STAGE_PADDING: f32 = 16.0;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 900.0])
            .with_title("Floorplan - Gaming Floor Layout"),
        ..Default::default()
    };

    eframe::run_native(
        "Floorplan",
        options,
        Box::new(|cc| Ok(Box::new(FloorplanApp::new(cc)))),
    )
}

fn load_catalog() -> Catalog {
    let data = match std::env::var(ZONE_TYPES_ENV) {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("could not read {} ({}), using built-in zone types", path, e);
                DEFAULT_ZONE_TYPES.to_string()
            }
        },
        Err(_) => DEFAULT_ZONE_TYPES.to_string(),
    };
    match serde_json::from_str(&data) {
        Ok(value) => Catalog::from_reference_data(&value),
        Err(e) => {
            log::warn!("invalid zone-type list: {}", e);
            Catalog::default()
        }
    }
}

struct FloorplanApp {
    /// The layout editor state machine
    editor: Editor,
    /// Form field mirror of the committed plan
    binding: PlanBinding<JsonField>,
    /// Zone and machine type names
    catalog: Catalog,
    /// Machine type picked for the next "Add machine"
    new_machine_type: MachineType,
    /// Zone type id picked for the next "Add zone"
    new_zone_type: String,
    /// Text buffer for in-place rename
    rename_buffer: String,
    /// Rotate button currently held down
    held: Option<(RotateTarget, RotateDirection)>,
    /// Whether the primary button went down on the stage
    pointer_captured: bool,
    /// Last pointer position forwarded as a move
    last_pointer: Option<egui::Pos2>,
    /// Window focus on the previous frame
    was_focused: bool,
    /// Status line message
    status: Option<String>,
}

impl FloorplanApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = EditorConfig::from_env();
        let catalog = load_catalog();
        let binding = PlanBinding::new(JsonField::default());
        let editor = binding.open_editor(&config);
        let new_zone_type = catalog
            .zone_types()
            .first()
            .map(|t| t.id.clone())
            .unwrap_or_else(|| codec::DEFAULT_ZONE_TYPE.to_string());

        Self {
            editor,
            binding,
            catalog,
            new_machine_type: MachineType::Tragamonedas,
            new_zone_type,
            rename_buffer: String::new(),
            held: None,
            pointer_captured: false,
            last_pointer: None,
            was_focused: true,
            status: None,
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        self.binding.apply(&self.editor, &effects);
    }

    fn open_plan(&mut self, path: &Path) {
        match codec::read_file(path) {
            Ok(plan) => {
                let mut effects = self.editor.load(plan);
                effects.push(Effect::Persist);
                self.apply(effects);
                self.status = Some(format!("Opened {}", path.display()));
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                self.status = Some(format!("Could not open {}: {}", path.display(), e));
            }
        }
    }

    fn save_plan(&mut self, path: &Path) {
        match codec::write_file(path, self.editor.plan()) {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                self.status = Some(format!("Could not save {}: {}", path.display(), e));
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("📂 Open plan...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Plan", &["json"])
                            .pick_file()
                        {
                            self.open_plan(&path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("💾 Save plan...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Plan", &["json"])
                            .set_file_name("plan.json")
                            .save_file()
                        {
                            self.save_plan(&path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("🗑 Clear plan").clicked() {
                        let effects = self.editor.clear_plan();
                        self.apply(effects);
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Zoom in").clicked() {
                        let effects = self.editor.zoom_in();
                        self.apply(effects);
                    }
                    if ui.button("Zoom out").clicked() {
                        let effects = self.editor.zoom_out();
                        self.apply(effects);
                    }
                    if ui.button("Reset zoom").clicked() {
                        let effects = self.editor.set_zoom(1.0);
                        self.apply(effects);
                    }
                });
            });
        });
    }

    fn tools_panel(&mut self, ctx: &egui::Context, dt: Duration) {
        egui::SidePanel::left("tools")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Machines");
                egui::ComboBox::from_id_salt("machine_type")
                    .selected_text(self.catalog.machine_type_name(self.new_machine_type))
                    .show_ui(ui, |ui| {
                        for t in self.catalog.machine_types() {
                            ui.selectable_value(
                                &mut self.new_machine_type,
                                *t,
                                self.catalog.machine_type_name(*t),
                            );
                        }
                    });
                if ui.button("➕ Add machine").clicked() {
                    let effects = self.editor.add_machine(self.new_machine_type);
                    self.apply(effects);
                }

                ui.separator();
                ui.heading("Zones");
                let selected_name = self.catalog.zone_type_name(&self.new_zone_type).to_string();
                egui::ComboBox::from_id_salt("zone_type")
                    .selected_text(selected_name)
                    .show_ui(ui, |ui| {
                        for t in self.catalog.zone_types() {
                            ui.selectable_value(&mut self.new_zone_type, t.id.clone(), t.name.as_str());
                        }
                    });
                if ui.button("➕ Add zone").clicked() {
                    let effects = self.editor.add_zone(self.new_zone_type.clone());
                    self.apply(effects);
                }

                ui.separator();
                ui.heading("Doors");
                for kind in [DoorKind::Entrada, DoorKind::Salida] {
                    ui.horizontal(|ui| {
                        let exists = self.editor.plan().door(kind).is_some();
                        let placing =
                            *self.editor.interaction() == Interaction::PlacingDoor(kind);
                        let label = if placing {
                            format!("Click stage for {}", kind.label())
                        } else {
                            format!("Place {}", kind.label())
                        };
                        if ui.add_enabled(!exists, egui::Button::new(label)).clicked() {
                            let effects = if placing {
                                self.editor.cancel_placing_door()
                            } else {
                                self.editor.begin_placing_door(kind)
                            };
                            self.apply(effects);
                        }
                        if ui.add_enabled(exists, egui::Button::new("✖")).clicked() {
                            let effects = self.editor.remove_door(kind);
                            self.apply(effects);
                        }
                    });
                    if self.editor.plan().door(kind).is_some() {
                        self.rotate_buttons(ui, RotateTarget::Door(kind), dt);
                    }
                }

                ui.separator();
                self.selection_panel(ui, dt);
            });
    }

    /// Press-and-hold rotate buttons for one target
    fn rotate_buttons(&mut self, ui: &mut egui::Ui, target: RotateTarget, dt: Duration) {
        ui.horizontal(|ui| {
            for (direction, text) in [
                (RotateDirection::Left, "⟲ Rotate"),
                (RotateDirection::Right, "⟳ Rotate"),
            ] {
                let response = ui.button(text);
                let down = response.is_pointer_button_down_on();
                let ours = self.held == Some((target, direction));
                if down && !ours {
                    self.held = Some((target, direction));
                    let effects = self.editor.start_hold(target, direction);
                    self.apply(effects);
                } else if down && ours {
                    let effects = self.editor.advance(dt);
                    self.apply(effects);
                } else if !down && ours {
                    self.held = None;
                    let effects = self.editor.end_hold();
                    self.apply(effects);
                }
            }
        });
    }

    fn selection_panel(&mut self, ui: &mut egui::Ui, dt: Duration) {
        match self.editor.selection() {
            Selection::Machine(id) => {
                let Some(machine) = self.editor.plan().machine(id).cloned() else {
                    return;
                };
                ui.heading(format!("Machine #{}", machine.label));
                ui.label(format!("Serial: {}", machine.serial));
                ui.label(format!(
                    "Type: {}",
                    self.catalog.machine_type_name(machine.machine_type)
                ));

                if self.editor.renaming() == Some(id) {
                    let response = ui.text_edit_singleline(&mut self.rename_buffer);
                    if response.lost_focus() {
                        let effects = if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                            self.editor.cancel_rename()
                        } else {
                            self.editor.commit_rename(&self.rename_buffer)
                        };
                        self.apply(effects);
                    } else {
                        response.request_focus();
                    }
                } else {
                    ui.horizontal(|ui| {
                        ui.label(machine.name.as_str());
                        if ui.small_button("✏").clicked() {
                            self.rename_buffer = machine.name.clone();
                            let effects = self.editor.begin_rename(id);
                            self.apply(effects);
                        }
                    });
                }

                let mut status = machine.status;
                egui::ComboBox::from_id_salt("machine_status")
                    .selected_text(status_label(status))
                    .show_ui(ui, |ui| {
                        for s in [MachineStatus::Activa, MachineStatus::Mantenimiento] {
                            ui.selectable_value(&mut status, s, status_label(s));
                        }
                    });
                if status != machine.status {
                    let effects = self.editor.set_status(id, status);
                    self.apply(effects);
                }

                ui.label(format!("Rotation: {}°", machine.r));
                self.rotate_buttons(ui, RotateTarget::Machine(id), dt);
                if ui.button("🗑 Delete machine").clicked() {
                    let effects = self.editor.remove_machine(id);
                    self.apply(effects);
                }
            }
            Selection::Zone(id) => {
                let Some(zone) = self.editor.plan().zone(id).cloned() else {
                    return;
                };
                ui.heading(format!("Zone {}", id));
                ui.label(self.catalog.zone_type_name(&zone.zone_type));
                ui.label(format!("{} × {} at ({}, {})", zone.w, zone.h, zone.x, zone.y));
                if ui.button("🗑 Delete zone").clicked() {
                    let effects = self.editor.remove_zone(id);
                    self.apply(effects);
                }
            }
            Selection::None => {
                ui.label("Click a machine or zone to select it.");
            }
        }
    }

    fn payload_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("payload")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("Form value");
                ui.label(format!("revision {}", self.binding.field().revision));
                ui.separator();
                let text = match self.binding.field().value() {
                    Some(value) => {
                        serde_json::to_string_pretty(value).unwrap_or_else(|e| e.to_string())
                    }
                    None => "null".to_string(),
                };
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut text.as_str())
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    });
            });
    }

    fn stage_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(25, 28, 32));

            let origin = rect.min + egui::vec2(STAGE_PADDING, STAGE_PADDING);
            let stage_rect = StageRect {
                left: f64::from(origin.x),
                top: f64::from(origin.y),
            };
            self.forward_pointer(ctx, &response, stage_rect);

            let zoom = self.editor.zoom() as f32;
            let stage = *self.editor.stage();
            let to_screen = |r: &Rect| -> egui::Rect {
                egui::Rect::from_min_size(
                    origin + egui::vec2(r.x as f32, r.y as f32) * zoom,
                    egui::vec2(r.w as f32, r.h as f32) * zoom,
                )
            };

            let stage_screen = to_screen(&Rect::new(0.0, 0.0, stage.width, stage.height));
            painter.rect_filled(stage_screen, 2.0, egui::Color32::from_rgb(34, 40, 52));
            draw_grid(&painter, stage_screen, zoom);

            let selection = self.editor.selection();
            for zone in &self.editor.plan().zones {
                let r = to_screen(&zone.rect());
                let selected = selection == Selection::Zone(zone.id);
                painter.rect_filled(r, 4.0, zone_color(&zone.zone_type));
                painter.rect_stroke(
                    r,
                    4.0,
                    egui::Stroke::new(
                        if selected { 2.0 } else { 1.0 },
                        egui::Color32::from_rgb(120, 160, 200),
                    ),
                );
                painter.text(
                    r.left_top() + egui::vec2(6.0, 4.0),
                    egui::Align2::LEFT_TOP,
                    self.catalog.zone_type_name(&zone.zone_type),
                    egui::FontId::proportional(12.0 * zoom),
                    egui::Color32::from_rgb(200, 220, 240),
                );
                if selected {
                    for handle in Handle::ALL {
                        let a = handle.anchor(&zone.rect());
                        let p = origin + egui::vec2(a.x as f32, a.y as f32) * zoom;
                        painter.rect_filled(
                            egui::Rect::from_center_size(p, egui::vec2(8.0, 8.0)),
                            1.0,
                            egui::Color32::WHITE,
                        );
                    }
                }
            }

            for machine in &self.editor.plan().machines {
                let r = to_screen(&machine.rect());
                let selected = selection == Selection::Machine(machine.id);
                draw_machine(ui, &painter, r, machine, selected, zoom);
            }

            for kind in [DoorKind::Entrada, DoorKind::Salida] {
                if let Some(door) = self.editor.plan().door(kind) {
                    let r = to_screen(&door.rect());
                    let color = match kind {
                        DoorKind::Entrada => egui::Color32::from_rgb(80, 170, 110),
                        DoorKind::Salida => egui::Color32::from_rgb(190, 90, 80),
                    };
                    draw_rotated_rect(&painter, r, door.r, color, egui::Stroke::NONE);
                    painter.text(
                        r.center(),
                        egui::Align2::CENTER_CENTER,
                        kind.label(),
                        egui::FontId::proportional(12.0 * zoom),
                        egui::Color32::WHITE,
                    );
                }
            }

            draw_guides(&painter, stage_screen, self.editor.guides(), origin, zoom);

            if let Interaction::PlacingDoor(kind) = self.editor.interaction() {
                painter.text(
                    stage_screen.center_top() + egui::vec2(0.0, 8.0),
                    egui::Align2::CENTER_TOP,
                    format!("Click an empty spot to place {}", kind.label()),
                    egui::FontId::proportional(14.0),
                    egui::Color32::from_rgb(255, 230, 120),
                );
            }
        });
    }

    /// Translate this frame's egui pointer state into editor pointer events
    fn forward_pointer(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        stage_rect: StageRect,
    ) {
        let (pressed, released, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        let Some(pos) = pos else {
            return;
        };
        let event = PointerEvent::new(f64::from(pos.x), f64::from(pos.y), stage_rect);

        if pressed && response.hovered() {
            self.pointer_captured = true;
            self.last_pointer = Some(pos);
            let effects = self.editor.on_pointer_down(&event);
            self.apply(effects);
        } else if self.pointer_captured && self.last_pointer != Some(pos) {
            self.last_pointer = Some(pos);
            let effects = self.editor.on_pointer_move(&event);
            self.apply(effects);
        }

        if released && self.pointer_captured {
            self.pointer_captured = false;
            self.last_pointer = None;
            let effects = self.editor.on_pointer_up(&event);
            self.apply(effects);
        }
    }

    fn keyboard(&mut self, ctx: &egui::Context) {
        // Keys typed into a text field belong to that field
        if ctx.memory(|m| m.focused().is_some()) {
            return;
        }
        let keys = ctx.input(|i| {
            [
                (egui::Key::Delete, Key::Delete),
                (egui::Key::Backspace, Key::Backspace),
                (egui::Key::Escape, Key::Escape),
            ]
            .into_iter()
            .filter(|(k, _)| i.key_pressed(*k))
            .map(|(_, key)| key)
            .collect::<Vec<_>>()
        });
        for key in keys {
            let effects = self.editor.on_key(key);
            self.apply(effects);
        }
    }
}

impl eframe::App for FloorplanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (dt, focused) = ctx.input(|i| (i.stable_dt, i.focused));
        let dt = Duration::from_secs_f32(dt.max(0.0));

        if self.was_focused && !focused {
            self.held = None;
            let effects = self.editor.on_blur();
            self.apply(effects);
        }
        self.was_focused = focused;

        self.menu_bar(ctx);

        egui::TopBottomPanel::bottom("info_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Floorplan v0.1.0");
                ui.separator();
                ui.label(format!("Zoom {:.0}%", self.editor.zoom() * 100.0));
                ui.separator();
                let plan = self.editor.plan();
                ui.label(format!(
                    "{} machines | {} zones",
                    plan.machines.len(),
                    plan.zones.len()
                ));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status.as_str());
                }
            });
        });

        self.tools_panel(ctx, dt);
        self.payload_panel(ctx);
        self.stage_canvas(ctx);
        self.keyboard(ctx);

        // Holds advance on frame time, so keep frames coming while a button is down.
        if self.held.is_some() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

fn status_label(status: MachineStatus) -> &'static str {
    match status {
        MachineStatus::Activa => "Activa",
        MachineStatus::Mantenimiento => "Mantenimiento",
    }
}

fn zone_color(zone_type: &str) -> egui::Color32 {
    let hash = zone_type
        .bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let palette = [
        egui::Color32::from_rgba_unmultiplied(70, 110, 160, 60),
        egui::Color32::from_rgba_unmultiplied(150, 100, 170, 60),
        egui::Color32::from_rgba_unmultiplied(90, 150, 110, 60),
        egui::Color32::from_rgba_unmultiplied(170, 140, 80, 60),
    ];
    palette[(hash % palette.len() as u32) as usize]
}

fn draw_grid(painter: &egui::Painter, rect: egui::Rect, zoom: f32) {
    // One line per 5 grid units keeps the canvas readable
    let grid_size = 50.0 * zoom;
    let grid_color = egui::Color32::from_rgba_unmultiplied(100, 100, 100, 30);

    let mut x = rect.left();
    while x < rect.right() {
        painter.line_segment(
            [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
            egui::Stroke::new(1.0, grid_color),
        );
        x += grid_size;
    }

    let mut y = rect.top();
    while y < rect.bottom() {
        painter.line_segment(
            [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
            egui::Stroke::new(1.0, grid_color),
        );
        y += grid_size;
    }
}

fn draw_guides(
    painter: &egui::Painter,
    stage: egui::Rect,
    guides: Guides,
    origin: egui::Pos2,
    zoom: f32,
) {
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 200, 80));
    if let Some(x) = guides.x {
        let sx = origin.x + x as f32 * zoom;
        painter.line_segment(
            [egui::pos2(sx, stage.top()), egui::pos2(sx, stage.bottom())],
            stroke,
        );
    }
    if let Some(y) = guides.y {
        let sy = origin.y + y as f32 * zoom;
        painter.line_segment(
            [egui::pos2(stage.left(), sy), egui::pos2(stage.right(), sy)],
            stroke,
        );
    }
}

/// Fill `rect` rotated by `degrees` around its centre
fn draw_rotated_rect(
    painter: &egui::Painter,
    rect: egui::Rect,
    degrees: i32,
    fill: egui::Color32,
    stroke: egui::Stroke,
) {
    let angle = (degrees as f32).to_radians();
    let (sin, cos) = angle.sin_cos();
    let c = rect.center();
    let half = rect.size() / 2.0;
    let points = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
        .into_iter()
        .map(|(sx, sy): (f32, f32)| {
            let (dx, dy) = (sx * half.x, sy * half.y);
            egui::pos2(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
        })
        .collect();
    painter.add(egui::Shape::convex_polygon(points, fill, stroke));
}

fn draw_machine(
    ui: &egui::Ui,
    painter: &egui::Painter,
    rect: egui::Rect,
    machine: &MachineItem,
    selected: bool,
    zoom: f32,
) {
    let fill = match machine.status {
        MachineStatus::Activa => egui::Color32::from_rgb(60, 70, 90),
        MachineStatus::Mantenimiento => egui::Color32::from_rgb(110, 80, 50),
    };
    let stroke = if selected {
        egui::Stroke::new(2.0, egui::Color32::from_rgb(255, 200, 80))
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_rgb(150, 160, 180))
    };
    draw_rotated_rect(painter, rect, machine.r, fill, stroke);

    if Path::new(&machine.image).exists() {
        let uri = format!("file://{}", machine.image);
        egui::Image::new(uri)
            .rotate((machine.r as f32).to_radians(), egui::Vec2::splat(0.5))
            .paint_at(ui, rect.shrink(8.0 * zoom));
    }

    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        format!("#{} {}", machine.label, machine.name),
        egui::FontId::proportional(13.0 * zoom),
        egui::Color32::WHITE,
    );
}
