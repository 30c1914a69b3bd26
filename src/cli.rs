//! Floorplan CLI - Inspect and normalize stored plans

use floorplan::codec;
use floorplan::config::EditorConfig;
use floorplan::geometry::rect_overlap;
use floorplan::plan::{within_stage, DoorKind};
use std::env;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Floorplan CLI - Plan inspector");
        println!("Usage: floorplan-cli <plan.json> [--normalize]");
        println!();
        println!("  --normalize   snap and clamp every entity, then print the plan JSON");
        return;
    }

    let filename = &args[1];
    let normalize = args[2..].iter().any(|a| a == "--normalize");
    let config = EditorConfig::from_env();
    let stage = config.stage();

    let mut plan = match codec::read_file(filename) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("❌ Could not read plan '{}': {}", filename, e);
            std::process::exit(1);
        }
    };

    if normalize {
        plan.normalize(&stage);
        match codec::to_json_string(&plan) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Could not encode plan: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("✅ Loaded plan from {}", filename);
    println!();
    println!("  Machines: {}", plan.machines.len());
    for m in &plan.machines {
        println!(
            "    - #{} {} [{}] {:?} at ({}, {}) r={}",
            m.label,
            m.name,
            m.serial,
            m.machine_type,
            m.x,
            m.y,
            m.r
        );
    }
    println!("  Zones: {}", plan.zones.len());
    for z in &plan.zones {
        println!("    - {} {} {}x{} at ({}, {})", z.id, z.zone_type, z.w, z.h, z.x, z.y);
    }
    for kind in [DoorKind::Entrada, DoorKind::Salida] {
        match plan.door(kind) {
            Some(d) => println!("  {}: ({}, {}) r={}", kind.label(), d.x, d.y, d.r),
            None => println!("  {}: not placed", kind.label()),
        }
    }

    let mut problems = 0;
    for m in &plan.machines {
        if !within_stage(&m.rect(), &stage) {
            println!("⚠ machine {} lies outside the stage", m.id);
            problems += 1;
        }
    }
    for (i, a) in plan.machines.iter().enumerate() {
        for b in &plan.machines[i + 1..] {
            if rect_overlap(&a.rect(), &b.rect()) {
                println!("⚠ machines {} and {} overlap", a.id, b.id);
                problems += 1;
            }
        }
    }
    if problems > 0 {
        println!();
        println!("{} problem(s) found", problems);
    }
}
