//! `roscfg kinds` - what can be managed

use anyhow::{Result, bail};
use colored::Colorize;
use ::declarative::{PropertyDescriptor, Registry};

use crate::resource;
use crate::ui;

pub fn run(kind: Option<&str>) -> Result<()> {
    let registry = resource::registry()?;
    match kind {
        None => list(&registry),
        Some(kind) => describe(&registry, kind),
    }
}

fn list(registry: &Registry) -> Result<()> {
    ui::header("Resource Kinds");
    for kind in registry.kinds() {
        let descriptor = registry.get(kind)?;
        println!(
            "  {:<40} {}",
            kind.bold(),
            descriptor.path().dimmed()
        );
    }
    println!();
    ui::dim("Run 'roscfg kinds <kind>' to list its properties.");
    Ok(())
}

fn describe(registry: &Registry, kind: &str) -> Result<()> {
    if !registry.contains(kind) {
        bail!("Unknown resource kind '{kind}'. Run 'roscfg kinds' to list kinds.");
    }
    let descriptor = registry.get(kind)?;

    ui::header(kind);
    ui::kv("Path", descriptor.path());
    ui::kv("Identity", descriptor.identity().name());

    ui::section("Properties");
    for property in descriptor.properties() {
        println!("  {:<32} {}", property.name().bold(), attributes(property).dimmed());
        if !property.description().is_empty() {
            println!("      {}", property.description());
        }
    }
    Ok(())
}

/// `type, mutability[, required][, default ...][, wire ...]`
fn attributes(property: &PropertyDescriptor) -> String {
    let mut parts = vec![
        property.value_type().to_string(),
        property.mutability().to_string(),
    ];
    if property.is_required() {
        parts.push("required".to_string());
    }
    if let Some(default) = property.default() {
        parts.push(format!("default {}", ui::format_value(default)));
    }
    if property.wire_name() != property.name().replace('_', "-") {
        parts.push(format!("wire {}", property.wire_name()));
    }
    parts.join(", ")
}
