//! Example: Import and inspect a JSON-serialized X3D document tree.
//!
//! Run with: cargo run --example inspect_scene -- assets/lit_quad.json

use std::env;
use std::fs;

use anyhow::{Context, Result};
use x3d_core::scene::SceneNode;
use x3d_core::{import_document, DocNode, ImportOptions};

fn print_node(node: &SceneNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let origin = node.transform.w_axis;
    println!(
        "{}{} at ({:.2}, {:.2}, {:.2}) - meshes {:?}",
        indent,
        if node.name.is_empty() { "<group>" } else { node.name.as_str() },
        origin.x,
        origin.y,
        origin.z,
        node.meshes
    );
    for (key, value) in &node.metadata {
        println!("{}  @{} = {:?}", indent, key, value);
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_scene <path-to-json-document>");
        println!("\nExample:");
        println!("  cargo run --example inspect_scene -- assets/lit_quad.json");
        return Ok(());
    }

    let path = &args[1];
    println!("Importing document: {}", path);

    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let doc: DocNode = serde_json::from_str(&text).context("Document is not a valid node tree")?;
    let scene = import_document(&doc, &ImportOptions::default())?;

    println!("\n=== Scene: {} ===", scene.name);
    println!("Meshes: {}", scene.mesh_count());
    println!("Materials: {}", scene.material_count());
    println!("Lights: {}", scene.light_count());
    println!("Total faces: {}", scene.total_face_count());

    println!("\n--- Meshes ---");
    for (i, mesh) in scene.meshes.iter().enumerate() {
        println!(
            "  [{}] {} vertices, {} faces, primitives {:?}",
            i,
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.primitive_types
        );
        println!(
            "       Colors: {}, normals: {}, uvs: {}, material: {:?}",
            mesh.has_colors(),
            mesh.has_normals(),
            mesh.has_uvs(),
            mesh.material_index
        );
    }

    println!("\n--- Lights ---");
    for light in &scene.lights {
        println!(
            "  {} ({:?}) at ({:.2}, {:.2}, {:.2})",
            light.name, light.kind, light.position.x, light.position.y, light.position.z
        );
    }

    println!("\n--- Hierarchy ---");
    print_node(&scene.root, 1);

    Ok(())
}
