use anyhow::{anyhow, Context, Result};
use roomforge::config::ProjectConfig;
use roomforge::editor::SceneEditor;
use roomforge::import;
use std::env;
use std::fs;
use std::process;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "list" => {
            let scene_path =
                args.next().ok_or_else(|| anyhow!("list requires a path: room_tool list <scene>"))?;
            cmd_list(&scene_path)
        }
        "convert" => {
            let input = args
                .next()
                .ok_or_else(|| anyhow!("convert requires input path: room_tool convert <in> <out>"))?;
            let output = args
                .next()
                .ok_or_else(|| anyhow!("convert requires output path: room_tool convert <in> <out>"))?;
            cmd_convert(&input, &output)
        }
        "demo" => {
            let output =
                args.next().ok_or_else(|| anyhow!("demo requires output path: room_tool demo <out>"))?;
            cmd_demo(&output)
        }
        "assets" => {
            let base_url = args
                .next()
                .ok_or_else(|| anyhow!("assets requires a base url: room_tool assets <base_url>"))?;
            cmd_assets(&base_url)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Room Tool

Usage:
  room_tool list <scene_path>          List entities in a glTF/GLB scene
  room_tool convert <input> <output>   Transcode between .glb and .gltf
  room_tool demo <output>              Export a seeded demo room
  room_tool assets <base_url>          List importable assets from a catalog
  room_tool help                       Show this message
"
    );
}

fn cmd_list(scene_path: &str) -> Result<()> {
    let entities = import::import_from_path(scene_path)
        .with_context(|| format!("importing scene {scene_path}"))?;
    println!("{} entities", entities.len());
    for entity in &entities {
        let pos = entity.node.transform.position;
        let kind = if entity.light.is_some() { "light" } else { "mesh" };
        println!(
            "  {}  {:<24} {:>7} at ({:.2}, {:.2}, {:.2})  clips={}",
            entity.id,
            entity.name,
            kind,
            pos.x,
            pos.y,
            pos.z,
            entity.animations.len()
        );
    }
    Ok(())
}

fn cmd_convert(input: &str, output: &str) -> Result<()> {
    let entities =
        import::import_from_path(input).with_context(|| format!("importing scene {input}"))?;
    let binary = output.ends_with(".glb");
    let bytes = roomforge::export::export_to_bytes(&entities, binary)
        .with_context(|| format!("exporting scene to {output}"))?;
    fs::write(output, bytes).with_context(|| format!("writing {output}"))?;
    println!("wrote {output} ({} entities)", entities.len());
    Ok(())
}

fn cmd_assets(base_url: &str) -> Result<()> {
    let assets = roomforge::remote::fetch_catalog(base_url)
        .with_context(|| format!("fetching asset catalog from {base_url}"))?;
    println!("{} assets", assets.len());
    for asset in &assets {
        println!("  {:<24} {}", asset.name, asset.model_url);
    }
    Ok(())
}

fn cmd_demo(output: &str) -> Result<()> {
    let mut editor = SceneEditor::new(&ProjectConfig::default());
    editor.add_cube();
    editor.add_sphere();
    editor.add_light();
    let binary = output.ends_with(".glb");
    let bytes = if binary { editor.export_glb()? } else { editor.export_gltf_json()? };
    fs::write(output, bytes).with_context(|| format!("writing {output}"))?;
    println!("wrote demo room to {output}");
    Ok(())
}
