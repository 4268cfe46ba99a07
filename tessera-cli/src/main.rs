//! Tessera CLI
//!
//! Inspect and render the built-in display-list scenes.
//!
//! - `tessera scenes`                  # List scenes
//! - `tessera dump shapes --json`      # Print the ops of a scene
//! - `tessera stats nested`            # Counts, size, bounds and id
//! - `tessera render layers -o a.png`  # Rasterize to PNG

mod dump;
mod scenes;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tessera_common::warning::clear_warnings;
use tessera_display_list::{Color, Dispatcher, DisplayList, DisplayListBuilder, Rect};
use tessera_raster::{RasterOptions, render_display_list, save_png};

use dump::{OpListing, print_json, print_listing};
use scenes::{SCENE_HEIGHT, SCENE_WIDTH, SCENES, Scene};

/// Tessera: record, inspect and rasterize display lists
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # List the built-in scenes
    tessera scenes

    # Colored op listing, nested lists indented
    tessera dump nested

    # Machine-readable listing
    tessera dump shapes --json

    # Render at twice the logical size on a transparent background
    tessera render layers -o layers.png --scale 2 --transparent
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in scenes
    Scenes,
    /// Print the ops of a scene
    Dump {
        /// Scene name
        scene: String,
        /// Print JSON instead of a colored listing
        #[arg(long)]
        json: bool,
    },
    /// Print op count, byte size, bounds and id of a scene
    Stats {
        /// Scene name
        scene: String,
    },
    /// Rasterize a scene to a PNG file
    Render {
        /// Scene name
        scene: String,
        /// Output file
        #[arg(short, long, value_name = "FILE", default_value = "tessera.png")]
        output: PathBuf,
        /// Scale factor applied to the scene and the surface
        #[arg(long, default_value = "1.0")]
        scale: f32,
        /// Clear to transparent instead of white
        #[arg(long)]
        transparent: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scenes => {
            print_scenes();
            Ok(())
        }
        Command::Dump { scene, json } => {
            let list = build_scene(&scene)?;
            let entries = OpListing::of(&list);
            if json {
                print_json(&entries)?;
            } else {
                print_listing(&entries);
            }
            Ok(())
        }
        Command::Stats { scene } => {
            let list = build_scene(&scene)?;
            print_stats(&scene, &list);
            Ok(())
        }
        Command::Render {
            scene,
            output,
            scale,
            transparent,
        } => render(&scene, &output, scale, transparent),
    }
}

fn find_scene(name: &str) -> Result<&'static Scene> {
    scenes::find(name).with_context(|| {
        let names: Vec<&str> = SCENES.iter().map(|s| s.name).collect();
        format!("unknown scene '{name}' (available: {})", names.join(", "))
    })
}

fn build_scene(name: &str) -> Result<DisplayList> {
    find_scene(name)?
        .build()
        .with_context(|| format!("recording scene '{name}'"))
}

fn print_scenes() {
    println!("=== Scenes ===");
    for scene in SCENES {
        println!("  {:<14} {}", scene.name.bold(), scene.description);
    }
}

fn print_stats(name: &str, list: &DisplayList) {
    let bounds = list.bounds();
    println!("=== {} ===", name.bold());
    println!("  id:           {}", list.unique_id());
    println!("  ops:          {}", list.op_count());
    println!("  ops (nested): {}", list.op_count_nested());
    println!("  bytes:        {}", list.byte_count());
    println!("  bytes (nested): {}", list.byte_count_nested());
    println!(
        "  bounds:       l={:.1} t={:.1} r={:.1} b={:.1}",
        bounds.left, bounds.top, bounds.right, bounds.bottom
    );
    let cull = list.cull_rect();
    println!(
        "  cull:         l={:.1} t={:.1} r={:.1} b={:.1}",
        cull.left, cull.top, cull.right, cull.bottom
    );
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn render(name: &str, output: &Path, scale: f32, transparent: bool) -> Result<()> {
    if !(scale.is_finite() && scale > 0.0) {
        anyhow::bail!("scale must be a positive number, got {scale}");
    }
    let scene = build_scene(name)?;
    let list = if (scale - 1.0).abs() > f32::EPSILON {
        scaled(scene, scale)
    } else {
        scene
    };

    let mut options = RasterOptions::new(
        (SCENE_WIDTH * scale).ceil() as u32,
        (SCENE_HEIGHT * scale).ceil() as u32,
    );
    if transparent {
        options = options.with_background(Color::TRANSPARENT);
    }

    clear_warnings();
    let pixmap = render_display_list(&list, &options)?;
    save_png(&pixmap, output)?;
    println!(
        "Rendered {} ({}x{}) to: {}",
        name.bold(),
        options.width,
        options.height,
        output.display()
    );
    Ok(())
}

/// `list` replayed under a uniform scale.
fn scaled(list: DisplayList, scale: f32) -> DisplayList {
    let mut builder = DisplayListBuilder::with_cull_rect(Rect::from_ltrb(
        0.0,
        0.0,
        SCENE_WIDTH * scale,
        SCENE_HEIGHT * scale,
    ));
    builder.scale(scale, scale);
    builder.draw_display_list(&Arc::new(list));
    builder.build()
}
