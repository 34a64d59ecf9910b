use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stackview_core::{Facing, LayerStack};
use stackview_io::{load_dataset, tessellate_layer};
use stackview_renderer::{CameraState, ViewerSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect encoded layer stack datasets")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode every layer of a dataset and print a summary
    Inspect {
        /// Dataset JSON file (array of layer records)
        file: PathBuf,

        /// Viewer settings JSON; missing fields use defaults
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Print the sky130 layer stack preset as JSON
    Layers,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match args.command {
        Command::Inspect { file, settings } => inspect(&file, settings.as_deref()),
        Command::Layers => {
            println!("{}", serde_json::to_string_pretty(&LayerStack::sky130())?);
            Ok(())
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<ViewerSettings, Box<dyn Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let settings = ViewerSettings::from_json(&text)?;
            log::info!("Loaded viewer settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(ViewerSettings::default()),
    }
}

fn inspect(file: &Path, settings: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(settings)?;
    let dataset = load_dataset(file)?;
    let stack = LayerStack::sky130();

    println!("{}: {} layers", file.display(), dataset.layer_count());
    for layer in &dataset.layers {
        let mesh = tessellate_layer(layer)?;
        let name = stack
            .get_layer_by_label(&layer.layer)
            .map(|spec| spec.name.as_str())
            .unwrap_or("?");
        let extent = layer.world_extent();
        println!(
            "  {:<8} {:<12} elev {:>7.1} nm  thick {:>6.1} nm  z-scale {:.3e}  extent {:.4} x {:.4}",
            layer.layer,
            name,
            layer.elevation,
            layer.thickness,
            layer.z_scale(),
            extent[0],
            extent[1]
        );
        println!(
            "           points {}  cap triangles {}  walls {}",
            mesh.point_count(),
            mesh.cap_triangle_count(),
            Facing::ALL
                .iter()
                .map(|&f| format!("{} {}", f.name(), mesh.wall_edge_count(f)))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let extent = dataset.world_extent();
    println!("world extent: {:.4} x {:.4}", extent[0], extent[1]);
    println!(
        "initial camera: {}",
        serde_json::to_string(&CameraState::initial(&settings))?
    );
    Ok(())
}
