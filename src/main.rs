//! voxmat command-line front end.
//!
//! Usage: voxmat <COMMAND> [ARGS] [OPTIONS]
//!
//! Commands:
//!   info <scene.voxmat>                              Print extent and models
//!   new <scene.voxmat> [--size X,Y,Z]                Write an empty scene
//!   import <scene.voxmat> <model.xraw> [--at X,Y,Z] [--material ID]
//!                                                    Add an XRAW model
//!   place <scene.voxmat> <INDEX> --at X,Y,Z          Move a model
//!   material <scene.voxmat> <INDEX> <ID>             Assign a material
//!   export <scene.voxmat> <out.ama>                  Flatten to a materialized volume
//!   materials <list.amt>                             Print a material list
//!
//! Options:
//!   --config <FILE>   JSON config (default scene size, material list)

use std::num::NonZeroU16;
use std::path::Path;
use std::process;

use glam::{IVec3, UVec3};

use voxmat::core::{logging, Result};
use voxmat::scene::{self, MaterialCatalog, Scene, SceneConfig};
use voxmat::voxel;

const USAGE: &str = "Usage: voxmat <info|new|import|place|material|export|materials> ... [--config FILE]";

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let positional = positional_args(&args);
    let Some((&command, rest)) = positional.split_first() else {
        usage();
    };

    if let Err(e) = run(command, rest, &args) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(command: &str, pos: &[&str], args: &[String]) -> Result<()> {
    let config = match parse_str_arg(args, "--config") {
        Some(path) => SceneConfig::load(Path::new(&path))?,
        None => SceneConfig::default(),
    };

    match (command, pos) {
        ("info", [scene_path]) => {
            let scene = open_scene(Path::new(scene_path), &config)?;
            let catalog = load_catalog(&config)?;
            print_scene(&scene, catalog.as_ref());
        }
        ("new", [scene_path]) => {
            let size = match parse_str_arg(args, "--size") {
                Some(s) => parse_uvec3(&s),
                None => config.scene_size(),
            };
            let scene = Scene::with_size(size)?;
            scene::save_scene_file(&scene, Path::new(scene_path))?;
        }
        ("import", [scene_path, model_path]) => {
            let scene_path = Path::new(scene_path);
            let mut scene = open_scene(scene_path, &config)?;
            let mut model = voxel::import_file(Path::new(model_path))?;

            if let Some(at) = parse_str_arg(args, "--at") {
                model.set_placement(parse_ivec3(&at));
            }
            if let Some(id) = parse_u16_arg(args, "--material") {
                model.set_material_id(resolve_material(&config, id)?);
            }

            let index = scene.add_model(model);
            log::info!("Model added at index {}", index);
            scene::save_scene_file(&scene, scene_path)?;
        }
        ("place", [scene_path, index]) => {
            let scene_path = Path::new(scene_path);
            let mut scene = open_scene(scene_path, &config)?;
            let at = parse_str_arg(args, "--at").unwrap_or_else(|| usage());

            model_at(&mut scene, index)?.set_placement(parse_ivec3(&at));
            scene::save_scene_file(&scene, scene_path)?;
        }
        ("material", [scene_path, index, id]) => {
            let scene_path = Path::new(scene_path);
            let mut scene = open_scene(scene_path, &config)?;
            let id = resolve_material(&config, parse_or_usage(id))?;

            model_at(&mut scene, index)?.set_material_id(id);
            scene::save_scene_file(&scene, scene_path)?;
        }
        ("export", [scene_path, out_path]) => {
            let scene = open_scene(Path::new(scene_path), &config)?;
            scene::export_file(&scene, Path::new(out_path))?;
        }
        ("materials", [list_path]) => {
            let catalog = MaterialCatalog::load_file(Path::new(list_path))?;
            for (id, name) in catalog.iter() {
                println!("{:>5}  {}", id, name);
            }
        }
        _ => usage(),
    }

    Ok(())
}

/// Load an existing scene, or start an empty one at the configured size
fn open_scene(path: &Path, config: &SceneConfig) -> Result<Scene> {
    let mut scene = Scene::with_size(config.scene_size())?;
    if path.exists() {
        scene::load_scene_file(&mut scene, path)?;
    } else {
        log::info!("{} does not exist, starting a new scene", path.display());
    }
    Ok(scene)
}

fn load_catalog(config: &SceneConfig) -> Result<Option<MaterialCatalog>> {
    match &config.materials {
        Some(path) => Ok(Some(MaterialCatalog::load_file(path)?)),
        None => Ok(None),
    }
}

/// Validate a material id against the configured catalog, if any
fn resolve_material(config: &SceneConfig, id: u16) -> Result<NonZeroU16> {
    match load_catalog(config)? {
        Some(catalog) => Ok(catalog.resolve(id)?),
        None => NonZeroU16::new(id).ok_or_else(|| {
            voxmat::core::MaterialError::UnknownId(id).into()
        }),
    }
}

fn model_at<'a>(scene: &'a mut Scene, index: &str) -> Result<&'a mut voxel::VoxelGrid> {
    let index: usize = parse_or_usage(index);
    scene
        .model_mut(index)
        .ok_or(voxmat::core::Error::NoSuchModel(index))
}

fn print_scene(scene: &Scene, catalog: Option<&MaterialCatalog>) {
    let size = scene.size();
    println!("Scene {}x{}x{}, {} models", size.x, size.y, size.z, scene.len());

    for (i, model) in scene.models().iter().enumerate() {
        let material = match catalog {
            Some(c) => c.label(model.material_id()),
            None => model.material_id().to_string(),
        };
        let quads = model.mesh().map(|m| m.quad_count()).unwrap_or(0);
        println!(
            "  [{}] {:<20} size {}  at {}  material {}  {} solid  {} faces",
            i,
            model.name(),
            model.size(),
            model.placement(),
            material,
            model.solid_count(),
            quads,
        );
    }
}

/// Arguments that are neither `--flag` nor a flag's value
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u16_arg(args: &[String], flag: &str) -> Option<u16> {
    parse_str_arg(args, flag).map(|s| parse_or_usage(&s))
}

fn parse_triple(s: &str) -> [i64; 3] {
    let parts: Vec<i64> = s.split(',').map(|p| parse_or_usage(p.trim())).collect();
    match parts.as_slice() {
        &[x, y, z] => [x, y, z],
        _ => usage(),
    }
}

fn parse_ivec3(s: &str) -> IVec3 {
    let [x, y, z] = parse_triple(s).map(|v| i32::try_from(v).unwrap_or_else(|_| usage()));
    IVec3::new(x, y, z)
}

fn parse_uvec3(s: &str) -> UVec3 {
    let [x, y, z] = parse_triple(s).map(|v| u32::try_from(v).unwrap_or_else(|_| usage()));
    UVec3::new(x, y, z)
}

fn parse_or_usage<T: std::str::FromStr>(s: &str) -> T {
    s.parse().unwrap_or_else(|_| usage())
}

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(2);
}
