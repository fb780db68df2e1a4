use caustic::core::integrator::Integrator;
use caustic::core::progress::NullProgress;
use caustic::core::scene_loader::load_scene_with_settings;
use caustic::core::sensor::pixel_ray;
use caustic::emitters::photon_emitter::PhotonEmitter;
use caustic::integrators::photon_gather::PhotonGatherIntegrator;
use caustic::renderers::frame::FrameRenderer;
use std::env;
use std::str::FromStr;

fn parse_value<T: FromStr>(value: Option<&String>, name: &str) -> T {
    match value.and_then(|v| v.parse::<T>().ok()) {
        Some(v) => v,
        None => {
            eprintln!("Invalid or missing value for {}", name);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--width N] [--height N] [--depth N] [--photons N] [--seed N]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x = parse_value(args.get(2), "x");
    let y = parse_value(args.get(3), "y");

    let load_result = match load_scene_with_settings(scene_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("failed to load scene: {}", e);
            std::process::exit(1);
        }
    };
    let mut scene = load_result.scene;
    let mut settings = load_result.settings;
    let mut width = load_result.width.unwrap_or(640);
    let mut height = load_result.height.unwrap_or(480);

    let mut i = 4;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        match flag {
            "--width" => width = parse_value(args.get(i), flag),
            "--height" => height = parse_value(args.get(i), flag),
            "--depth" => settings.rendering_depth = parse_value(args.get(i), flag),
            "--photons" => settings.photons_per_light = parse_value(args.get(i), flag),
            "--seed" => settings.seed = parse_value(args.get(i), flag),
            _ => continue,
        }
        i += 1;
    }

    if x >= width || y >= height {
        eprintln!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, width, height);
        std::process::exit(2);
    }

    let (emitter, integrator, density_pass) = match (
        PhotonEmitter::new(settings.clone()),
        PhotonGatherIntegrator::new(&settings),
        PhotonGatherIntegrator::new(&settings),
    ) {
        (Ok(emitter), Ok(integrator), Ok(density_pass)) => (emitter, integrator, density_pass),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            eprintln!("invalid settings: {}", e);
            std::process::exit(1);
        }
    };

    let stats = emitter.update_photon_map(&mut scene, &NullProgress);
    let camera = match scene.camera() {
        Some(camera) => camera.clone(),
        None => {
            eprintln!("scene has no camera");
            std::process::exit(1);
        }
    };

    let renderer = FrameRenderer::new(Box::new(density_pass), 1);
    let density = renderer.measure_density(&scene, &camera, width, height, &NullProgress);
    let ray = pixel_ray(&camera, x, y, width, height);
    let rgb = integrator.trace(&scene, &ray, &density);

    println!(
        "pixel ({}, {}) photons {}/{} reference {:.3} -> R {:.6}, G {:.6}, B {:.6}",
        x, y, stats.global_photons, stats.caustic_photons, density.reference_count, rgb.x, rgb.y, rgb.z
    );
}
