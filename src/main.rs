// Copyright 2020 TwoCookingMice

use caustic::core::progress::ConsoleProgress;
use caustic::core::scene_loader::load_scene_with_settings;
use caustic::core::settings::RenderSettings;
use caustic::emitters::photon_emitter::PhotonEmitter;
use caustic::integrators::photon_gather::PhotonGatherIntegrator;
use caustic::io::{exr_utils, image_utils};
use caustic::renderers::frame::FrameRenderer;
use caustic::renderers::renderer::Renderer;

use console::style;
use std::env;
use std::str::FromStr;
use std::time::Instant;

const DEFAULT_WIDTH: usize = 640;
const DEFAULT_HEIGHT: usize = 480;

fn parse_flag<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse::<T>().ok()) {
        Some(value) => value,
        None => {
            eprintln!("Invalid or missing value for {}", flag);
            std::process::exit(1);
        }
    }
}

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <scene.xml> <output.(exr|png)> [--width N] [--height N] [--depth N] [--photons N] \
             [--nearest N] [--radius R] [--filter K] [--seed N] [--threads N]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let load_result = match load_scene_with_settings(input_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to load scene {}: {}", input_path, e);
            std::process::exit(1);
        }
    };
    let mut scene = load_result.scene;
    let mut settings: RenderSettings = load_result.settings;
    let mut width = load_result.width.unwrap_or(DEFAULT_WIDTH);
    let mut height = load_result.height.unwrap_or(DEFAULT_HEIGHT);

    let mut i = 3;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        match flag {
            "--width" => width = parse_flag(&args, i, flag),
            "--height" => height = parse_flag(&args, i, flag),
            "--depth" => settings.rendering_depth = parse_flag(&args, i, flag),
            "--photons" => settings.photons_per_light = parse_flag(&args, i, flag),
            "--nearest" => settings.nearest_photons_num = parse_flag(&args, i, flag),
            "--radius" => settings.indirect_light_max_r = parse_flag(&args, i, flag),
            "--filter" => settings.filter_constant = parse_flag(&args, i, flag),
            "--seed" => settings.seed = parse_flag(&args, i, flag),
            "--threads" => settings.threads = Some(parse_flag(&args, i, flag)),
            other => {
                log::warn!("Ignoring unknown argument: {}", other);
                continue;
            }
        }
        i += 1;
    }

    let emitter = match PhotonEmitter::new(settings.clone()) {
        Ok(emitter) => emitter,
        Err(e) => {
            eprintln!("Invalid render settings: {}", e);
            std::process::exit(1);
        }
    };
    let integrator = match PhotonGatherIntegrator::new(&settings) {
        Ok(integrator) => integrator,
        Err(e) => {
            eprintln!("Invalid render settings: {}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let progress = ConsoleProgress::new();
    let stats = emitter.update_photon_map(&mut scene, &progress);

    let renderer = FrameRenderer::new(Box::new(integrator), settings.thread_count());
    let image = match renderer.render(&scene, width, height, &progress) {
        Ok(image) => image,
        Err(e) => {
            progress.finish();
            eprintln!("Rendering failed: {}", e);
            std::process::exit(2);
        }
    };
    progress.finish();

    let written = if output_path.ends_with(".exr") {
        exr_utils::write_exr_to_file(&image, output_path).map_err(|e| e.to_string())
    } else {
        image_utils::write_ldr_to_file(&image, output_path).map_err(|e| e.to_string())
    };
    if let Err(e) = written {
        eprintln!("Failed to write {}: {}", output_path, e);
        std::process::exit(3);
    }

    println!(
        "{} {}x{} in {:.2}s, {} global / {} caustic photons -> {}",
        style("Rendered").green().bold(),
        width,
        height,
        start.elapsed().as_secs_f64(),
        stats.global_photons,
        stats.caustic_photons,
        style(output_path).cyan()
    );
}
