use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use quiromedia::config::AppConfig;
use quiromedia::csv_loader::load_frames_from_csv;
use quiromedia::feature_extractor::extract;
use quiromedia::logging::init_tracing;
use quiromedia::media::LogSink;
use quiromedia::pipeline::{Dispatch, GesturePipeline};
use quiromedia::types::{Finger, Gesture};

const DEFAULT_REPLAY_FPS: f64 = 30.0;
const USAGE: &str = "Uso: replay_csv [--config archivo.json] [--fps N] [--dump-features] <grabación.csv>";

struct ReplayOptions {
    config_path: Option<PathBuf>,
    fps: f64,
    dump_features: bool,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut config_path = None;
    let mut fps = DEFAULT_REPLAY_FPS;
    let mut dump_features = false;
    let mut csv_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(
                    args.next().context("--config necesita una ruta")?,
                ));
            }
            "--fps" => {
                let value = args.next().context("--fps necesita un valor")?;
                fps = value
                    .parse()
                    .with_context(|| format!("FPS inválido: {:?}", value))?;
                if !(fps > 0.0) || !fps.is_finite() {
                    bail!("FPS debe ser positivo");
                }
            }
            "--dump-features" => dump_features = true,
            _ => {
                if csv_path.is_some() {
                    bail!("{}", USAGE);
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV\n{}", USAGE))?;
    Ok((
        csv_path,
        ReplayOptions {
            config_path,
            fps,
            dump_features,
        },
    ))
}

fn main() -> Result<()> {
    let (csv_path, opts) = parse_args()?;

    let config = match &opts.config_path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("No se pudo cargar la configuración {:?}", path))?,
        None => AppConfig::default(),
    };
    init_tracing(&config.logging);

    println!("🎞️  Reproduciendo grabación desde {:?}", csv_path);
    let frames = load_frames_from_csv(&csv_path)?;
    let with_hand = frames.iter().filter(|f| f.is_some()).count();
    println!(
        "ℹ️  {} ticks ({} con mano) a {} FPS\n",
        frames.len(),
        with_hand,
        opts.fps
    );

    // Solo registra: la reproducción nunca pulsa teclas reales
    let mut pipeline = GesturePipeline::from_config(&config, LogSink)?;
    let t0 = Instant::now();
    let tick = Duration::from_secs_f64(1.0 / opts.fps);

    let mut classified: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut executed: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (idx, frame) in frames.iter().enumerate() {
        if opts.dump_features {
            if let Some(frame) = frame {
                let f = extract(frame);
                let fingers: String = Finger::ALL
                    .iter()
                    .map(|&finger| if f.fingers.is_extended(finger) { '1' } else { '0' })
                    .collect();
                println!(
                    "  {:05} dedos={} pose={:?} pinza={:.1} palma=({:.1}, {:.1}) muñeca_y={:.1} ángulos={:?}",
                    idx,
                    fingers,
                    f.pose,
                    f.pinch_distance,
                    f.palm_center.0,
                    f.palm_center.1,
                    f.wrist_y,
                    f.joint_angles.map(|a| a.round()),
                );
            }
        }

        let report = pipeline.process_at(frame.as_ref(), t0 + tick * idx as u32);
        if report.gesture == Gesture::None {
            continue;
        }

        *classified.entry(report.gesture.as_str()).or_default() += 1;
        let marker = match report.dispatch {
            Dispatch::Executed => {
                *executed.entry(report.gesture.as_str()).or_default() += 1;
                "✅"
            }
            Dispatch::CoolingDown => "⏳",
            Dispatch::Failed => "❌",
            Dispatch::Idle => "·",
        };
        println!(
            "{} {:05} {:<28} {:?}",
            marker,
            idx,
            report.gesture.display_name(),
            report.dispatch
        );
    }

    println!("\nResumen por gesto (clasificados / ejecutados):");
    for gesture in Gesture::ALL.iter().filter(|g| !g.is_none()) {
        let name = gesture.as_str();
        let seen = classified.get(name).copied().unwrap_or(0);
        if seen == 0 {
            continue;
        }
        let fired = executed.get(name).copied().unwrap_or(0);
        println!("  {:<14} {:>5} / {:<5}", name, seen, fired);
    }
    println!("\nEstado final: {}", pipeline.media().status());

    Ok(())
}
