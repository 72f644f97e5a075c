/*
Quiromedia - control multimedia con gestos de la mano

El detector de manos (proceso externo) escribe una línea JSON por frame en stdin:
    null                                  → no hay mano
    {"landmarks": [[x, y, z] x21], "handedness": "Right", "confidence": 0.9}

Para ejecutar con teclado virtual real:
    cargo build --release --features uinput
    detector | sg input -c './target/release/quiromedia --config quiromedia.json'

Para grabar una sesión y reproducirla luego con replay_csv:
    detector | ./target/release/quiromedia --record sesion.csv
*/

use anyhow::{bail, Context, Result};
use crossbeam_channel::bounded;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::{debug, error, info};

use quiromedia::config::AppConfig;
use quiromedia::csv_loader::save_frames_to_csv;
use quiromedia::logging::init_tracing;
use quiromedia::media::{KeySink, LogSink, SinkKind};
use quiromedia::pipeline::{Dispatch, GesturePipeline};
use quiromedia::source::{read_frames, FrameScale};
use quiromedia::types::HandFrame;

const FRAME_QUEUE: usize = 100;
const STATS_EVERY: u64 = 300;

const USAGE: &str = "Uso: quiromedia [--config archivo.json] [--record salida.csv]";

struct DaemonOptions {
    config_path: Option<PathBuf>,
    record_path: Option<PathBuf>,
}

fn parse_args() -> Result<Option<DaemonOptions>> {
    let mut config_path = None;
    let mut record_path = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config necesita una ruta")?;
                config_path = Some(PathBuf::from(value));
            }
            "--record" => {
                let value = args.next().context("--record necesita una ruta")?;
                record_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(None);
            }
            other => bail!("Argumento desconocido {:?}\n{}", other, USAGE),
        }
    }

    Ok(Some(DaemonOptions {
        config_path,
        record_path,
    }))
}

fn build_sink(kind: SinkKind) -> Result<Box<dyn KeySink>> {
    match kind {
        SinkKind::Log => Ok(Box::new(LogSink)),
        #[cfg(feature = "uinput")]
        SinkKind::Uinput => {
            let sink = quiromedia::media::UinputSink::new()
                .map_err(|e| anyhow::anyhow!("No se pudo abrir /dev/uinput: {}", e))?;
            Ok(Box::new(sink))
        }
        #[cfg(not(feature = "uinput"))]
        SinkKind::Uinput => {
            bail!("El sink uinput requiere compilar con --features uinput")
        }
    }
}

fn main() -> Result<()> {
    let Some(opts) = parse_args()? else {
        return Ok(());
    };

    let config = match &opts.config_path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("No se pudo cargar la configuración {:?}", path))?,
        None => AppConfig::default(),
    };
    init_tracing(&config.logging);

    info!(sink = ?config.media.sink, "🎯 Quiromedia iniciando");
    let sink = build_sink(config.media.sink)?;
    let mut pipeline = GesturePipeline::from_config(&config, sink)?;

    let scale = FrameScale {
        width: config.capture.width,
        height: config.capture.height,
    };
    let (tx, rx) = bounded::<Option<HandFrame>>(FRAME_QUEUE);

    // Hilo lector: stdin → canal. Termina en EOF.
    let reader = std::thread::spawn(move || {
        let stdin = io::stdin();
        match read_frames(stdin.lock(), scale, &tx) {
            Ok(count) => debug!(count, "fin de la entrada"),
            Err(e) => error!(error = %e, "error leyendo frames"),
        }
    });

    let mut recording: Vec<Option<HandFrame>> = Vec::new();
    let mut ticks = 0u64;
    let mut executed = 0u64;

    while let Ok(frame) = rx.recv() {
        let report = pipeline.process(frame.as_ref());
        ticks += 1;
        if report.dispatch == Dispatch::Executed {
            executed += 1;
        }
        if ticks % STATS_EVERY == 0 {
            info!(
                ticks,
                executed,
                fps = report.fps,
                status = %pipeline.media().status(),
                "estadísticas"
            );
        }
        if opts.record_path.is_some() {
            recording.push(frame);
        }
    }

    if reader.join().is_err() {
        error!("el hilo lector terminó con pánico");
    }

    if let Some(path) = &opts.record_path {
        save_frames_to_csv(path, &recording)
            .with_context(|| format!("No se pudo guardar la grabación {:?}", path))?;
        info!(frames = recording.len(), path = ?path, "grabación guardada");
    }

    info!(ticks, executed, "👋 Saliendo");
    Ok(())
}
