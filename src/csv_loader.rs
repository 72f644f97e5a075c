use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::{ReaderBuilder, Writer};

use crate::types::{HandFrame, HandFrameError, Handedness, Keypoint, Landmark, NUM_LANDMARKS};

const HEADER: [&str; 7] = ["frame", "landmark", "x", "y", "z", "handedness", "confidence"];

/// Filas acumuladas de un frame mientras se lee el CSV
struct PartialFrame {
    points: [Option<Keypoint>; NUM_LANDMARKS],
    handedness: Handedness,
    confidence: f32,
}

/// Carga una grabación en el formato frame,landmark,x,y,z,handedness,confidence
/// (píxeles). Una fila con `landmark` vacío marca un tick sin mano; un índice
/// de frame sin filas también se lee como tick sin mano.
pub fn load_frames_from_csv(path: impl AsRef<Path>) -> Result<Vec<Option<HandFrame>>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut frames: BTreeMap<usize, PartialFrame> = BTreeMap::new();
    let mut no_hand: BTreeSet<usize> = BTreeSet::new();
    let mut tick_count = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result.with_context(|| format!("Fila {} inválida en {:?}", row, path))?;
        if record.len() < HEADER.len() {
            bail!("La fila {} no tiene {} columnas", row, HEADER.len());
        }

        let frame_idx: usize = record[0]
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row))?;
        tick_count = tick_count.max(frame_idx + 1);

        if record[1].trim().is_empty() {
            ensure!(
                !frames.contains_key(&frame_idx),
                "Frame {} marcado sin mano pero con landmarks (fila {})",
                frame_idx,
                row
            );
            no_hand.insert(frame_idx);
            continue;
        }
        ensure!(
            !no_hand.contains(&frame_idx),
            "Frame {} marcado sin mano pero con landmarks (fila {})",
            frame_idx,
            row
        );

        let landmark_idx: usize = record[1]
            .parse()
            .with_context(|| format!("landmark inválido en fila {}", row))?;
        let Some(landmark) = Landmark::from_index(landmark_idx) else {
            bail!("Landmark {} fuera de rango (fila {})", landmark_idx, row);
        };

        let x: f32 = record[2].parse().with_context(|| format!("x inválido en fila {}", row))?;
        let y: f32 = record[3].parse().with_context(|| format!("y inválido en fila {}", row))?;
        let z: f32 = record[4].parse().with_context(|| format!("z inválido en fila {}", row))?;
        let handedness: Handedness = record[5]
            .parse()
            .with_context(|| format!("handedness inválido en fila {}", row))?;
        let confidence: f32 = record[6]
            .parse()
            .with_context(|| format!("confidence inválido en fila {}", row))?;

        let partial = frames.entry(frame_idx).or_insert_with(|| PartialFrame {
            points: [None; NUM_LANDMARKS],
            handedness,
            confidence,
        });
        // Lateralidad y confianza son del frame: todas sus filas deben coincidir
        ensure!(
            partial.handedness == handedness && partial.confidence == confidence,
            "Frame {} con handedness/confidence inconsistentes (fila {})",
            frame_idx,
            row
        );
        ensure!(
            partial.points[landmark.index()].is_none(),
            "Landmark {} repetido en frame {} (fila {})",
            landmark_idx,
            frame_idx,
            row
        );
        partial.points[landmark.index()] = Some(Keypoint::new(x, y, z));
    }

    let mut out = Vec::with_capacity(tick_count);
    for frame_idx in 0..tick_count {
        match frames.remove(&frame_idx) {
            Some(partial) => {
                let points: Vec<Keypoint> = partial.points.iter().flatten().copied().collect();
                let frame = HandFrame::from_slice(&points, partial.handedness, partial.confidence)
                    .map_err(|e| match e {
                        HandFrameError::KeypointCount { .. } => {
                            anyhow::anyhow!("Frame {} incompleto: {}", frame_idx, e)
                        }
                        other => other.into(),
                    })?;
                out.push(Some(frame));
            }
            // Marcador o hueco en la numeración: no se detectó mano
            None => out.push(None),
        }
    }

    Ok(out)
}

/// Guarda una secuencia de ticks en el mismo formato que lee `load_frames_from_csv`.
/// Cada tick sin mano se escribe como una fila marcador para conservar la longitud.
pub fn save_frames_to_csv(path: impl AsRef<Path>, frames: &[Option<HandFrame>]) -> Result<()> {
    let path = path.as_ref();
    let mut writer =
        Writer::from_path(path).with_context(|| format!("No se pudo crear el CSV {:?}", path))?;
    writer.write_record(HEADER)?;

    for (frame_idx, frame) in frames.iter().enumerate() {
        let Some(frame) = frame else {
            writer.write_record([frame_idx.to_string().as_str(), "", "", "", "", "", ""])?;
            continue;
        };
        let handedness = match frame.handedness() {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        };
        for (landmark_idx, p) in frame.keypoints().iter().enumerate() {
            writer.write_record([
                frame_idx.to_string(),
                landmark_idx.to_string(),
                p.x.to_string(),
                p.y.to_string(),
                p.z.to_string(),
                handedness.to_string(),
                frame.confidence().to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fist, three_finger};
    use std::io::Write;

    fn write_rows(rows: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER.join(",")).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn full_frame_rows(frame_idx: usize) -> Vec<String> {
        (0..NUM_LANDMARKS)
            .map(|i| format!("{},{},{},{},0.0,Right,0.9", frame_idx, i, i * 10, 100 + i))
            .collect()
    }

    #[test]
    fn gaps_become_no_hand_ticks() {
        let mut rows = full_frame_rows(0);
        rows.extend(full_frame_rows(3));
        let file = write_rows(&rows);

        let frames = load_frames_from_csv(file.path()).unwrap();
        assert_eq!(frames.len(), 4);
        assert!(frames[0].is_some());
        assert!(frames[1].is_none());
        assert!(frames[2].is_none());

        let last = frames[3].as_ref().unwrap();
        assert_eq!(last.keypoint(Landmark::PinkyTip).x, 200.0);
        assert_eq!(last.keypoint(Landmark::Wrist).y, 100.0);
        assert_eq!(last.handedness(), Handedness::Right);
    }

    #[test]
    fn incomplete_frame_is_rejected() {
        let mut rows = full_frame_rows(0);
        rows.pop();
        let file = write_rows(&rows);
        let err = load_frames_from_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("incompleto"));
    }

    #[test]
    fn landmark_out_of_range_is_rejected() {
        let file = write_rows(&["0,21,1.0,1.0,0.0,Right,0.9".to_string()]);
        assert!(load_frames_from_csv(file.path()).is_err());
    }

    #[test]
    fn duplicated_landmark_is_rejected() {
        let mut rows = full_frame_rows(0);
        rows.push("0,4,1.0,1.0,0.0,Right,0.9".to_string());
        let file = write_rows(&rows);
        assert!(load_frames_from_csv(file.path()).is_err());
    }

    #[test]
    fn saved_recording_loads_back() {
        let frames = vec![
            Some(three_finger().build()),
            None,
            Some(fist().left().build()),
        ];
        let file = tempfile::NamedTempFile::new().unwrap();
        save_frames_to_csv(file.path(), &frames).unwrap();

        let loaded = load_frames_from_csv(file.path()).unwrap();
        assert_eq!(loaded, frames);
    }

    #[test]
    fn trailing_no_hand_ticks_survive_a_save() {
        let frames = vec![Some(fist().build()), None, None];
        let file = tempfile::NamedTempFile::new().unwrap();
        save_frames_to_csv(file.path(), &frames).unwrap();
        assert_eq!(load_frames_from_csv(file.path()).unwrap(), frames);

        let empty_session = vec![None; 4];
        save_frames_to_csv(file.path(), &empty_session).unwrap();
        assert_eq!(load_frames_from_csv(file.path()).unwrap(), empty_session);
    }

    #[test]
    fn marker_row_with_landmarks_is_rejected() {
        let mut rows = vec!["0,,,,,,".to_string()];
        rows.extend(full_frame_rows(0));
        let file = write_rows(&rows);
        assert!(load_frames_from_csv(file.path()).is_err());
    }

    #[test]
    fn inconsistent_frame_metadata_is_rejected() {
        let mut rows = full_frame_rows(0);
        rows[7] = "0,7,70,107,0.0,Left,0.9".to_string();
        let file = write_rows(&rows);
        let err = load_frames_from_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("inconsistentes"));

        let mut rows = full_frame_rows(0);
        rows[3] = "0,3,30,103,0.0,Right,0.5".to_string();
        let file = write_rows(&rows);
        assert!(load_frames_from_csv(file.path()).is_err());
    }

    #[test]
    fn empty_recording_has_no_ticks() {
        let file = write_rows(&[]);
        assert!(load_frames_from_csv(file.path()).unwrap().is_empty());
    }
}
