//! DeepLabCut CSV import.
//!
//! DeepLabCut writes one column per (scorer, individual, bodypart, coord)
//! under a block of header rows labelled in the first column:
//!
//! ```text
//! scorer,DLC_resnet50,DLC_resnet50,DLC_resnet50,...
//! individuals,animal0,animal0,animal0,...
//! bodyparts,nose,nose,nose,...
//! coords,x,y,likelihood,...
//! 0,320.5,241.0,0.98,...
//! ```
//!
//! Single-animal projects omit the `individuals` row. Only the first
//! scorer and the first individual are imported and likelihood columns
//! are ignored. Empty and `NaN` cells mark a missing detection.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::frame::KeypointFrame;
use crate::track::{PoseError, PoseTrack, PoseTrackHeader};

const SCORER_ROW: &str = "scorer";
const INDIVIDUALS_ROW: &str = "individuals";
const BODYPARTS_ROW: &str = "bodyparts";
const COORDS_ROW: &str = "coords";

/// Column positions of one bodypart's coordinates.
#[derive(Debug)]
struct LandmarkColumns {
    name: String,
    x: Option<usize>,
    y: Option<usize>,
}

#[derive(Debug, Default)]
struct HeaderRows {
    scorer: Option<StringRecord>,
    individuals: Option<StringRecord>,
    bodyparts: Option<StringRecord>,
    coords: Option<StringRecord>,
}

impl HeaderRows {
    /// Store `record` if it is a header row; false once data starts.
    fn accept(&mut self, record: &StringRecord) -> bool {
        let slot = match record.get(0).map(str::trim) {
            Some(SCORER_ROW) => &mut self.scorer,
            Some(INDIVIDUALS_ROW) => &mut self.individuals,
            Some(BODYPARTS_ROW) => &mut self.bodyparts,
            Some(COORDS_ROW) => &mut self.coords,
            _ => return false,
        };
        *slot = Some(record.clone());
        true
    }
}

fn invalid(message: impl Into<String>) -> PoseError {
    PoseError::ValidationError {
        message: message.into(),
    }
}

fn cell(record: &StringRecord, column: usize) -> &str {
    record.get(column).map(str::trim).unwrap_or("")
}

impl PoseTrack {
    /// Parse a DeepLabCut CSV export.
    pub fn from_dlc_csv<R: Read>(input: R) -> Result<Self, PoseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let mut rows = HeaderRows::default();
        let mut selection: Option<(PoseTrackHeader, Vec<LandmarkColumns>)> = None;
        let mut frames = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let line = idx + 1;
            let record = result.map_err(|source| PoseError::CsvError { line, source })?;

            if selection.is_none() {
                if rows.accept(&record) {
                    continue;
                }
                selection = Some(select_columns(&rows)?);
            }
            if let Some((_, columns)) = &selection {
                frames.push(parse_frame(&record, columns, line)?);
            }
        }

        let (header, _) = match selection {
            Some(selection) => selection,
            None => select_columns(&rows)?,
        };
        Self::new(header, frames)
    }

    /// Load a DeepLabCut CSV export from disk.
    pub fn load_dlc_csv(path: impl AsRef<Path>) -> Result<Self, PoseError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PoseError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_dlc_csv(std::io::BufReader::new(file))
    }
}

/// Pick the first scorer and first individual, and locate each bodypart's
/// `x` and `y` columns.
fn select_columns(
    rows: &HeaderRows,
) -> Result<(PoseTrackHeader, Vec<LandmarkColumns>), PoseError> {
    let scorers = rows
        .scorer
        .as_ref()
        .ok_or_else(|| invalid("DeepLabCut CSV has no scorer row"))?;
    let bodyparts = rows
        .bodyparts
        .as_ref()
        .ok_or_else(|| invalid("DeepLabCut CSV has no bodyparts row"))?;
    let coords = rows
        .coords
        .as_ref()
        .ok_or_else(|| invalid("DeepLabCut CSV has no coords row"))?;

    let scorer = cell(scorers, 1).to_string();
    let individual = rows
        .individuals
        .as_ref()
        .map(|row| cell(row, 1).to_string());

    let mut columns: Vec<LandmarkColumns> = Vec::new();
    for column in 1..coords.len() {
        if cell(scorers, column) != scorer {
            continue;
        }
        if let (Some(row), Some(wanted)) = (&rows.individuals, &individual) {
            if cell(row, column) != wanted {
                continue;
            }
        }
        let name = cell(bodyparts, column);
        if name.is_empty() {
            continue;
        }
        let pos = match columns.iter().position(|c| c.name == name) {
            Some(pos) => pos,
            None => {
                columns.push(LandmarkColumns {
                    name: name.to_string(),
                    x: None,
                    y: None,
                });
                columns.len() - 1
            }
        };
        match cell(coords, column) {
            "x" => columns[pos].x = Some(column),
            "y" => columns[pos].y = Some(column),
            _ => {}
        }
    }

    if columns.is_empty() {
        return Err(invalid(format!(
            "DeepLabCut CSV has no bodypart columns for scorer '{scorer}'"
        )));
    }
    if let Some(incomplete) = columns.iter().find(|c| c.x.is_none() || c.y.is_none()) {
        return Err(invalid(format!(
            "bodypart '{}' is missing an x or y column",
            incomplete.name
        )));
    }

    let mut header = PoseTrackHeader::new(columns.iter().map(|c| c.name.clone()));
    header.scorer = scorer;
    if let Some(individual) = individual {
        header.individual = individual;
    }
    Ok((header, columns))
}

fn parse_frame(
    record: &StringRecord,
    columns: &[LandmarkColumns],
    line: usize,
) -> Result<KeypointFrame, PoseError> {
    let label = cell(record, 0);
    let index: u64 = label.parse().map_err(|_| {
        invalid(format!(
            "line {line}: frame index '{label}' is not an integer"
        ))
    })?;

    let mut frame = KeypointFrame::new(index);
    for landmark in columns {
        let x = landmark
            .x
            .map(|col| parse_coordinate(record, col, line))
            .transpose()?
            .flatten();
        let y = landmark
            .y
            .map(|col| parse_coordinate(record, col, line))
            .transpose()?
            .flatten();
        frame = frame.with(landmark.name.clone(), x.zip(y));
    }
    Ok(frame)
}

fn parse_coordinate(
    record: &StringRecord,
    column: usize,
    line: usize,
) -> Result<Option<f64>, PoseError> {
    let raw = cell(record, column);
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(|_| {
        invalid(format!(
            "line {line}, column {}: '{raw}' is not a number",
            column + 1
        ))
    })?;
    Ok(value.is_finite().then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point2D;
    use crate::reader::LandmarkReader;

    const MULTI_ANIMAL: &str = "\
scorer,DLC_hrnet,DLC_hrnet,DLC_hrnet,DLC_hrnet,DLC_hrnet,DLC_hrnet,DLC_hrnet,DLC_hrnet,DLC_hrnet
individuals,animal0,animal0,animal0,animal0,animal0,animal0,animal1,animal1,animal1
bodyparts,nose,nose,nose,tail_base,tail_base,tail_base,nose,nose,nose
coords,x,y,likelihood,x,y,likelihood,x,y,likelihood
0,10.0,20.0,0.99,5.0,6.0,0.9,400.0,400.0,0.8
1,12.5,20.0,0.98,,,,401.0,400.0,0.8
2,NaN,21.0,0.10,5.5,6.0,0.9,402.0,400.0,0.8
";

    #[test]
    fn test_multi_animal_uses_first_individual() {
        let track = PoseTrack::from_dlc_csv(MULTI_ANIMAL.as_bytes()).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track.header().scorer, "DLC_hrnet");
        assert_eq!(track.header().individual, "animal0");
        assert_eq!(track.landmark_names(), vec!["nose", "tail_base"]);
        assert_eq!(track.landmark_at(0, "nose"), Some(Point2D::new(10.0, 20.0)));
        assert_eq!(track.landmark_at(1, "nose"), Some(Point2D::new(12.5, 20.0)));
        assert_eq!(track.landmark_at(1, "tail_base"), None);
        assert_eq!(track.landmark_at(2, "nose"), None);
        assert_eq!(track.frame_rate(), None);
    }

    #[test]
    fn test_single_animal_without_individuals_row() {
        let csv = "\
scorer,DLC_resnet50,DLC_resnet50,DLC_resnet50
bodyparts,nose,nose,nose
coords,x,y,likelihood
3,1.0,2.0,0.9
4,2.0,2.0,0.9
";
        let track = PoseTrack::from_dlc_csv(csv.as_bytes()).unwrap();
        assert_eq!(track.header().individual, "animal0");
        assert_eq!(track.frame_index(0), Some(3));
        assert_eq!(track.landmark_at(1, "nose"), Some(Point2D::new(2.0, 2.0)));
    }

    #[test]
    fn test_header_only_gives_empty_track() {
        let csv = "scorer,s,s\nbodyparts,nose,nose\ncoords,x,y\n";
        let track = PoseTrack::from_dlc_csv(csv.as_bytes()).unwrap();
        assert!(track.is_empty());
        assert_eq!(track.landmark_names(), vec!["nose"]);
    }

    #[test]
    fn test_malformed_input_rejected() {
        let no_coords = "scorer,s,s\nbodyparts,nose,nose\n0,1.0,2.0\n";
        assert!(matches!(
            PoseTrack::from_dlc_csv(no_coords.as_bytes()),
            Err(PoseError::ValidationError { .. })
        ));

        let missing_y = "scorer,s,s\nbodyparts,nose,nose\ncoords,x,likelihood\n0,1.0,0.5\n";
        let err = PoseTrack::from_dlc_csv(missing_y.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("nose"));

        let bad_number = "scorer,s,s\nbodyparts,nose,nose\ncoords,x,y\n0,1.0,abc\n";
        let err = PoseTrack::from_dlc_csv(bad_number.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 4"));

        let bad_index = "scorer,s,s\nbodyparts,nose,nose\ncoords,x,y\nframe0,1.0,2.0\n";
        assert!(PoseTrack::from_dlc_csv(bad_index.as_bytes()).is_err());
    }
}
