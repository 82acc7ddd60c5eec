use crate::config::VisionSection;
use image::{DynamicImage, GrayImage};
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Laplacian variance below which a frame counts as blurry.
pub const DEFAULT_BLUR_THRESHOLD: f64 = 100.0;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("failed to read frame source {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("no images found in {0}")]
    EmptySource(PathBuf),
    #[error("{0} is not a still image (png, jpg, jpeg, bmp, webp); video files are not supported")]
    UnsupportedSource(PathBuf),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("frame has no backing file for the classifier")]
    MissingPath,
    #[error("no classifier configured, set [vision] classifier_command or fixed_label")]
    Unconfigured,
    #[error("failed to run classifier: {0}")]
    ClassifierSpawn(std::io::Error),
    #[error("failed to send frame to classifier: {0}")]
    ClassifierInput(std::io::Error),
    #[error("classifier failed: {0}")]
    ClassifierFailed(String),
    #[error("unrecognized classifier output: {0}")]
    ClassifierOutput(String),
    #[error("failed to read label map {0}: {1}")]
    LabelFile(PathBuf, std::io::Error),
    #[error("failed to parse label map: {0}")]
    LabelMap(serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub image: DynamicImage,
    pub path: Option<PathBuf>,
}

impl Frame {
    pub fn open(path: &Path) -> Result<Frame, VisionError> {
        let image = image::open(path).map_err(|source| VisionError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Frame {
            image,
            path: Some(path.to_path_buf()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

pub trait Classifier {
    fn predict(&self, frame: &Frame) -> Result<Prediction, VisionError>;
}

/// Always answers with the same label. Stands in for a model when only a
/// label is configured.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    pub label: String,
    pub confidence: f32,
}

impl FixedClassifier {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

impl Classifier for FixedClassifier {
    fn predict(&self, _frame: &Frame) -> Result<Prediction, VisionError> {
        Ok(Prediction {
            label: self.label.clone(),
            confidence: self.confidence,
        })
    }
}

/// Runs an external model process on the frame's image file.
///
/// By default the process prints a label and confidence. With a label map it
/// instead receives the frame as a `size * size * 3` little-endian f32 tensor
/// on stdin and prints one probability per class, which is reduced with
/// [`LabelMap::best_prediction`].
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
    scores: Option<ScoreOutput>,
}

#[derive(Debug, Clone)]
struct ScoreOutput {
    labels: LabelMap,
    input_size: u32,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            scores: None,
        }
    }

    pub fn with_label_map(mut self, labels: LabelMap, input_size: u32) -> Self {
        self.scores = Some(ScoreOutput { labels, input_size });
        self
    }

    fn run(&self, path: &Path, input: Option<Vec<u8>>) -> Result<String, VisionError> {
        debug!(program = %self.program, path = %path.display(), "running classifier");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(VisionError::ClassifierSpawn)?;

        let writer = match (input, child.stdin.take()) {
            (Some(bytes), Some(mut stdin)) => {
                Some(std::thread::spawn(move || stdin.write_all(&bytes)))
            }
            _ => None,
        };
        let output = child
            .wait_with_output()
            .map_err(VisionError::ClassifierSpawn)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(VisionError::ClassifierFailed(if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            }));
        }
        if let Some(Ok(Err(err))) = writer.map(|writer| writer.join()) {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(VisionError::ClassifierInput(err));
            }
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Classifier for CommandClassifier {
    fn predict(&self, frame: &Frame) -> Result<Prediction, VisionError> {
        let path = frame.path.as_ref().ok_or(VisionError::MissingPath)?;
        let Some(scores) = &self.scores else {
            return parse_prediction(&self.run(path, None)?);
        };

        let input = input_bytes(frame, scores.input_size);
        let output = self.run(path, Some(input))?;
        let values = parse_scores(&output)?;
        let prediction = scores.labels.best_prediction(&values).ok_or_else(|| {
            VisionError::ClassifierOutput(format!(
                "expected {} scores, got {}",
                scores.labels.labels().len(),
                values.len()
            ))
        })?;
        if !(0.0..=1.0).contains(&prediction.confidence) {
            return Err(VisionError::ClassifierOutput(format!(
                "score {} is not a probability",
                prediction.confidence
            )));
        }
        Ok(prediction)
    }
}

/// Picks the configured classifier. A command wins over a fixed label; a
/// `labels_path` switches the command to score output.
pub fn classifier_from_config(
    vision: &VisionSection,
) -> Result<Option<Box<dyn Classifier>>, VisionError> {
    if let Some((program, args)) = vision.classifier_command.split_first() {
        let mut classifier = CommandClassifier::new(program.clone(), args.to_vec());
        let labels_path = vision.labels_path.trim();
        if !labels_path.is_empty() {
            let content = std::fs::read_to_string(labels_path)
                .map_err(|err| VisionError::LabelFile(PathBuf::from(labels_path), err))?;
            let labels = LabelMap::from_json(&content)?;
            classifier = classifier.with_label_map(labels, vision.input_size);
        }
        return Ok(Some(Box::new(classifier)));
    }
    let label = vision.fixed_label.trim();
    if !label.is_empty() {
        return Ok(Some(Box::new(FixedClassifier::new(label, 1.0))));
    }
    Ok(None)
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    label: String,
    confidence: f32,
}

/// Accepts the last non-empty line of classifier output in one of three
/// shapes: `label<TAB>confidence`, `label confidence`, or a JSON object with
/// `label` and `confidence` keys.
pub fn parse_prediction(output: &str) -> Result<Prediction, VisionError> {
    let line = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| VisionError::ClassifierOutput("empty output".to_string()))?;
    let invalid = || VisionError::ClassifierOutput(line.to_string());

    let (label, confidence) = if line.starts_with('{') {
        let raw: RawPrediction = serde_json::from_str(line).map_err(|_| invalid())?;
        (raw.label, raw.confidence)
    } else {
        let (label, confidence) = line
            .split_once('\t')
            .or_else(|| line.rsplit_once(char::is_whitespace))
            .ok_or_else(invalid)?;
        let confidence = confidence.trim().parse::<f32>().map_err(|_| invalid())?;
        (label.to_string(), confidence)
    };

    let label = label.trim().to_string();
    if label.is_empty() || !(0.0..=1.0).contains(&confidence) {
        return Err(invalid());
    }
    Ok(Prediction { label, confidence })
}

/// Reads the last non-empty line as a score vector, either a JSON array or
/// numbers separated by whitespace or commas.
pub fn parse_scores(output: &str) -> Result<Vec<f32>, VisionError> {
    let line = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| VisionError::ClassifierOutput("empty output".to_string()))?;
    let invalid = || VisionError::ClassifierOutput(line.to_string());

    if line.starts_with('[') {
        return serde_json::from_str(line).map_err(|_| invalid());
    }
    line.split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f32>().map_err(|_| invalid()))
        .collect()
}

/// Class names in model output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Builds the map from `name -> class index` pairs.
    pub fn from_indices(indices: IndexMap<String, usize>) -> LabelMap {
        let mut pairs: Vec<(String, usize)> = indices.into_iter().collect();
        pairs.sort_by_key(|(_, index)| *index);
        LabelMap {
            labels: pairs.into_iter().map(|(name, _)| name).collect(),
        }
    }

    pub fn from_json(content: &str) -> Result<LabelMap, VisionError> {
        let indices: IndexMap<String, usize> =
            serde_json::from_str(content).map_err(VisionError::LabelMap)?;
        Ok(LabelMap::from_indices(indices))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn best_prediction(&self, scores: &[f32]) -> Option<Prediction> {
        best_prediction(scores, &self.labels)
    }
}

pub fn best_prediction(scores: &[f32], labels: &[String]) -> Option<Prediction> {
    if scores.is_empty() || scores.len() != labels.len() {
        return None;
    }
    let (index, confidence) = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| score.is_finite())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))?;
    Some(Prediction {
        label: labels[index].clone(),
        confidence,
    })
}

/// Resizes to `size` x `size` RGB and scales channels to `[0, 1]`, row-major
/// with interleaved channels.
pub fn prepare_input(frame: &Frame, size: u32) -> Vec<f32> {
    let resized = frame
        .image
        .resize_exact(size, size, image::imageops::FilterType::Triangle)
        .to_rgb8();
    resized
        .pixels()
        .flat_map(|p| [p[0], p[1], p[2]])
        .map(|channel| channel as f32 / 255.0)
        .collect()
}

fn input_bytes(frame: &Frame, size: u32) -> Vec<u8> {
    prepare_input(frame, size)
        .into_iter()
        .flat_map(f32::to_le_bytes)
        .collect()
}

/// Variance of the 3x3 Laplacian response, with borders mirrored around the
/// edge pixel.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }
    let w = width as i64;
    let h = height as i64;
    let at = |x: i64, y: i64| -> f64 {
        gray.get_pixel(reflect101(x, w) as u32, reflect101(y, h) as u32)[0] as f64
    };

    let mut responses = Vec::with_capacity((width * height) as usize);
    for y in 0..h {
        for x in 0..w {
            let response =
                at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            responses.push(response);
        }
    }

    let count = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / count;
    responses
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / count
}

fn reflect101(index: i64, len: i64) -> i64 {
    if len == 1 {
        return 0;
    }
    let mut index = index;
    if index < 0 {
        index = -index;
    }
    if index >= len {
        index = 2 * len - 2 - index;
    }
    index
}

pub fn is_blurry(frame: &Frame, threshold: f64) -> bool {
    let gray = frame.image.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return true;
    }
    laplacian_variance(&gray) < threshold
}

pub trait FrameSource {
    /// `Ok(None)` means no frame is available this tick.
    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError>;
}

/// Replays a single image or every image in a directory, in file name order,
/// looping back to the first one.
#[derive(Debug, Clone)]
pub struct ImageFolderSource {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl ImageFolderSource {
    pub fn open(path: &Path) -> Result<ImageFolderSource, VisionError> {
        let metadata =
            std::fs::metadata(path).map_err(|err| VisionError::Read(path.to_path_buf(), err))?;
        let mut files = Vec::new();
        if metadata.is_dir() {
            let entries = std::fs::read_dir(path)
                .map_err(|err| VisionError::Read(path.to_path_buf(), err))?;
            for entry in entries {
                let entry = entry.map_err(|err| VisionError::Read(path.to_path_buf(), err))?;
                let candidate = entry.path();
                if is_image_file(&candidate) {
                    files.push(candidate);
                }
            }
            files.sort();
        } else if is_image_file(path) {
            files.push(path.to_path_buf());
        } else {
            return Err(VisionError::UnsupportedSource(path.to_path_buf()));
        }
        if files.is_empty() {
            return Err(VisionError::EmptySource(path.to_path_buf()));
        }
        debug!(path = %path.display(), frames = files.len(), "opened frame source");
        Ok(ImageFolderSource { files, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageFolderSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
        let Some(path) = self.files.get(self.cursor).cloned() else {
            return Ok(None);
        };
        self.cursor = (self.cursor + 1) % self.files.len();
        Frame::open(&path).map(Some)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn gray_frame(gray: GrayImage) -> Frame {
        Frame {
            image: DynamicImage::ImageLuma8(gray),
            path: None,
        }
    }

    fn checkerboard(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    fn temp_dir(name: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "petal-vision-{}-{}-{}",
            name,
            std::process::id(),
            timestamp
        ));
        std::fs::create_dir_all(&path).expect("failed to create temp dir");
        path
    }

    #[test]
    fn uniform_frame_is_blurry() {
        let frame = gray_frame(GrayImage::from_pixel(32, 32, Luma([128])));
        assert_eq!(laplacian_variance(&frame.image.to_luma8()), 0.0);
        assert!(is_blurry(&frame, DEFAULT_BLUR_THRESHOLD));
    }

    #[test]
    fn checkerboard_frame_is_sharp() {
        let frame = gray_frame(checkerboard(32));
        assert!(laplacian_variance(&frame.image.to_luma8()) > DEFAULT_BLUR_THRESHOLD);
        assert!(!is_blurry(&frame, DEFAULT_BLUR_THRESHOLD));
    }

    #[test]
    fn single_pixel_frame_has_zero_variance() {
        let gray = GrayImage::from_pixel(1, 1, Luma([200]));
        assert_eq!(laplacian_variance(&gray), 0.0);
    }

    #[test]
    fn threshold_decides_blurriness() {
        let frame = gray_frame(checkerboard(16));
        assert!(is_blurry(&frame, f64::MAX));
        assert!(!is_blurry(&frame, 0.0));
    }

    #[test]
    fn parses_tab_space_and_json_output() {
        assert_eq!(
            parse_prediction("Bush Clock Vine\t0.91\n").expect("tab output"),
            Prediction {
                label: "Bush Clock Vine".to_string(),
                confidence: 0.91
            }
        );
        assert_eq!(
            parse_prediction("loading model...\nCommon Lantana 0.5")
                .expect("space output")
                .label,
            "Common Lantana"
        );
        assert_eq!(
            parse_prediction(r#"{"label": "Rose", "confidence": 0.25}"#).expect("json output"),
            Prediction {
                label: "Rose".to_string(),
                confidence: 0.25
            }
        );
    }

    #[test]
    fn rejects_malformed_output() {
        for output in ["", "Rose", "Rose high", "Rose 1.5", "\t0.4"] {
            assert!(
                matches!(
                    parse_prediction(output),
                    Err(VisionError::ClassifierOutput(_))
                ),
                "accepted {output:?}"
            );
        }
    }

    #[test]
    fn label_map_orders_by_class_index() {
        let map =
            LabelMap::from_json(r#"{"Rose": 2, "Datura": 0, "Marigold": 1}"#).expect("parse");
        assert_eq!(map.labels(), &["Datura", "Marigold", "Rose"]);
        let best = map.best_prediction(&[0.1, 0.2, 0.7]).expect("prediction");
        assert_eq!(best.label, "Rose");
        assert_eq!(best.confidence, 0.7);
    }

    #[test]
    fn best_prediction_rejects_mismatched_scores() {
        let labels = vec!["Rose".to_string(), "Datura".to_string()];
        assert_eq!(best_prediction(&[], &labels), None);
        assert_eq!(best_prediction(&[0.5], &labels), None);
        assert_eq!(
            best_prediction(&[f32::NAN, 0.3], &labels).map(|p| p.label),
            Some("Datura".to_string())
        );
    }

    #[test]
    fn prepare_input_scales_to_unit_range() {
        let frame = Frame {
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 6, image::Rgb([255, 0, 51]))),
            path: None,
        };
        let input = prepare_input(&frame, 4);
        assert_eq!(input.len(), 4 * 4 * 3);
        for (value, expected) in input[..3].iter().zip([1.0, 0.0, 0.2]) {
            assert!((value - expected).abs() < 0.01, "{value} != {expected}");
        }
    }

    #[test]
    fn fixed_classifier_is_chosen_without_a_command() {
        let mut vision = VisionSection::default();
        assert!(classifier_from_config(&vision).expect("config").is_none());
        vision.fixed_label = "Marigold".to_string();
        let classifier = classifier_from_config(&vision)
            .expect("config")
            .expect("classifier");
        let frame = gray_frame(checkerboard(2));
        assert_eq!(
            classifier.predict(&frame).expect("predict").label,
            "Marigold"
        );
    }

    #[test]
    fn parses_score_vectors() {
        assert_eq!(
            parse_scores("warming up\n[0.1, 0.9]").expect("json scores"),
            vec![0.1, 0.9]
        );
        assert_eq!(
            parse_scores("0.25 0.5,0.25\n").expect("plain scores"),
            vec![0.25, 0.5, 0.25]
        );
        assert!(matches!(
            parse_scores("0.2 high"),
            Err(VisionError::ClassifierOutput(_))
        ));
        assert!(matches!(
            parse_scores("\n"),
            Err(VisionError::ClassifierOutput(_))
        ));
    }

    #[test]
    fn input_bytes_holds_one_f32_per_channel() {
        let frame = Frame {
            image: DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, image::Rgb([255, 255, 255]))),
            path: None,
        };
        let bytes = input_bytes(&frame, 4);
        assert_eq!(bytes.len(), 4 * 4 * 3 * 4);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    }

    #[test]
    fn missing_label_map_file_is_reported() {
        let mut vision = VisionSection::default();
        vision.classifier_command = vec!["true".to_string()];
        vision.labels_path = "/nonexistent/petal/class_indices.json".to_string();
        assert!(matches!(
            classifier_from_config(&vision),
            Err(VisionError::LabelFile(_, _))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn score_command_receives_tensor_and_maps_best_class() {
        let dir = temp_dir("scores");
        let labels = dir.join("class_indices.json");
        std::fs::write(&labels, r#"{"Datura": 0, "Rose": 1, "Marigold": 2}"#)
            .expect("failed to write label map");

        let mut vision = VisionSection::default();
        vision.input_size = 4;
        vision.labels_path = labels.to_string_lossy().into_owned();
        vision.classifier_command = vec![
            "sh".to_string(),
            "-c".to_string(),
            r#"[ "$(wc -c | tr -d ' ')" -eq 192 ] && echo '[0.1, 0.7, 0.2]'"#.to_string(),
            "classifier".to_string(),
        ];
        let classifier = classifier_from_config(&vision)
            .expect("config")
            .expect("classifier");
        let frame = Frame {
            image: DynamicImage::ImageLuma8(checkerboard(8)),
            path: Some(dir.join("frame.png")),
        };
        let prediction = classifier.predict(&frame).expect("predict");
        assert_eq!(prediction.label, "Rose");
        assert_eq!(prediction.confidence, 0.7);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn score_count_must_match_label_map() {
        let labels = LabelMap::from_json(r#"{"Datura": 0, "Rose": 1}"#).expect("parse");
        let classifier = CommandClassifier::new(
            "sh",
            vec![
                "-c".to_string(),
                "cat > /dev/null; echo 0.4 0.3 0.3".to_string(),
                "classifier".to_string(),
            ],
        )
        .with_label_map(labels, 4);
        let frame = Frame {
            image: DynamicImage::ImageLuma8(checkerboard(8)),
            path: Some(PathBuf::from("frame.png")),
        };
        assert!(matches!(
            classifier.predict(&frame),
            Err(VisionError::ClassifierOutput(_))
        ));
    }

    #[test]
    fn command_classifier_needs_a_file() {
        let classifier = CommandClassifier::new("true", Vec::new());
        let frame = gray_frame(checkerboard(2));
        assert!(matches!(
            classifier.predict(&frame),
            Err(VisionError::MissingPath)
        ));
    }

    #[test]
    fn folder_source_replays_images_in_order() {
        let dir = temp_dir("folder");
        checkerboard(4)
            .save(dir.join("b.png"))
            .expect("failed to save frame");
        GrayImage::from_pixel(4, 4, Luma([9]))
            .save(dir.join("a.png"))
            .expect("failed to save frame");
        std::fs::write(dir.join("notes.txt"), "skip").expect("failed to write note");

        let mut source = ImageFolderSource::open(&dir).expect("open source");
        assert_eq!(source.len(), 2);
        let names: Vec<String> = (0..3)
            .map(|_| {
                let frame = source.next_frame().expect("frame").expect("some frame");
                frame
                    .path
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .expect("file name")
            })
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "a.png"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn video_file_is_rejected_as_source() {
        let dir = temp_dir("video");
        let video = dir.join("garden.mp4");
        std::fs::write(&video, b"not decoded").expect("failed to write video");
        assert!(matches!(
            ImageFolderSource::open(&video),
            Err(VisionError::UnsupportedSource(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_folder_is_rejected() {
        let dir = temp_dir("empty");
        assert!(matches!(
            ImageFolderSource::open(&dir),
            Err(VisionError::EmptySource(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
