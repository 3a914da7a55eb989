// Loading of the ASCII-art image files and their label files.
// Image files are plain text: each image is `height` consecutive lines of
// `width` characters, where ' ' is blank, '+' a partial mark and '#' a full mark.
// Label files hold one integer label per line, in image order.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter;
use std::path::Path;

use clap::ValueEnum;
use log::debug;

use crate::dataset::{Dataset, FeatureVector, LabeledExample};
use crate::{KnnError, Label, Pixel, Result};

// Map one line of an image to pixel codes
pub fn translate_pixels(line: &str) -> Vec<Pixel> {
    line.chars()
        .map(|c| match c {
            '+' => 1,
            '#' => 2,
            _ => 0,
        })
        .collect()
}

// Read images from a reader, `height` lines at a time.
// Lines are padded (or cut) to `width`; an incomplete image at the end is dropped.
pub fn read_images(reader: impl BufRead, width: usize, height: usize) -> Result<Vec<FeatureVector>> {
    let mut images = Vec::new();
    let mut pixels: Vec<Pixel> = Vec::with_capacity(width * height);
    let mut rows = 0;
    for line in reader.lines() {
        let line = line?;
        pixels.extend(
            translate_pixels(&line)
                .into_iter()
                .chain(iter::repeat(0))
                .take(width),
        );
        rows += 1;
        if rows == height {
            images.push(FeatureVector::new(std::mem::take(&mut pixels))?);
            pixels.reserve(width * height);
            rows = 0;
        }
    }
    if rows > 0 {
        debug!("Dropping {} trailing lines of an incomplete image", rows);
    }
    Ok(images)
}

// Read one label per line, stopping at the first empty line
pub fn read_labels(reader: impl BufRead) -> Result<Vec<Label>> {
    let mut labels = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let label = line.parse::<Label>().map_err(|e| KnnError::Parse {
            line: i + 1,
            message: format!("bad label {:?}: {}", line, e),
        })?;
        labels.push(label);
    }
    Ok(labels)
}

// Pair up an image file with its label file.
// Extra labels are ignored; missing labels are an error.
pub fn load_dataset(
    name: &'static str,
    images_path: &Path,
    labels_path: &Path,
    width: usize,
    height: usize,
) -> Result<Dataset> {
    let images = read_images(BufReader::new(File::open(images_path)?), width, height)?;
    let labels = read_labels(BufReader::new(File::open(labels_path)?))?;
    if labels.len() < images.len() {
        return Err(KnnError::LabelCountMismatch {
            images: images.len(),
            labels: labels.len(),
        });
    }
    debug!(
        "Read {} images and {} labels from {}",
        images.len(),
        labels.len(),
        images_path.display()
    );
    Dataset::new(
        name,
        images
            .into_iter()
            .zip(labels)
            .map(|(vector, label)| LabeledExample::new(vector, label))
            .collect(),
    )
}

// The two image collections the program knows how to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetKind {
    Digits,
    Faces,
}

// File names of one collection, relative to the data directory
pub struct DatasetFiles {
    pub training_images: &'static str,
    pub training_labels: &'static str,
    pub test_images: &'static str,
    pub test_labels: &'static str,
}

impl DatasetKind {
    pub fn width(self) -> usize {
        match self {
            DatasetKind::Digits => 28,
            DatasetKind::Faces => 60,
        }
    }

    pub fn height(self) -> usize {
        match self {
            DatasetKind::Digits => 28,
            DatasetKind::Faces => 70,
        }
    }

    // Best k found for each collection, used when no k values are given
    pub fn default_k(self) -> usize {
        match self {
            DatasetKind::Digits => 1,
            DatasetKind::Faces => 5,
        }
    }

    pub fn files(self) -> DatasetFiles {
        match self {
            DatasetKind::Digits => DatasetFiles {
                training_images: "digitdata/trainingimages",
                training_labels: "digitdata/traininglabels",
                test_images: "digitdata/testimages",
                test_labels: "digitdata/testlabels",
            },
            DatasetKind::Faces => DatasetFiles {
                training_images: "facedata/facedatatrain",
                training_labels: "facedata/facedatatrainlabels",
                test_images: "facedata/facedatatest",
                test_labels: "facedata/facedatatestlabels",
            },
        }
    }

    // Load (training, test) from under `data_dir`
    pub fn load(self, data_dir: &Path) -> Result<(Dataset, Dataset)> {
        let files = self.files();
        let training = load_dataset(
            "training",
            &data_dir.join(files.training_images),
            &data_dir.join(files.training_labels),
            self.width(),
            self.height(),
        )?;
        let test = load_dataset(
            "test",
            &data_dir.join(files.test_images),
            &data_dir.join(files.test_labels),
            self.width(),
            self.height(),
        )?;
        Ok((training, test))
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Digits => write!(f, "digits"),
            DatasetKind::Faces => write!(f, "faces"),
        }
    }
}
