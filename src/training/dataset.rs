use crate::{catalog::ClassCatalog, preprocess::{CHANNELS, preprocess_path}};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One training example: a CHW image in `[0, 1]` and its class index.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub image: Vec<f32>,
    pub label: usize,
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub samples: Vec<Sample>,
    pub image_size: usize,
    /// True when the samples are random noise standing in for a missing dataset.
    pub synthetic: bool,
}

impl LoadedDataset {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Reads `<dir>/<label>/*` for every class of `catalog`, in catalog order.
///
/// Missing class directories and files that fail to decode are skipped with a
/// warning. The label of a sample is the index of its class in `catalog`.
pub fn load_dataset(dir: &Path, catalog: &ClassCatalog, image_size: usize) -> Vec<Sample> {
    let mut samples = Vec::new();

    for (label, class) in catalog.iter().enumerate() {
        let class_dir = dir.join(class.label());
        let files = match list_files(&class_dir) {
            Ok(files) => files,
            Err(e) => {
                warn!("Class directory {:?} not readable ({}), skipping", class_dir, e);
                continue;
            }
        };

        let before = samples.len();
        for path in files {
            match preprocess_path(&path, image_size) {
                Ok(tensor) => samples.push(Sample {
                    image: tensor.data,
                    label,
                }),
                Err(e) => warn!("Error loading {:?}: {}", path, e),
            }
        }
        info!("Loaded {} images for {}", samples.len() - before, class);
    }

    samples
}

fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// Uniform random pixels with uniform random labels.
pub fn synthetic_dataset(
    count: usize,
    num_classes: usize,
    image_size: usize,
    seed: u64,
) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = CHANNELS * image_size * image_size;

    (0..count)
        .map(|_| Sample {
            image: (0..len).map(|_| rng.gen_range(0.0f32..1.0)).collect(),
            label: rng.gen_range(0..num_classes.max(1)),
        })
        .collect()
}

/// Loads the dataset, or falls back to `synthetic_samples` random samples when
/// the directory is missing or yields no images.
pub fn load_or_synthesize(
    dir: &Path,
    catalog: &ClassCatalog,
    image_size: usize,
    synthetic_samples: usize,
    seed: u64,
) -> LoadedDataset {
    let samples = if dir.is_dir() {
        load_dataset(dir, catalog, image_size)
    } else {
        warn!("Dataset directory {:?} not found", dir);
        Vec::new()
    };

    if !samples.is_empty() {
        info!("Loaded {} images from {} classes", samples.len(), catalog.len());
        return LoadedDataset {
            samples,
            image_size,
            synthetic: false,
        };
    }

    warn!(
        "No images loaded, generating {} synthetic samples for a dry run",
        synthetic_samples
    );
    LoadedDataset {
        samples: synthetic_dataset(synthetic_samples, catalog.len(), image_size, seed),
        image_size,
        synthetic: true,
    }
}
