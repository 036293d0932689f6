//! TOML manifest naming the test image and the training set.
//!
//! ```toml
//! [test]
//! path = "query.jpg"
//! latitude = 60.1699
//! longitude = 24.9384
//!
//! [[training]]
//! path = "db/0001.jpg"
//! latitude = 60.1702
//! longitude = 24.9391
//! ```

use std::path::{Path, PathBuf};

use geoloc_core::{Coordinate, Image};
use log::{info, warn};
use serde::Deserialize;

use crate::session::LabeledImage;
use crate::{GeolocError, GeolocResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ManifestEntry {
    /// Both components must be present for the image to count as located
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    pub test: Option<ManifestEntry>,
    #[serde(default)]
    pub training: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_toml(toml_str: &str) -> GeolocResult<Self> {
        toml::from_str(toml_str).map_err(|e| GeolocError::Config(e.to_string()))
    }

    /// Read a manifest; relative image paths resolve against its directory
    pub fn load<P: AsRef<Path>>(path: P) -> GeolocResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GeolocError::Config(format!("{}: {}", path.display(), e)))?;
        let mut manifest = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            manifest.resolve_relative_to(base);
        }
        Ok(manifest)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for entry in self.test.iter_mut().chain(self.training.iter_mut()) {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }
    }

    pub fn load_test_image(&self) -> GeolocResult<LabeledImage> {
        let entry = self.test.as_ref().ok_or(GeolocError::MissingTestImage)?;
        let image = load_labeled(entry)?;
        log_location(&image);
        Ok(image)
    }

    /// Decode every training image. Images that fail to decode are skipped.
    pub fn load_training_images(&self) -> Vec<LabeledImage> {
        let images: Vec<LabeledImage> = self
            .training
            .iter()
            .filter_map(|entry| match load_labeled(entry) {
                Ok(img) => {
                    log_location(&img);
                    Some(img)
                }
                Err(e) => {
                    warn!("skipping training image {}: {}", entry.path.display(), e);
                    None
                }
            })
            .collect();
        info!("loaded {} of {} training images", images.len(), self.training.len());
        images
    }
}

fn log_location(img: &LabeledImage) {
    match img.coordinate {
        Some(c) => info!("GPS info for {}: {}", img.label, c),
        None => info!("No GPS info found for {}", img.label),
    }
}

fn load_labeled(entry: &ManifestEntry) -> GeolocResult<LabeledImage> {
    let image = load_image(&entry.path)?;
    Ok(LabeledImage::new(entry.path.display().to_string(), image, entry.coordinate()))
}

/// Decode any format the `image` crate knows into 8-bit luma
pub fn load_image<P: AsRef<Path>>(path: P) -> GeolocResult<Image> {
    let luma = image::open(path)?.to_luma8();
    let (w, h) = luma.dimensions();
    Ok(Image::from_luma(w as usize, h as usize, luma.into_raw())?)
}
