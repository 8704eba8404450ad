//! Persistence of operator-confirmed reference images.

use anyhow::{Context, Result};
use chrono::Local;
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

use crate::identify::naming::learned_file_stem;

/// Saves `image` as `<stem>_<millis>.png` under `dir` and returns the path.
///
/// The timestamp is bumped until the file name is unused, so two saves in
/// the same millisecond never overwrite each other.
pub fn save_learned_template(dir: &Path, card_name: &str, image: &RgbImage) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let stem = learned_file_stem(card_name);
    let mut timestamp = Local::now().timestamp_millis();
    let mut path = dir.join(format!("{}_{}.png", stem, timestamp));
    while path.exists() {
        timestamp += 1;
        path = dir.join(format!("{}_{}.png", stem, timestamp));
    }

    image
        .save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify::naming::canonical_card_name;
    use tempfile::tempdir;

    #[test]
    fn test_saved_name_maps_back_to_card() {
        let dir = tempdir().unwrap();
        let path =
            save_learned_template(dir.path(), "Barbarians Evo", &RgbImage::new(61, 90)).unwrap();

        let stem = path.file_stem().unwrap().to_string_lossy().to_string();
        assert!(stem.starts_with("barbarians-evo_"));
        assert_eq!(canonical_card_name(&stem), "Barbarians Evo");
        assert_eq!(image::image_dimensions(&path).unwrap(), (61, 90));
    }

    #[test]
    fn test_repeated_saves_do_not_collide() {
        let dir = tempdir().unwrap();
        let img = RgbImage::new(8, 8);

        let first = save_learned_template(dir.path(), "Hog Rider", &img).unwrap();
        let second = save_learned_template(dir.path(), "Hog Rider", &img).unwrap();
        let third = save_learned_template(dir.path(), "Hog Rider", &img).unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("cards").join("templates-user");

        let path = save_learned_template(&nested, "Zap", &RgbImage::new(4, 4)).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
