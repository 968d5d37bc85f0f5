use anyhow::{Context, Result};
use std::path::Path;

use alarm_asm::image::parse_raw_image;

/// A loaded image; word `i` is instruction address `i`.
#[derive(Debug, Clone, Default)]
pub struct Image {
    pub words: Vec<u16>,
}

impl Image {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub fn load_raw_image(path: &Path) -> Result<Image> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read image '{}'", path.display()))?;
    let words = parse_raw_image(&text).with_context(|| format!("bad image '{}'", path.display()))?;
    Ok(Image { words })
}

pub fn is_mapped(img: &Image, addr: i64) -> bool {
    addr >= 0 && (addr as usize) < img.words.len()
}
