use std::path::Path;

use anyhow::Context;

/// Magic number of the IDX labels file.
pub const LABELS_MAGIC: u32 = 2049;

/// Magic number of the IDX images file.
pub const IMAGES_MAGIC: u32 = 2051;

/// Width (and height) of a single MNIST image.
pub const IMAGE_SIDE: usize = 28;

/// Amount of pixels of a single MNIST image.
pub const IMAGE_SIZE: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Amount of digit classes.
pub const CLASSES: usize = 10;

/// Characters representing pixel intensity levels, from darkest to brightest.
pub const INTENSITY_CHARS: [char; 10] = [' ', '.', ',', ':', 'o', 'O', 'X', '#', '$', '@'];

/// Big-endian reader over the IDX file bytes.
struct IdxReader<'a> {
    bytes: &'a [u8],
    offset: usize
}

impl<'a> IdxReader<'a> {
    #[inline]
    const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0
        }
    }

    fn read(&mut self, len: usize) -> anyhow::Result<&'a [u8]> {
        let chunk = self.offset.checked_add(len)
            .and_then(|end| self.bytes.get(self.offset..end));

        let Some(chunk) = chunk else {
            anyhow::bail!("Unexpected end of IDX data at byte {}", self.offset);
        };

        self.offset += len;

        Ok(chunk)
    }

    fn read_u32(&mut self) -> anyhow::Result<u32> {
        let mut bytes = [0; 4];

        bytes.copy_from_slice(self.read(4)?);

        Ok(u32::from_be_bytes(bytes))
    }

    fn expect_magic(&mut self, magic: u32) -> anyhow::Result<()> {
        let actual = self.read_u32()?;

        if actual != magic {
            anyhow::bail!("Not an IDX file of expected type: magic number is {actual}, expected {magic}");
        }

        Ok(())
    }
}

/// Decode IDX labels file content. Each label is a number from 0 to 9.
pub fn parse_labels(bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut reader = IdxReader::new(bytes);

    reader.expect_magic(LABELS_MAGIC)?;

    let items = reader.read_u32()? as usize;

    let labels = reader.read(items)?;

    if let Some(position) = labels.iter().position(|label| *label as usize >= CLASSES) {
        anyhow::bail!("Label {} at index {position} is not a digit", labels[position]);
    }

    Ok(labels.to_vec())
}

/// Decode IDX images file content. Only 28x28 images are accepted.
///
/// Every image is flattened row by row into a vector of pixel
/// intensities normalized to the `[0.0, 1.0]` range.
pub fn parse_images(bytes: &[u8]) -> anyhow::Result<Vec<Vec<f64>>> {
    let mut reader = IdxReader::new(bytes);

    reader.expect_magic(IMAGES_MAGIC)?;

    let items = reader.read_u32()? as usize;
    let rows = reader.read_u32()? as usize;
    let columns = reader.read_u32()? as usize;

    if rows != IMAGE_SIDE || columns != IMAGE_SIDE {
        anyhow::bail!("Expected {IMAGE_SIDE}x{IMAGE_SIDE} images, got {rows}x{columns}");
    }

    let total_size = items.checked_mul(IMAGE_SIZE)
        .context("IDX images size overflows")?;

    let pixels = reader.read(total_size)?;

    Ok(pixels.chunks_exact(IMAGE_SIZE)
        .map(|image| {
            image.iter()
                .map(|pixel| *pixel as f64 / 255.0)
                .collect()
        })
        .collect())
}

#[inline]
/// Read and decode IDX labels file.
pub fn load_labels(path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();

    std::fs::read(path)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| parse_labels(&bytes))
        .with_context(|| format!("Failed to load labels from {path:?}"))
}

#[inline]
/// Read and decode IDX images file.
pub fn load_images(path: impl AsRef<Path>) -> anyhow::Result<Vec<Vec<f64>>> {
    let path = path.as_ref();

    std::fs::read(path)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| parse_images(&bytes))
        .with_context(|| format!("Failed to load images from {path:?}"))
}

#[derive(Debug, Default, Clone, PartialEq)]
/// Images with their labels.
pub struct LabeledImages {
    pub images: Vec<Vec<f64>>,
    pub labels: Vec<u8>
}

impl LabeledImages {
    /// Load images and labels files, checking that their amounts match.
    pub fn load(images: impl AsRef<Path>, labels: impl AsRef<Path>) -> anyhow::Result<Self> {
        let images = load_images(images)?;
        let labels = load_labels(labels)?;

        if images.len() != labels.len() {
            anyhow::bail!("Loaded {} images but {} labels", images.len(), labels.len());
        }

        Ok(Self {
            images,
            labels
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
/// MNIST handwritten digits dataset.
pub struct MnistDataset {
    pub train: LabeledImages,
    pub test: LabeledImages
}

impl MnistDataset {
    /// Load training and test splits from the folder containing
    /// original (unpacked) MNIST files.
    pub fn open(folder: impl AsRef<Path>) -> anyhow::Result<Self> {
        let folder = folder.as_ref();

        Ok(Self {
            train: LabeledImages::load(
                folder.join("train-images-idx3-ubyte"),
                folder.join("train-labels-idx1-ubyte")
            )?,

            test: LabeledImages::load(
                folder.join("t10k-images-idx3-ubyte"),
                folder.join("t10k-labels-idx1-ubyte")
            )?
        })
    }
}

/// Build target vector with `1.0` at the `label` index and `0.0` elsewhere.
///
/// Returns `None` if the label is not less than `classes`.
pub fn one_hot(label: usize, classes: usize) -> Option<Vec<f64>> {
    if label >= classes {
        return None;
    }

    let mut target = vec![0.0; classes];

    target[label] = 1.0;

    Some(target)
}

/// Render flattened 28x28 image as ASCII art, one line per image row.
///
/// Returns `None` if the image has wrong amount of pixels.
pub fn ascii_image(pixels: &[f64]) -> Option<String> {
    if pixels.len() != IMAGE_SIZE {
        return None;
    }

    let max_level = (INTENSITY_CHARS.len() - 1) as f64;

    let mut image = String::with_capacity(IMAGE_SIZE + IMAGE_SIDE);

    for row in pixels.chunks_exact(IMAGE_SIDE) {
        for pixel in row {
            let level = (pixel * max_level).clamp(0.0, max_level) as usize;

            image.push(INTENSITY_CHARS[level]);
        }

        image.push('\n');
    }

    Some(image)
}

#[cfg(test)]
fn idx_labels(labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(&LABELS_MAGIC.to_be_bytes());
    bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    bytes.extend_from_slice(labels);

    bytes
}

#[cfg(test)]
fn idx_images(images: &[Vec<u8>], rows: u32, columns: u32) -> Vec<u8> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(&IMAGES_MAGIC.to_be_bytes());
    bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&rows.to_be_bytes());
    bytes.extend_from_slice(&columns.to_be_bytes());

    for image in images {
        bytes.extend_from_slice(image);
    }

    bytes
}

#[test]
fn test_parse_idx() -> anyhow::Result<()> {
    assert_eq!(parse_labels(&idx_labels(&[3, 1, 4]))?, vec![3, 1, 4]);

    let mut image = vec![0; IMAGE_SIZE];

    image[..4].copy_from_slice(&[0, 255, 51, 102]);

    let images = parse_images(&idx_images(&[image, vec![255; IMAGE_SIZE]], 28, 28))?;

    assert_eq!(images.len(), 2);
    assert_eq!(images[0][..4], [0.0, 1.0, 0.2, 0.4]);
    assert!(images[0][4..].iter().all(|pixel| *pixel == 0.0));
    assert_eq!(images[1], vec![1.0; IMAGE_SIZE]);

    // Magic numbers are swapped.
    assert!(parse_labels(&idx_images(&[], 28, 28)).is_err());
    assert!(parse_images(&idx_labels(&[1])).is_err());

    // Truncated data.
    let mut bytes = idx_labels(&[1, 2, 3]);

    bytes.pop();

    assert!(parse_labels(&bytes).is_err());
    assert!(parse_labels(&[0, 0]).is_err());

    Ok(())
}

#[test]
fn test_parse_idx_rejects_non_mnist_data() {
    // Labels must be digits.
    assert!(parse_labels(&idx_labels(&[3, 12, 255])).is_err());
    assert!(parse_labels(&idx_labels(&[9, 10])).is_err());

    // Images must be 28x28.
    assert!(parse_images(&idx_images(&[vec![0; 9]], 3, 3)).is_err());
    assert!(parse_images(&idx_images(&[vec![0; IMAGE_SIZE]], 14, 56)).is_err());
    assert!(parse_images(&idx_images(&[], 0, 0)).is_err());
}

#[test]
fn test_mnist_dataset_open() -> anyhow::Result<()> {
    let folder = std::env::temp_dir().join(format!("backprop-mnist-{}", std::process::id()));

    let _ = std::fs::remove_dir_all(&folder);

    // Missing files.
    assert!(MnistDataset::open(&folder).is_err());

    std::fs::create_dir_all(&folder)?;

    let image = (0..IMAGE_SIZE).map(|i| (i % 256) as u8).collect::<Vec<_>>();

    std::fs::write(folder.join("train-images-idx3-ubyte"), idx_images(&[image.clone(), image.clone()], 28, 28))?;
    std::fs::write(folder.join("train-labels-idx1-ubyte"), idx_labels(&[5, 0]))?;
    std::fs::write(folder.join("t10k-images-idx3-ubyte"), idx_images(&[image.clone()], 28, 28))?;
    std::fs::write(folder.join("t10k-labels-idx1-ubyte"), idx_labels(&[7, 7]))?;

    // Test split has 1 image but 2 labels.
    assert!(MnistDataset::open(&folder).is_err());

    std::fs::write(folder.join("t10k-labels-idx1-ubyte"), idx_labels(&[12]))?;

    assert!(MnistDataset::open(&folder).is_err());

    std::fs::write(folder.join("t10k-images-idx3-ubyte"), idx_images(&[vec![0; 9]], 3, 3))?;
    std::fs::write(folder.join("t10k-labels-idx1-ubyte"), idx_labels(&[7]))?;

    assert!(MnistDataset::open(&folder).is_err());

    std::fs::write(folder.join("t10k-images-idx3-ubyte"), idx_images(&[image.clone()], 28, 28))?;

    let dataset = MnistDataset::open(&folder)?;

    assert_eq!(dataset.train.len(), 2);
    assert_eq!(dataset.test.len(), 1);
    assert_eq!(dataset.train.labels, vec![5, 0]);
    assert_eq!(dataset.test.images[0].len(), IMAGE_SIZE);
    assert!(dataset.test.images[0].iter().all(|pixel| (0.0..=1.0).contains(pixel)));

    let _ = std::fs::remove_dir_all(&folder);

    Ok(())
}

#[test]
fn test_one_hot() {
    assert_eq!(one_hot(3, 5), Some(vec![0.0, 0.0, 0.0, 1.0, 0.0]));
    assert_eq!(one_hot(9, CLASSES).map(|target| target[9]), Some(1.0));

    assert_eq!(one_hot(12, CLASSES), None);
    assert_eq!(one_hot(3, 3), None);
}

#[test]
fn test_ascii_image() {
    assert_eq!(ascii_image(&[0.5; 10]), None);

    let mut pixels = vec![0.0; IMAGE_SIZE];

    pixels[0] = 1.0;
    pixels[1] = 0.5;
    pixels[IMAGE_SIZE - 1] = 2.0;

    let image = ascii_image(&pixels).unwrap();
    let lines = image.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), IMAGE_SIDE);
    assert!(lines.iter().all(|line| line.chars().count() == IMAGE_SIDE));

    assert!(lines[0].starts_with("@o "));
    assert!(lines[IMAGE_SIDE - 1].ends_with('@'));
}
