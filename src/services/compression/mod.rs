pub mod image;
pub mod pdf;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Upload category, decided from the client filename's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Jpeg,
    Png,
    Pdf,
}

impl FileKind {
    /// Map a lowercase extension (without the dot) to a supported kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }

    /// Extension of the compressed artifact. Images always become JPEG.
    pub fn output_extension(self) -> &'static str {
        if self.is_image() { "jpg" } else { "pdf" }
    }
}

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] ::image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF has no pages")]
    EmptyPdf,

    #[error("Malformed PDF: {0}")]
    MalformedPdf(String),

    #[error("Compression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A successfully written artifact
#[derive(Debug, Clone)]
pub struct Compressed {
    pub path: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl Compressed {
    /// Size reduction in percent; negative when the output grew
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        100.0 - (self.compressed_size as f64 / self.original_size as f64 * 100.0)
    }
}

/// Dispatches staged uploads to the image or PDF compressor and writes the
/// result into the output directory as `<id>.<jpg|pdf>`.
#[derive(Debug, Clone)]
pub struct CompressionService {
    output_dir: PathBuf,
    max_image_width: u32,
}

impl CompressionService {
    pub fn new(output_dir: impl Into<PathBuf>, max_image_width: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_image_width,
        }
    }

    pub fn output_path(&self, id: &Uuid, kind: FileKind) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", id, kind.output_extension()))
    }

    /// Compress `input` on the blocking pool.
    pub async fn compress(
        &self,
        input: PathBuf,
        kind: FileKind,
        id: Uuid,
    ) -> Result<Compressed, CompressError> {
        let output = self.output_path(&id, kind);
        let max_width = self.max_image_width;

        let result = tokio::task::spawn_blocking(move || {
            compress_blocking(&input, kind, &output, max_width).map(|()| (input, output))
        })
        .await
        .map_err(CompressError::from)
        .and_then(|r| r);

        let (input, output) = match result {
            Ok(paths) => paths,
            Err(e) => {
                error!("Error compressing {:?} upload {}: {}", kind, id, e);
                return Err(e);
            }
        };

        let original_size = tokio::fs::metadata(&input).await?.len();
        let compressed_size = tokio::fs::metadata(&output).await?.len();
        let compressed = Compressed {
            path: output,
            original_size,
            compressed_size,
        };

        info!(
            "🗜️  Compressed {:?} upload {}: {} -> {} bytes ({:.1}% smaller)",
            kind,
            id,
            original_size,
            compressed_size,
            compressed.reduction_percent()
        );

        Ok(compressed)
    }
}

fn compress_blocking(
    input: &Path,
    kind: FileKind,
    output: &Path,
    max_width: u32,
) -> Result<(), CompressError> {
    let result = match kind {
        FileKind::Jpeg => image::compress_image(input, ::image::ImageFormat::Jpeg, output, max_width),
        FileKind::Png => image::compress_image(input, ::image::ImageFormat::Png, output, max_width),
        FileKind::Pdf => pdf::compress_pdf(input, output),
    };

    if result.is_err() {
        // Never leave a truncated artifact behind a failed request
        let _ = std::fs::remove_file(output);
    }
    result
}
