//! Background image decoding.
//!
//! The main thread queues file paths with [`TextureLoader::request`] and picks
//! up decoded RGBA pixels with [`TextureLoader::drain`] at the start of each
//! frame. Decoding never blocks rendering; a failed image is reported once and
//! its slot keeps the placeholder.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use orrery_scene::TextureHandle;

#[derive(Debug, thiserror::Error)]
pub enum TextureLoadError {
    #[error("failed to load texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture loader has shut down")]
    WorkerStopped,
}

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Outcome of one request.
#[derive(Debug)]
pub struct LoadedTexture {
    pub handle: TextureHandle,
    pub path: PathBuf,
    pub result: Result<DecodedImage, TextureLoadError>,
}

struct TextureRequest {
    handle: TextureHandle,
    path: PathBuf,
}

/// Name of the decoding thread, as it appears in logs.
pub const WORKER_THREAD_NAME: &str = "texture-loader";

/// Single worker thread that decodes images off the frame loop.
pub struct TextureLoader {
    request_sender: Option<crossbeam_channel::Sender<TextureRequest>>,
    result_receiver: crossbeam_channel::Receiver<LoadedTexture>,
    worker: Option<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<TextureRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let spawned = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let result = decode_file(&request.path);
                    // Receiver gone means the loader was dropped mid-load.
                    if result_tx
                        .send(LoadedTexture {
                            handle: request.handle,
                            path: request.path,
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            });

        match spawned {
            Ok(worker) => Self {
                request_sender: Some(request_tx),
                result_receiver: result_rx,
                worker: Some(worker),
            },
            Err(e) => {
                // Every request reports WorkerStopped; bodies keep placeholders.
                log::error!("Could not start texture loader thread: {e}");
                Self {
                    request_sender: None,
                    result_receiver: result_rx,
                    worker: None,
                }
            }
        }
    }

    /// Queue `path` for decoding into `handle`'s slot.
    pub fn request(
        &self,
        handle: TextureHandle,
        path: impl Into<PathBuf>,
    ) -> Result<(), TextureLoadError> {
        let sender = self
            .request_sender
            .as_ref()
            .ok_or(TextureLoadError::WorkerStopped)?;
        let path = path.into();
        log::debug!("Queued texture {:?} for slot {}", path, handle.0);
        sender
            .send(TextureRequest { handle, path })
            .map_err(|_| TextureLoadError::WorkerStopped)
    }

    /// Everything finished since the last call. Never blocks.
    pub fn drain(&self) -> Vec<LoadedTexture> {
        self.result_receiver.try_iter().collect()
    }

    /// Stop accepting requests and wait for the worker to finish its queue.
    pub fn shutdown(&mut self) {
        self.request_sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decode an image file of any supported format into RGBA8.
pub fn decode_file(path: &Path) -> Result<DecodedImage, TextureLoadError> {
    let image = image::open(path)
        .map_err(|source| TextureLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &TextureLoader, count: usize) -> Vec<LoadedTexture> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        results
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_decode_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "earth.png", 4, 2);
        let decoded = decode_file(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert_eq!(decoded.rgba.len(), 4 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = decode_file(&dir.path().join("nope.jpg"));
        assert!(matches!(result, Err(TextureLoadError::Decode { .. })));
    }

    #[test]
    fn test_worker_delivers_results_per_handle() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "moon.png", 8, 8);
        let loader = TextureLoader::new();
        loader.request(TextureHandle(3), &good).unwrap();
        loader
            .request(TextureHandle(7), dir.path().join("missing.png"))
            .unwrap();

        let mut results = wait_for(&loader, 2);
        results.sort_by_key(|r| r.handle.0);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].handle, TextureHandle(3));
        assert_eq!(results[0].result.as_ref().unwrap().width, 8);
        assert_eq!(results[1].handle, TextureHandle(7));
        assert!(results[1].result.is_err());
    }

    #[test]
    fn test_worker_thread_is_named() {
        let loader = TextureLoader::new();
        let worker = loader.worker.as_ref().unwrap();
        assert_eq!(worker.thread().name(), Some(WORKER_THREAD_NAME));
    }

    #[test]
    fn test_drain_without_requests_is_empty() {
        let loader = TextureLoader::new();
        assert!(loader.drain().is_empty());
    }

    #[test]
    fn test_request_after_shutdown_fails() {
        let mut loader = TextureLoader::new();
        loader.shutdown();
        assert!(matches!(
            loader.request(TextureHandle(0), "stars.jpg"),
            Err(TextureLoadError::WorkerStopped)
        ));
    }
}
