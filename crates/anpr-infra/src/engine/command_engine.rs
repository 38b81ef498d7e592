//! Engine adapter that shells out to an external recognizer command
//!
//! The command takes OpenALPR-style flags and prints one result payload as
//! JSON on stdout:
//!
//! `<cmd> -j -c <country> [-n <topn>] [-p <region>] [-d] --config <conf> <image>`
//!
//! `<cmd> --version` must exit successfully; it is used as the load check.
//!
//! The command has no mask input. When a detection mask is set, the image is
//! decoded and masked pixels are blacked out before it is handed over.

use crate::assets::AssetPaths;
use anpr_domain::{AlprEngine, DetectionMask, InitParams, RecognitionRequest};
use anpr_types::{AlprResults, Error, Rect, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug, Clone, Default)]
struct EngineSettings {
    country: String,
    top_n: Option<u32>,
    default_region: Option<String>,
    detect_region: bool,
    prewarp: Option<String>,
    mask: Option<DetectionMask>,
}

/// [`AlprEngine`] backed by an external process per recognition
pub struct CommandEngine {
    command: String,
    paths: AssetPaths,
    settings: EngineSettings,
    loaded: bool,
}

impl CommandEngine {
    pub fn new(command: impl Into<String>, paths: AssetPaths) -> Self {
        Self {
            command: command.into(),
            paths,
            settings: EngineSettings::default(),
            loaded: false,
        }
    }

    pub fn asset_paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// Program and leading arguments of the configured command
    fn program(&self) -> Result<(String, Vec<String>)> {
        let mut parts = shell_words::split(&self.command).map_err(|e| {
            Error::InitializationFailed(format!("engine command is invalid: {} ({})", self.command, e))
        })?;
        if parts.is_empty() {
            return Err(Error::InitializationFailed(
                "engine command is empty".to_string(),
            ));
        }
        let program = parts.remove(0);
        Ok((program, parts))
    }

    /// Config file to pass, with the prewarp override applied when set
    fn effective_config(&self) -> Result<Option<NamedTempFile>> {
        let prewarp = match self.settings.prewarp.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Ok(None),
        };

        let base = fs::read_to_string(&self.paths.config_file)?;
        let mut file = Builder::new().prefix("anpr-").suffix(".conf").tempfile()?;
        write!(file, "{}\nprewarp = {}\n", base.trim_end(), prewarp.trim())?;
        file.flush()?;
        Ok(Some(file))
    }

    fn build_args(&self, config: &Path, image: &Path) -> Vec<String> {
        let mut args = vec![
            "-j".to_string(),
            "-c".to_string(),
            self.settings.country.clone(),
        ];

        if let Some(n) = self.settings.top_n.filter(|&n| n > 0) {
            args.push("-n".to_string());
            args.push(n.to_string());
        }
        if let Some(region) = self.settings.default_region.as_deref() {
            if !region.is_empty() {
                args.push("-p".to_string());
                args.push(region.to_string());
            }
        }
        if self.settings.detect_region {
            args.push("-d".to_string());
        }

        args.push("--config".to_string());
        args.push(config.display().to_string());
        args.push(image.display().to_string());
        args
    }

    fn run(&self, image: &Path, regions: &[Rect]) -> Result<String> {
        let (program, mut args) = self.program()?;
        let derived_config = self.effective_config()?;
        let config = derived_config
            .as_ref()
            .map(|f| f.path().to_path_buf())
            .unwrap_or_else(|| self.paths.config_file.clone());
        args.extend(self.build_args(&config, image));

        tracing::debug!(program = %program, ?args, "running recognizer");
        let output = Command::new(&program)
            .args(&args)
            .output()
            .map_err(|e| Error::RecognitionFailed(format!("cannot run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RecognitionFailed(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut results = AlprResults::from_json(stdout.trim()).map_err(|e| {
            Error::RecognitionFailed(format!(
                "recognizer output is not a result payload: {} - response: {}",
                e,
                stdout.trim()
            ))
        })?;

        // The command has no region flag; report the regions the caller asked for
        if !regions.is_empty() {
            results.regions_of_interest = regions.to_vec();
        }
        results.to_json()
    }
}

impl CommandEngine {
    fn stage_input<'a>(&self, request: &'a RecognitionRequest) -> Result<StagedInput<'a>> {
        let mask = self.settings.mask.as_ref();

        match request {
            RecognitionRequest::ByFilePath(path) => {
                if !path.is_file() {
                    return Err(Error::FileNotFound(path.clone()));
                }
                match mask {
                    Some(mask) => Ok(StagedInput::Temp(save_png(&apply_mask(image::open(path)?, mask)?)?)),
                    None => Ok(StagedInput::Original(path)),
                }
            }
            RecognitionRequest::ByImageBytes(bytes)
            | RecognitionRequest::ByImageBytesWithRegions { bytes, .. } => match mask {
                Some(mask) => {
                    let image = image::load_from_memory(bytes)?;
                    Ok(StagedInput::Temp(save_png(&apply_mask(image, mask)?)?))
                }
                None => Ok(StagedInput::Temp(stage_image_bytes(bytes)?)),
            },
            RecognitionRequest::ByRawPixels {
                pixels,
                width,
                height,
                ..
            } => {
                let mut image = decode_raw_pixels(pixels, *width, *height)?;
                if let Some(mask) = mask {
                    image = apply_mask(image, mask)?;
                }
                Ok(StagedInput::Temp(save_png(&image)?))
            }
        }
    }
}

/// Write encoded image bytes to a temp file with a matching extension
fn stage_image_bytes(bytes: &[u8]) -> Result<NamedTempFile> {
    let extension = image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("img");

    let mut file = Builder::new()
        .prefix("anpr-")
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

/// Image file handed to the recognizer
enum StagedInput<'a> {
    Original(&'a Path),
    Temp(NamedTempFile),
}

impl StagedInput<'_> {
    fn path(&self) -> &Path {
        match self {
            StagedInput::Original(path) => path,
            StagedInput::Temp(file) => file.path(),
        }
    }
}

/// Decode a raw pixel buffer (gray, RGB or RGBA)
fn decode_raw_pixels(pixels: &[u8], width: u32, height: u32) -> Result<DynamicImage> {
    let area = width as usize * height as usize;
    if area == 0 || pixels.len() % area != 0 {
        return Err(Error::InvalidArgument(format!(
            "{} bytes do not form a {}x{} image",
            pixels.len(),
            width,
            height
        )));
    }

    let data = pixels.to_vec();
    match pixels.len() / area {
        1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        bpp => {
            return Err(Error::InvalidArgument(format!(
                "unsupported pixel size: {} bytes per pixel",
                bpp
            )))
        }
    }
    .ok_or_else(|| Error::InvalidArgument("pixel buffer does not match dimensions".to_string()))
}

fn save_png(image: &DynamicImage) -> Result<NamedTempFile> {
    let file = Builder::new().prefix("anpr-frame-").suffix(".png").tempfile()?;
    image.save_with_format(file.path(), ImageFormat::Png)?;
    Ok(file)
}

/// Black out every pixel whose mask value is zero.
///
/// The first byte of each mask pixel is its coverage. A mask of a different
/// size is stretched over the image.
fn apply_mask(image: DynamicImage, mask: &DetectionMask) -> Result<DynamicImage> {
    let bpp = mask.bytes_per_pixel() as usize;
    let coverage: Vec<u8> = mask.pixels().chunks_exact(bpp).map(|px| px[0]).collect();
    let coverage = GrayImage::from_raw(mask.width(), mask.height(), coverage)
        .ok_or_else(|| Error::InvalidArgument("mask buffer does not match dimensions".to_string()))?;

    let mut rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let coverage = if coverage.dimensions() == (width, height) {
        coverage
    } else {
        imageops::resize(&coverage, width, height, FilterType::Nearest)
    };

    for (pixel, cover) in rgba.pixels_mut().zip(coverage.pixels()) {
        if cover.0[0] == 0 {
            pixel.0 = [0, 0, 0, 255];
        }
    }
    Ok(DynamicImage::ImageRgba8(rgba))
}

impl AlprEngine for CommandEngine {
    fn initialize(&mut self, params: &InitParams) -> Result<()> {
        if params.country.trim().is_empty() {
            return Err(Error::InitializationFailed(
                "country code is required".to_string(),
            ));
        }
        if !self.paths.config_file.is_file() {
            return Err(Error::InitializationFailed(format!(
                "config file not staged: {}",
                self.paths.config_file.display()
            )));
        }
        if !self.paths.runtime_dir.is_dir() {
            return Err(Error::InitializationFailed(format!(
                "runtime data not staged: {}",
                self.paths.runtime_dir.display()
            )));
        }

        let (program, args) = self.program()?;
        let probe = Command::new(&program)
            .args(&args)
            .arg("--version")
            .output()
            .map_err(|e| Error::InitializationFailed(format!("cannot run {}: {}", program, e)))?;
        if !probe.status.success() {
            return Err(Error::InitializationFailed(format!(
                "{} --version failed: {}",
                program,
                String::from_utf8_lossy(&probe.stderr).trim()
            )));
        }

        self.settings.country = params.country.trim().to_string();
        self.settings.top_n = params.effective_top_n();
        self.settings.default_region = params.effective_region().map(str::to_string);
        self.loaded = true;

        tracing::info!(
            program = %program,
            country = %self.settings.country,
            "recognizer command loaded"
        );
        Ok(())
    }

    fn set_country(&mut self, country: &str) {
        self.settings.country = country.to_string();
    }

    fn set_top_n(&mut self, top_n: u32) {
        self.settings.top_n = Some(top_n);
    }

    fn set_default_region(&mut self, region: &str) {
        self.settings.default_region = Some(region.to_string());
    }

    fn set_detect_region(&mut self, enabled: bool) {
        self.settings.detect_region = enabled;
    }

    fn set_prewarp(&mut self, prewarp: &str) {
        self.settings.prewarp = Some(prewarp.to_string());
    }

    fn set_mask(&mut self, mask: &DetectionMask) {
        tracing::debug!(
            width = mask.width(),
            height = mask.height(),
            "detection mask set"
        );
        self.settings.mask = Some(mask.clone());
    }

    fn recognize(&mut self, request: &RecognitionRequest) -> Result<String> {
        if !self.loaded {
            return Err(Error::RecognitionFailed(
                "recognizer command not loaded".to_string(),
            ));
        }

        let input = self.stage_input(request)?;
        self.run(input.path(), request.regions())
    }
}

impl std::fmt::Debug for CommandEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEngine")
            .field("command", &self.command)
            .field("config_file", &self.paths.config_file)
            .field("loaded", &self.loaded)
            .field("has_mask", &self.settings.mask.is_some())
            .finish()
    }
}
