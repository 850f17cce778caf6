use std::path::Path;

use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::blip;
use medcap_core::constants::CAPTION_MAX_TOKENS;
use tokenizers::Tokenizer;
use tracing::debug;

// WordPiece [CLS]/[SEP] ids for the BLIP text decoder vocabulary.
const BOS_TOKEN_ID: u32 = 30522;
const SEP_TOKEN_ID: u32 = 102;

const IMAGE_SIZE: u32 = 384;
const IMAGE_MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];
const IMAGE_STD: [f32; 3] = [0.26862954, 0.2613026, 0.2757771];

/// Decode an image file into the normalized CHW tensor BLIP expects.
///
/// The image is cover-resized to 384x384, converted to RGB and normalized
/// with the CLIP mean/std. The tensor stays on the CPU; callers move it to
/// the inference device.
pub fn load_image(path: impl AsRef<Path>) -> candle_core::Result<Tensor> {
    let img = image::ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()
        .map_err(candle_core::Error::wrap)?
        .resize_to_fill(IMAGE_SIZE, IMAGE_SIZE, image::imageops::FilterType::Triangle);
    let data = img.to_rgb8().into_raw();
    let data = Tensor::from_vec(
        data,
        (IMAGE_SIZE as usize, IMAGE_SIZE as usize, 3),
        &Device::Cpu,
    )?
    .permute((2, 0, 1))?;
    let mean = Tensor::new(&IMAGE_MEAN, &Device::Cpu)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&IMAGE_STD, &Device::Cpu)?.reshape((3, 1, 1))?;
    (data.to_dtype(DType::F32)? / 255.)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)
}

/// The BLIP image-captioning-large model loaded from local safetensors.
///
/// Generation mutates the decoder's KV cache, so callers need `&mut` access.
/// There is exactly one instance per process; [`super::CaptionService`]
/// enforces that.
pub struct BlipCaptioner {
    tokenizer: Tokenizer,
    model: blip::BlipForConditionalGeneration,
    logits_processor: LogitsProcessor,
    device: Device,
}

impl BlipCaptioner {
    /// Load the model from `model_dir`, which must contain
    /// `model.safetensors` and `tokenizer.json`.
    pub fn new(model_dir: impl AsRef<Path>) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let weights_path = model_dir.join("model.safetensors");
        let tokenizer_path = model_dir.join("tokenizer.json");

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!("failed to load tokenizer {}: {}", tokenizer_path.display(), e)
        })?;

        let device = Device::cuda_if_available(0)?;
        debug!(?device, "loading blip-image-captioning-large");

        let config = blip::Config::image_captioning_large();
        let vb = unsafe {
            candle_nn::VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)
        }
        .with_context(|| format!("failed to load weights {}", weights_path.display()))?;
        let model = blip::BlipForConditionalGeneration::new(&config, vb)?;

        // Greedy decoding: no temperature, no top-p. The seed is unused but
        // required by the constructor.
        let logits_processor = LogitsProcessor::new(1337, None, None);

        Ok(Self {
            tokenizer,
            model,
            logits_processor,
            device,
        })
    }

    /// Generate a caption for the image at `path`, capped at
    /// [`CAPTION_MAX_TOKENS`] generated tokens.
    pub fn caption_image(&mut self, path: impl AsRef<Path>) -> Result<String> {
        debug!("captioning {}", path.as_ref().display());
        let image = load_image(path.as_ref())?.to_device(&self.device)?;
        let image_embeds = image.unsqueeze(0)?.apply(self.model.vision_model())?;

        let mut token_ids = vec![BOS_TOKEN_ID];

        // Stale cache entries from the previous caption would corrupt this
        // one.
        self.model.text_decoder().reset_kv_cache();

        for index in 0..CAPTION_MAX_TOKENS {
            let context_size = if index > 0 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self.model.text_decoder().forward(&input_ids, &image_embeds)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = self.logits_processor.sample(&logits)?;
            if token == SEP_TOKEN_ID {
                break;
            }
            token_ids.push(token);
        }

        self.tokenizer
            .decode(&token_ids, true)
            .map(|caption| caption.trim().to_string())
            .map_err(|e| anyhow!("failed to decode caption tokens: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_image_shape_and_dtype() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        image::RgbImage::from_pixel(640, 480, image::Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();

        let tensor = load_image(&path).unwrap();
        assert_eq!(tensor.dims(), &[3, 384, 384]);
        assert_eq!(tensor.dtype(), DType::F32);
    }

    #[test]
    fn test_load_image_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("black.png");
        image::RgbImage::from_pixel(64, 64, image::Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();

        // A black image maps every channel to -mean/std.
        let tensor = load_image(&path).unwrap();
        let first = tensor
            .get(0)
            .unwrap()
            .get(0)
            .unwrap()
            .get(0)
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        let expected = -IMAGE_MEAN[0] / IMAGE_STD[0];
        assert!((first - expected).abs() < 1e-4);
    }

    #[test]
    fn test_load_image_missing_file() {
        assert!(load_image("/nonexistent/image.png").is_err());
    }
}
