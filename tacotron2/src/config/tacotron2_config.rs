//! Tacotron2 model hyperparameters.
//!
//! Plain configuration containers for the encoder, decoder (prenet, location
//! sensitive attention, sampler) and postnet. Every field has a default, so
//! partial JSON files override only what they name.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level Tacotron2 configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tacotron2Config {
    /// Size of the input symbol vocabulary (default: 148)
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub decoder: DecoderConfig,

    #[serde(default)]
    pub postnet: PostnetConfig,
}

fn default_vocab_size() -> usize {
    148
}

impl Default for Tacotron2Config {
    fn default() -> Self {
        Self::new(default_vocab_size())
    }
}

impl Tacotron2Config {
    /// Default hyperparameters for a vocabulary of `vocab_size` symbols.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            encoder: EncoderConfig::default(),
            decoder: DecoderConfig::default(),
            postnet: PostnetConfig::default(),
        }
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a file path.
    ///
    /// Falls back to defaults if the file doesn't exist or can't be parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to parse Tacotron2 config at {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }),
            Err(e) => {
                tracing::debug!("No Tacotron2 config at {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Width of one decoder output step: all mel frames emitted at once.
    pub fn frame_dim(&self) -> usize {
        self.decoder.n_mel_channels * self.decoder.n_frames_per_step
    }

    /// Upper bound on mel frames produced during inference.
    pub fn max_output_frames(&self) -> usize {
        self.decoder.sampler.max_decoder_steps * self.decoder.n_frames_per_step
    }

    /// Channel width of the encoder output seen by the attention.
    pub fn encoder_output_dim(&self) -> usize {
        let encoder = &self.encoder;
        match encoder.speaker_embedding_dim {
            Some(dim) if encoder.n_speaker > 1 && encoder.concat_mode == "concat" => {
                encoder.embedding_dim + dim
            }
            _ => encoder.embedding_dim,
        }
    }
}

/// Character embedding followed by a convolution stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Padding symbol id (default: 0)
    #[serde(default)]
    pub pad_token: usize,

    /// Embedding and convolution width (default: 512)
    #[serde(default = "default_encoder_dim")]
    pub embedding_dim: usize,

    /// Number of convolution layers (default: 3)
    #[serde(default = "default_encoder_n_conv")]
    pub n_conv: usize,

    #[serde(default = "default_kernel_size")]
    pub kernel_size: usize,

    #[serde(default = "default_true")]
    pub use_bias: bool,

    /// Batch norm placement relative to the activation: "before", "after" or "none"
    #[serde(default = "default_bnorm")]
    pub bnorm: String,

    #[serde(default = "default_bnorm_epsilon")]
    pub epsilon: f64,

    #[serde(default = "default_bnorm_momentum")]
    pub momentum: f64,

    #[serde(default = "default_drop_rate")]
    pub drop_rate: f64,

    #[serde(default = "default_relu")]
    pub activation: String,

    /// Number of speakers; speaker embeddings are only used above 1 (default: 1)
    #[serde(default = "default_n_speaker")]
    pub n_speaker: usize,

    pub speaker_embedding_dim: Option<usize>,

    /// How speaker embeddings join the encoder output: "concat" or "add"
    #[serde(default = "default_concat_mode")]
    pub concat_mode: String,

    #[serde(default)]
    pub linear_projection: bool,

    #[serde(default = "default_encoder_name")]
    pub name: String,
}

fn default_encoder_dim() -> usize {
    512
}
fn default_encoder_n_conv() -> usize {
    3
}
fn default_kernel_size() -> usize {
    5
}
fn default_true() -> bool {
    true
}
fn default_bnorm() -> String {
    "after".to_string()
}
fn default_bnorm_epsilon() -> f64 {
    1e-5
}
fn default_bnorm_momentum() -> f64 {
    0.1
}
fn default_drop_rate() -> f64 {
    0.5
}
fn default_relu() -> String {
    "relu".to_string()
}
fn default_n_speaker() -> usize {
    1
}
fn default_concat_mode() -> String {
    "concat".to_string()
}
fn default_encoder_name() -> String {
    "encoder".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            pad_token: 0,
            embedding_dim: default_encoder_dim(),
            n_conv: default_encoder_n_conv(),
            kernel_size: default_kernel_size(),
            use_bias: true,
            bnorm: default_bnorm(),
            epsilon: default_bnorm_epsilon(),
            momentum: default_bnorm_momentum(),
            drop_rate: default_drop_rate(),
            activation: default_relu(),
            n_speaker: default_n_speaker(),
            speaker_embedding_dim: None,
            concat_mode: default_concat_mode(),
            linear_projection: false,
            name: default_encoder_name(),
        }
    }
}

/// Fully connected bottleneck applied to the previous mel frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrenetConfig {
    /// Output width of each dense layer
    pub sizes: Vec<usize>,
    pub use_bias: bool,
    pub activation: String,
    pub drop_rate: f64,
    /// Keep dropout active at inference when false
    pub deterministic: bool,
    pub name: String,
}

impl Default for PrenetConfig {
    fn default() -> Self {
        Self {
            sizes: vec![256, 256],
            use_bias: false,
            activation: default_relu(),
            drop_rate: default_drop_rate(),
            deterministic: false,
            name: "prenet".to_string(),
        }
    }
}

/// Residual convolution stack refining the decoder's mel output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostnetConfig {
    pub n_conv: usize,
    pub filters: usize,
    pub kernel_size: usize,
    pub use_bias: bool,
    pub bnorm: String,
    pub epsilon: f64,
    pub momentum: f64,
    pub drop_rate: f64,
    pub activation: String,
    /// Activation of the last layer; None leaves it linear
    pub final_activation: Option<String>,
    pub linear_projection: bool,
    pub name: String,
}

impl Default for PostnetConfig {
    fn default() -> Self {
        Self {
            n_conv: 5,
            filters: 512,
            kernel_size: default_kernel_size(),
            use_bias: true,
            bnorm: default_bnorm(),
            epsilon: default_bnorm_epsilon(),
            momentum: default_bnorm_momentum(),
            drop_rate: default_drop_rate(),
            activation: "tanh".to_string(),
            final_activation: None,
            linear_projection: false,
            name: "postnet".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSensitiveAttentionConfig {
    pub attention_dim: usize,
    /// Convolution filters over the (cumulative) previous alignments
    pub attention_filters: usize,
    pub attention_kernel_size: usize,
    pub probability_function: String,
    pub concat_mode: usize,
    /// Feed accumulated rather than last-step alignments to the location layer
    pub cumulative: bool,
    pub name: String,
}

impl Default for LocationSensitiveAttentionConfig {
    fn default() -> Self {
        Self {
            attention_dim: 128,
            attention_filters: 32,
            attention_kernel_size: 31,
            probability_function: "softmax".to_string(),
            concat_mode: 2,
            cumulative: true,
            name: "location_sensitive_attention".to_string(),
        }
    }
}

/// Decoding loop control and teacher forcing schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Stop token probability above which decoding ends
    pub gate_threshold: f64,
    pub max_decoder_steps: usize,
    pub early_stopping: bool,
    pub add_go_frame: bool,
    pub remove_last_frame: bool,
    /// "constant" or "linear" decay of the teacher forcing ratio
    pub teacher_forcing_mode: String,
    pub init_ratio: f64,
    pub final_ratio: f64,
    pub init_decrease_step: usize,
    pub decreasing_steps: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            gate_threshold: 0.5,
            max_decoder_steps: 1024,
            early_stopping: true,
            add_go_frame: false,
            remove_last_frame: false,
            teacher_forcing_mode: "constant".to_string(),
            init_ratio: 1.0,
            final_ratio: 0.75,
            init_decrease_step: 50_000,
            decreasing_steps: 50_000,
        }
    }
}

impl SamplerConfig {
    /// Teacher forcing ratio at training step `step`.
    ///
    /// Constant mode always returns `init_ratio`. Linear mode holds
    /// `init_ratio` until `init_decrease_step`, then moves linearly to
    /// `final_ratio` over `decreasing_steps` and stays there.
    pub fn teacher_forcing_ratio(&self, step: usize) -> f64 {
        if self.teacher_forcing_mode != "linear" || step <= self.init_decrease_step {
            return self.init_ratio;
        }
        if self.decreasing_steps == 0 {
            return self.final_ratio;
        }
        let progress =
            ((step - self.init_decrease_step) as f64 / self.decreasing_steps as f64).min(1.0);
        self.init_ratio + (self.final_ratio - self.init_ratio) * progress
    }
}

/// Autoregressive decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub n_mel_channels: usize,
    /// Stop token output is a logit rather than a probability
    pub with_logits: bool,
    pub n_frames_per_step: usize,
    /// Predict the stop token from the mel output instead of the decoder state
    pub pred_stop_on_mel: bool,
    pub attention_rnn_dim: usize,
    pub p_attention_dropout: f64,
    pub decoder_n_lstm: usize,
    pub decoder_rnn_dim: usize,
    pub p_decoder_dropout: f64,
    pub prenet: PrenetConfig,
    pub lsa: LocationSensitiveAttentionConfig,
    pub sampler: SamplerConfig,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            n_mel_channels: 80,
            with_logits: true,
            n_frames_per_step: 1,
            pred_stop_on_mel: false,
            attention_rnn_dim: 1024,
            p_attention_dropout: 0.0,
            decoder_n_lstm: 1,
            decoder_rnn_dim: 1024,
            p_decoder_dropout: 0.0,
            prenet: PrenetConfig::default(),
            lsa: LocationSensitiveAttentionConfig::default(),
            sampler: SamplerConfig::default(),
        }
    }
}
