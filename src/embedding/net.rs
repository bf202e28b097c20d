//! Bidirectional-LSTM sentence encoder forward pass.
//!
//! The weights file uses the standard state-dict naming of the network it
//! was exported from: `embedding.weight`, `lstm.weight_ih_l0` /
//! `lstm.weight_hh_l0` / `lstm.bias_ih_l0` / `lstm.bias_hh_l0` (plus the
//! `_reverse` set for the backward direction) and `fc.weight` / `fc.bias`.
//! Gate order inside the stacked weight matrices is input, forget, cell,
//! output.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{D, DType, Device, Result, Tensor};
use candle_nn::ops::sigmoid;

/// Encoder dimensions, inferred from tensor shapes at load time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NetConfig {
    pub vocab_size: usize,
    pub token_embed_dim: usize,
    pub hidden_dim: usize,
}

/// One direction's LSTM parameters. `bias` is the precombined
/// `bias_ih + bias_hh`.
struct DirectionWeights {
    w_ih: Tensor,
    w_hh: Tensor,
    bias: Tensor,
}

/// Frozen sentence encoder: token embedding -> bidirectional LSTM ->
/// mean+max pooling -> linear projection -> ReLU.
///
/// L2 normalization of the output happens in the caller, on the extracted
/// vector.
pub(crate) struct SiameseEncoder {
    tok_embeddings: Tensor,
    forward_dir: DirectionWeights,
    backward_dir: DirectionWeights,
    fc_weight: Tensor,
    fc_bias: Tensor,
    config: NetConfig,
    device: Device,
}

impl SiameseEncoder {
    /// Loads the encoder from a safetensors file.
    pub fn from_safetensors<P: AsRef<Path>>(path: P, device: &Device) -> Result<Self> {
        let tensors = candle_core::safetensors::load(path.as_ref(), device)?;
        Self::from_tensors(&tensors, device)
    }

    fn from_tensors(tensors: &HashMap<String, Tensor>, device: &Device) -> Result<Self> {
        let get = |name: &str| -> Result<Tensor> {
            tensors
                .get(name)
                .cloned()
                .ok_or_else(|| candle_core::Error::Msg(format!("missing tensor: {name}")))
        };

        let tok_embeddings = get("embedding.weight")?;
        let (vocab_size, token_embed_dim) = tok_embeddings.dims2()?;

        let forward_dir = Self::load_direction(
            &get,
            "lstm.weight_ih_l0",
            "lstm.weight_hh_l0",
            &["lstm.bias_ih_l0", "lstm.bias_hh_l0"],
        )?;
        let backward_dir = Self::load_direction(
            &get,
            "lstm.weight_ih_l0_reverse",
            "lstm.weight_hh_l0_reverse",
            &["lstm.bias_ih_l0_reverse", "lstm.bias_hh_l0_reverse"],
        )?;

        let fc_weight = get("fc.weight")?;
        let fc_bias = get("fc.bias")?;

        let (gates, w_embed) = forward_dir.w_ih.dims2()?;
        if w_embed != token_embed_dim || !gates.is_multiple_of(4) {
            return Err(candle_core::Error::Msg(format!(
                "inconsistent lstm input weights: [{gates}, {w_embed}] vs embedding dim {token_embed_dim}"
            )));
        }
        let hidden_dim = gates / 4;

        let (fc_out, fc_in) = fc_weight.dims2()?;
        if fc_in != 4 * hidden_dim || fc_out != hidden_dim {
            return Err(candle_core::Error::Msg(format!(
                "inconsistent projection weights: [{fc_out}, {fc_in}] for hidden dim {hidden_dim}"
            )));
        }

        Ok(Self {
            tok_embeddings,
            forward_dir,
            backward_dir,
            fc_weight,
            fc_bias,
            config: NetConfig {
                vocab_size,
                token_embed_dim,
                hidden_dim,
            },
            device: device.clone(),
        })
    }

    fn load_direction(
        get: &impl Fn(&str) -> Result<Tensor>,
        w_ih_name: &str,
        w_hh_name: &str,
        bias_names: &[&str; 2],
    ) -> Result<DirectionWeights> {
        let w_ih = get(w_ih_name)?;
        let w_hh = get(w_hh_name)?;
        let bias = (get(bias_names[0])? + get(bias_names[1])?)?;
        Ok(DirectionWeights { w_ih, w_hh, bias })
    }

    /// Runs the forward pass for a `[batch, seq_len]` id tensor and returns
    /// un-normalized embeddings of shape `[batch, hidden_dim]`.
    pub fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let (batch, seq_len) = input_ids.dims2()?;

        // Embedding lookup: flatten for index_select, then restore shape.
        let flat_ids = input_ids.flatten_all()?;
        let embedded = self
            .tok_embeddings
            .index_select(&flat_ids, 0)?
            .reshape((batch, seq_len, self.config.token_embed_dim))?;

        let fwd = self.run_direction(&embedded, &self.forward_dir, false)?;
        let bwd = self.run_direction(&embedded, &self.backward_dir, true)?;
        let states = Tensor::cat(&[&fwd, &bwd], D::Minus1)?;

        // Pool across positions (padding included, as the network was
        // trained) and concatenate mean with max.
        let avg_pool = states.mean(1)?;
        let max_pool = states.max(1)?;
        let pooled = Tensor::cat(&[&avg_pool, &max_pool], D::Minus1)?;

        let projected = pooled
            .matmul(&self.fc_weight.t()?)?
            .broadcast_add(&self.fc_bias)?;
        projected.relu()
    }

    fn run_direction(
        &self,
        embedded: &Tensor,
        weights: &DirectionWeights,
        reverse: bool,
    ) -> Result<Tensor> {
        let (batch, seq_len, _) = embedded.dims3()?;
        let hidden = self.config.hidden_dim;

        let mut h = Tensor::zeros((batch, hidden), DType::F32, &self.device)?;
        let mut c = h.clone();
        let mut states: Vec<Tensor> = Vec::with_capacity(seq_len);

        let positions: Vec<usize> = if reverse {
            (0..seq_len).rev().collect()
        } else {
            (0..seq_len).collect()
        };

        for t in positions {
            let x_t = embedded.narrow(1, t, 1)?.squeeze(1)?;
            let gates = x_t
                .matmul(&weights.w_ih.t()?)?
                .add(&h.matmul(&weights.w_hh.t()?)?)?
                .broadcast_add(&weights.bias)?;

            let i = sigmoid(&gates.narrow(1, 0, hidden)?)?;
            let f = sigmoid(&gates.narrow(1, hidden, hidden)?)?;
            let g = gates.narrow(1, 2 * hidden, hidden)?.tanh()?;
            let o = sigmoid(&gates.narrow(1, 3 * hidden, hidden)?)?;

            c = ((&f * &c)? + (&i * &g)?)?;
            h = (&o * &c.tanh()?)?;
            states.push(h.clone());
        }

        if reverse {
            states.reverse();
        }
        Tensor::stack(&states, 1)
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }
}
