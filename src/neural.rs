//! Layer 2: zero-shot neural tagging.
//!
//! The engine talks to a pluggable [`NeuralTagger`]: it hands over the text
//! plus an ordered list of semantic labels and gets back raw spans. The
//! engine owns the fixed label → canonical entity type mapping; structured
//! formats (SSN, IBAN, credit cards, IPs, postal codes) are deliberately
//! absent from it because the pattern layer is both more precise and more
//! deterministic for those.
//!
//! The bundled implementation runs a BERT token-classification model with
//! Candle, downloaded through hf-hub. Any load or inference failure makes
//! the layer silently absent; pattern detection never depends on it.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Semantic labels the engine requests, with their canonical entity types.
pub const NEURAL_LABELS: &[(&str, &str)] = &[
    ("person", "PERSON"),
    ("organization", "ORGANIZATION"),
    ("address", "LOCATION"),
    ("location", "LOCATION"),
    ("email", "EMAIL_ADDRESS"),
    ("phone number", "PHONE_NUMBER"),
    ("mobile number", "PHONE_NUMBER"),
    ("date of birth", "DATE_TIME"),
    ("medication", "DRUG_NAME"),
    ("medical condition", "MEDICAL_CONDITION"),
    ("username", "USERNAME"),
];

pub fn canonical_type_for_label(label: &str) -> Option<&'static str> {
    NEURAL_LABELS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, t)| *t)
}

/// A span proposed by the tagger, labeled with one of the requested labels.
#[derive(Debug, Clone)]
pub struct TaggedSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub score: f32,
}

#[async_trait]
pub trait NeuralTagger: Send + Sync {
    async fn tag(&self, text: &str, labels: &[&str]) -> Result<Vec<TaggedSpan>>;
}

pub struct CandleTagger {
    model: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    id_to_label: Vec<String>,
    device: Device,
}

impl CandleTagger {
    /// Download and load the model. Expensive; call once per process.
    pub fn from_pretrained(model_id: &str, revision: &str) -> Result<Self> {
        info!(model_id, revision, "initializing Candle NER tagger");
        let device = Device::Cpu;
        let api = Api::new()?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let config_filename = repo.get("config.json")?;
        let tokenizer_filename = repo.get("tokenizer.json")?;
        let model_filename = repo.get("model.safetensors")?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| anyhow!("failed to load tokenizer: {e:?}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: 512,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("failed to configure truncation: {e:?}"))?;

        let raw_config = std::fs::read_to_string(&config_filename)?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let id_to_label = parse_id_to_label(&raw_config);
        let num_labels = id_to_label.len();

        let weights = candle_core::safetensors::load(&model_filename, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb.pp("bert"), &config)?;
        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))?;

        info!("Candle NER tagger initialized");
        Ok(Self {
            model,
            classifier,
            tokenizer,
            id_to_label,
            device,
        })
    }

    /// Map a model BIO label base ("PER") to the zero-shot label vocabulary.
    fn zero_shot_label(model_label: &str) -> Option<&'static str> {
        match model_label {
            "PER" => Some("person"),
            "ORG" => Some("organization"),
            "LOC" => Some("address"),
            _ => None,
        }
    }

    fn predict(&self, text: &str) -> Result<Vec<TaggedSpan>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("failed to encode text: {e:?}"))?;

        let tokens = encoding.get_ids().to_vec();
        let offsets = encoding.get_offsets().to_vec();

        let token_ids = Tensor::new(tokens.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = token_ids.zeros_like()?;
        let attention_mask = token_ids.ones_like()?;
        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self.classifier.forward(&hidden)?;
        let logits = logits.squeeze(0)?.to_vec2::<f32>()?;

        let mut spans = Vec::new();
        let mut current: Option<(String, usize, usize, f32, usize)> = None;

        let mut flush = |state: &mut Option<(String, usize, usize, f32, usize)>,
                         out: &mut Vec<TaggedSpan>| {
            if let Some((base, start, end, score_sum, count)) = state.take() {
                if let Some(label) = Self::zero_shot_label(&base) {
                    out.push(TaggedSpan {
                        start,
                        end,
                        label: label.to_string(),
                        score: score_sum / count as f32,
                    });
                }
            }
        };

        for (i, row) in logits.iter().enumerate() {
            let (token_start, token_end) = offsets[i];
            if token_start == token_end {
                // special tokens carry no text
                continue;
            }

            let (label_id, _) = row
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                .ok_or_else(|| anyhow!("empty logit row"))?;
            let label = self
                .id_to_label
                .get(label_id)
                .map(String::as_str)
                .unwrap_or("O");
            let prob = softmax_prob(row, label_id);

            if let Some(base) = label.strip_prefix("B-") {
                flush(&mut current, &mut spans);
                current = Some((base.to_string(), token_start, token_end, prob, 1));
            } else if let Some(base) = label.strip_prefix("I-") {
                match &mut current {
                    Some((cur_base, _, end, score_sum, count)) if cur_base.as_str() == base => {
                        *end = token_end;
                        *score_sum += prob;
                        *count += 1;
                    }
                    _ => {
                        flush(&mut current, &mut spans);
                        current = Some((base.to_string(), token_start, token_end, prob, 1));
                    }
                }
            } else {
                flush(&mut current, &mut spans);
            }
        }
        flush(&mut current, &mut spans);

        debug!(count = spans.len(), "neural tagger proposed spans");
        Ok(spans)
    }
}

#[async_trait]
impl NeuralTagger for CandleTagger {
    async fn tag(&self, text: &str, labels: &[&str]) -> Result<Vec<TaggedSpan>> {
        let spans = self.predict(text)?;
        Ok(spans
            .into_iter()
            .filter(|s| labels.contains(&s.label.as_str()))
            .collect())
    }
}

fn softmax_prob(row: &[f32], index: usize) -> f32 {
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let denom: f32 = row.iter().map(|v| (v - max).exp()).sum();
    (row[index] - max).exp() / denom
}

/// Pull `id2label` out of the raw HF config; fall back to the common CoNLL
/// BIO layout when the field is absent.
fn parse_id_to_label(raw_config: &str) -> Vec<String> {
    let fallback = || {
        [
            "O", "B-MISC", "I-MISC", "B-PER", "I-PER", "B-ORG", "I-ORG", "B-LOC", "I-LOC",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw_config) else {
        return fallback();
    };
    let Some(map) = value.get("id2label").and_then(|v| v.as_object()) else {
        return fallback();
    };

    let mut labels = vec![String::from("O"); map.len()];
    for (k, v) in map {
        if let (Ok(idx), Some(label)) = (k.parse::<usize>(), v.as_str()) {
            if idx < labels.len() {
                labels[idx] = label.to_string();
            }
        }
    }
    labels
}
