//! Response normalizer
//!
//! The model is instructed to answer with JSON only, but in practice wraps
//! the object in prose ("Here you go: {...}"). The normalizer locates the
//! first balanced `{...}` substring, decodes it, and applies the defaulting
//! and price-reconciliation policy. Failure at any point fails the whole
//! ingestion attempt; nothing is persisted partially.

use crate::extraction::gateway::ExtractionError;
use crate::model::receipt::{DEFAULT_UNIT, NewLineItem, NewReceipt, UNNAMED_PRODUCT};
use serde::Deserialize;

/// Locate the first balanced `{...}` substring in `text`, tolerant of
/// leading and trailing commentary. Brace counting is aware of string
/// literals and escapes, so braces inside extracted product names do not
/// unbalance the scan.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Wire shape of the model's answer. Every field is optional; the
/// defaulting policy below fills the gaps.
#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    loja_nome: Option<String>,
    #[serde(default)]
    valor_total: Option<f64>,
    #[serde(default)]
    produtos: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default)]
    nome: Option<String>,
    /// Line total as reported by the model
    #[serde(default)]
    preco: Option<f64>,
    #[serde(default)]
    preco_unitario: Option<f64>,
    #[serde(default)]
    quantidade: Option<f64>,
    #[serde(default)]
    unidade: Option<String>,
    #[serde(default)]
    palavras_chave: Vec<String>,
}

impl RawProduct {
    /// Defaulting policy: missing name → "unnamed product", missing prices
    /// → zero, missing quantity → one, missing unit → "un", missing
    /// keywords → empty. The persisted line total is the model's reported
    /// `preco`; the unit price is stored separately when available and no
    /// arithmetic correction is applied when the two disagree.
    fn normalize(self) -> NewLineItem {
        NewLineItem {
            name: self
                .nome
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
            unit_price: self.preco_unitario,
            line_total: self.preco.unwrap_or(0.0),
            quantity: self.quantidade.unwrap_or(1.0),
            unit: self
                .unidade
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            keywords: self.palavras_chave,
        }
    }
}

/// Turn the model's raw text into a typed record ready for persistence
pub fn normalize_extraction(text: &str) -> Result<NewReceipt, ExtractionError> {
    let object = extract_json_object(text).ok_or(ExtractionError::NoJsonObject)?;

    let raw: RawExtraction =
        serde_json::from_str(object).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    Ok(NewReceipt {
        store_name: raw.loja_nome.filter(|n| !n.trim().is_empty()),
        total_amount: raw.valor_total,
        items: raw.produtos.into_iter().map(RawProduct::normalize).collect(),
    })
}
