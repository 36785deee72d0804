use serde::{Deserialize, Serialize};

use crate::catalog::variant::VariantId;

/// One component of a blend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendEntry {
    /// Referenced variant
    pub variant_id: VariantId,
    /// Integer percentage in [0, 100]
    pub percentage: u32,
}

impl BlendEntry {
    pub fn new(variant_id: impl Into<VariantId>, percentage: u32) -> Self {
        Self {
            variant_id: variant_id.into(),
            percentage,
        }
    }
}

/// Ordered weighted combination of variants within one category.
///
/// Percentages should sum to 100 but the resolver normalizes
/// non-conforming sums rather than rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Blend {
    pub entries: Vec<BlendEntry>,
}

impl Blend {
    pub fn new(entries: Vec<BlendEntry>) -> Self {
        Self { entries }
    }

    /// Sum of the entry percentages
    pub fn total_percentage(&self) -> u32 {
        self.entries.iter().map(|entry| entry.percentage).sum()
    }

    /// Whether the percentages already sum to exactly 100
    pub fn is_balanced(&self) -> bool {
        self.total_percentage() == 100
    }

    /// Percentage-weighted average of per-entry factors, normalized by
    /// the total percentage so unbalanced blends still resolve
    /// consistently. A zero-total blend resolves to the neutral factor
    /// 1.0 rather than dividing by zero.
    pub fn weighted_factor<F>(&self, factor_of: F) -> f64
    where
        F: Fn(&VariantId) -> f64,
    {
        let total: f64 = self
            .entries
            .iter()
            .map(|entry| entry.percentage as f64)
            .sum();
        if total == 0.0 {
            return 1.0;
        }
        let weighted: f64 = self
            .entries
            .iter()
            .map(|entry| entry.percentage as f64 * factor_of(&entry.variant_id))
            .sum();
        weighted / total
    }
}

/// Selection of either a single variant or a weighted blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Single(VariantId),
    Blend(Blend),
}

impl Selection {
    pub fn single(id: impl Into<VariantId>) -> Self {
        Selection::Single(id.into())
    }

    /// Variant ids referenced by this selection
    pub fn variant_ids(&self) -> Vec<&VariantId> {
        match self {
            Selection::Single(id) => vec![id],
            Selection::Blend(blend) => blend
                .entries
                .iter()
                .map(|entry| &entry.variant_id)
                .collect(),
        }
    }
}

/// Rescale a blend's percentages so they sum to exactly 100.
///
/// Every percentage is scaled by `100 / total` and rounded to the nearest
/// integer; the rounding remainder (positive or negative) is assigned to
/// the single largest-percentage entry. Balancing an already balanced
/// blend is a no-op. Blends with a zero total are returned unchanged.
pub fn balance(blend: &Blend) -> Blend {
    let total = blend.total_percentage();
    if total == 0 || blend.entries.is_empty() {
        return blend.clone();
    }

    let scale = 100.0 / total as f64;
    let mut entries: Vec<BlendEntry> = blend
        .entries
        .iter()
        .map(|entry| BlendEntry {
            variant_id: entry.variant_id.clone(),
            percentage: (entry.percentage as f64 * scale).round() as u32,
        })
        .collect();

    let rounded_total: i64 = entries.iter().map(|entry| entry.percentage as i64).sum();
    let remainder = 100 - rounded_total;
    if remainder != 0 {
        // First entry holding the largest share absorbs the remainder.
        let largest = entries
            .iter()
            .enumerate()
            .max_by(|(index_a, a), (index_b, b)| {
                a.percentage
                    .cmp(&b.percentage)
                    .then(index_b.cmp(index_a))
            })
            .map(|(index, _)| index)
            .unwrap_or(0);
        let corrected = entries[largest].percentage as i64 + remainder;
        entries[largest].percentage = corrected.max(0) as u32;
    }

    Blend { entries }
}
