//! Threshold and colour classification of cell counts.
//!
//! Two interchangeable policies sit behind [`ColorStrategy`]:
//!
//! | policy   | breakpoints                         | colour                     |
//! |----------|-------------------------------------|----------------------------|
//! | quantize | 3 equal-width buckets over all cells | bucket in activity palette |
//! | quantile | per activity, per position parity   | bucket in activity palette |
//!
//! Palettes alternate by activity index so that two activities sharing a
//! cell stay distinguishable.

use calgrid_common::config::ShadingPolicy;

/// Number of visual buckets.
pub const BUCKETS: u8 = 3;

/// Palette for even activity indices, low → high.
pub const EVEN_PALETTE: [&str; 3] = ["#c6e48b", "#7bc96f", "#239a3b"];
/// Palette for odd activity indices, low → high.
pub const ODD_PALETTE: [&str; 3] = ["#c0ddf9", "#73b3f3", "#3886e1"];

/// What a strategy needs to know about one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Activity precedence index.
    pub activity: usize,
    /// Position of the cell within its activity's chronological run.
    pub position: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shade {
    /// 1 (low) ..= 3 (high).
    pub bucket: u8,
    pub color: &'static str,
}

impl Shade {
    fn new(activity: usize, bucket: u8) -> Self {
        let palette = if activity % 2 == 0 { &EVEN_PALETTE } else { &ODD_PALETTE };
        let bucket = bucket.clamp(1, BUCKETS);
        Shade {
            bucket,
            color: palette[usize::from(bucket - 1)],
        }
    }
}

pub trait ColorStrategy {
    fn classify(&self, probe: &Probe) -> Shade;
}

/// Build probes for `(activity, count)` pairs listed activity by activity,
/// numbering positions within each activity's run.
pub fn probes<I>(cells: I) -> Vec<Probe>
where
    I: IntoIterator<Item = (usize, u32)>,
{
    let mut runs: Vec<usize> = Vec::new();
    cells
        .into_iter()
        .map(|(activity, count)| {
            if runs.len() <= activity {
                runs.resize(activity + 1, 0);
            }
            let position = runs[activity];
            runs[activity] += 1;
            Probe {
                activity,
                position,
                value: f64::from(count),
            }
        })
        .collect()
}

/// Fit the strategy selected by `policy` to every probe of a pass.
pub fn fit(policy: ShadingPolicy, probes: &[Probe]) -> Box<dyn ColorStrategy> {
    match policy {
        ShadingPolicy::Quantize => Box::new(QuantizeStrategy::fit(probes.iter().map(|p| p.value))),
        ShadingPolicy::Quantile => Box::new(QuantileStrategy::fit(probes)),
    }
}

// ─── quantize ───────────────────────────────────────────────────────────

/// Three equal-width buckets over the global `[min, max]`.
///
/// A value on a bucket boundary belongs to the higher bucket; values
/// outside the domain clamp to the first or last bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeStrategy {
    domain: Option<(f64, f64)>,
}

impl QuantizeStrategy {
    pub fn fit<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let domain = values.into_iter().fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
        QuantizeStrategy { domain }
    }

    pub fn bucket(&self, value: f64) -> u8 {
        let (lo, hi) = match self.domain {
            Some((lo, hi)) if hi > lo => (lo, hi),
            // no spread: everything ties with the top of the domain
            _ => return BUCKETS,
        };
        let step = (hi - lo) / f64::from(BUCKETS);
        let crossed = (1..BUCKETS)
            .filter(|&k| value >= lo + step * f64::from(k))
            .count();
        1 + crossed as u8
    }
}

impl ColorStrategy for QuantizeStrategy {
    fn classify(&self, probe: &Probe) -> Shade {
        Shade::new(probe.activity, self.bucket(probe.value))
    }
}

// ─── quantile ───────────────────────────────────────────────────────────

/// Quantile breakpoints over one sample of values.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileScale {
    /// Ascending breakpoints; empty when the sample is degenerate.
    thresholds: Vec<f64>,
}

impl QuantileScale {
    pub fn new(mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        values.sort_by(f64::total_cmp);
        let distinct = values.windows(2).filter(|w| w[0] != w[1]).count() + 1;
        if values.is_empty() || distinct < 2 {
            return QuantileScale { thresholds: Vec::new() };
        }
        let thresholds = (1..BUCKETS)
            .map(|k| quantile_sorted(&values, k))
            .collect();
        QuantileScale { thresholds }
    }

    pub fn bucket(&self, value: f64) -> u8 {
        if self.thresholds.is_empty() {
            return BUCKETS;
        }
        let crossed = self.thresholds.iter().filter(|&&t| value >= t).count();
        1 + crossed as u8
    }
}

/// Linear-interpolation `k / BUCKETS` quantile of an ascending, non-empty
/// slice.
fn quantile_sorted(sorted: &[f64], k: u8) -> f64 {
    let h = (sorted.len() - 1) as f64 * f64::from(k) / f64::from(BUCKETS);
    let lo = h.floor() as usize;
    match sorted.get(lo + 1) {
        Some(&next) => sorted[lo] + (h - lo as f64) * (next - sorted[lo]),
        None => sorted[lo],
    }
}

/// Legacy styling: per activity, values at even and odd positions get
/// their own quantile scale.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileStrategy {
    /// Indexed by activity; `[even positions, odd positions]`.
    scales: Vec<[QuantileScale; 2]>,
}

impl QuantileStrategy {
    pub fn fit(probes: &[Probe]) -> Self {
        let activities = probes.iter().map(|p| p.activity + 1).max().unwrap_or(0);
        let scales = (0..activities)
            .map(|activity| {
                let subset = |parity: usize| {
                    probes
                        .iter()
                        .filter(|p| p.activity == activity && p.position % 2 == parity)
                        .map(|p| p.value)
                        .collect::<Vec<_>>()
                };
                [QuantileScale::new(subset(0)), QuantileScale::new(subset(1))]
            })
            .collect();
        QuantileStrategy { scales }
    }

    pub fn bucket(&self, probe: &Probe) -> u8 {
        self.scales
            .get(probe.activity)
            .map(|pair| pair[probe.position % 2].bucket(probe.value))
            .unwrap_or(BUCKETS)
    }
}

impl ColorStrategy for QuantileStrategy {
    fn classify(&self, probe: &Probe) -> Shade {
        Shade::new(probe.activity, self.bucket(probe))
    }
}
