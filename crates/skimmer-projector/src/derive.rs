//! Derived-field helpers shared by projection closures

/// Sum `value` over every group; an absent or empty group contributes 0
pub fn sum_over<'a, T, I, F>(groups: I, value: F) -> f64
where
    T: 'a,
    I: IntoIterator<Item = Option<&'a [T]>>,
    F: Fn(&T) -> f64,
{
    groups
        .into_iter()
        .flatten()
        .flat_map(|group| group.iter())
        .map(value)
        .sum()
}

/// Boolean reading of a discriminator value
pub fn passes_discriminator(value: f64) -> bool {
    value > 0.5
}

/// Delta-beta corrected combined isolation: `ch + max(0, nh + ph - 0.5 pu)`
pub fn delta_beta_isolation(charged: f64, neutral: f64, photon: f64, pileup: f64) -> f64 {
    charged + (neutral + photon - 0.5 * pileup).max(0.0)
}
