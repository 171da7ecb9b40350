//! Angular separation and first-match truth association

use crate::types::Direction;
use std::f64::consts::PI;

/// Azimuthal difference folded into [-pi, pi]
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut dphi = (phi1 - phi2) % (2.0 * PI);
    if dphi > PI {
        dphi -= 2.0 * PI;
    } else if dphi < -PI {
        dphi += 2.0 * PI;
    }
    dphi
}

/// Angular separation sqrt(deta^2 + dphi^2)
pub fn delta_r(a: &impl Direction, b: &impl Direction) -> f64 {
    let deta = a.eta() - b.eta();
    let dphi = delta_phi(a.phi(), b.phi());
    (deta * deta + dphi * dphi).sqrt()
}

/// Returns the first candidate strictly closer than `threshold` to `target`.
///
/// Candidates are visited in the order given. This is not a nearest-match
/// search: a closer candidate later in the sequence never displaces an
/// earlier one that already passed.
pub fn first_match_within<D, I, F, C>(
    target: &D,
    candidates: I,
    threshold: f64,
    direction: F,
) -> Option<I::Item>
where
    D: Direction,
    I: IntoIterator,
    F: Fn(&I::Item) -> C,
    C: Direction,
{
    candidates
        .into_iter()
        .find(|candidate| delta_r(target, &direction(candidate)) < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Momentum;

    fn at(eta: f64, phi: f64) -> Momentum {
        Momentum::new(10.0, eta, phi, 0.0)
    }

    #[test]
    fn test_delta_phi_wraps() {
        let d = delta_phi(3.0, -3.0);
        assert!((d - (6.0 - 2.0 * PI)).abs() < 1e-12);
        assert!(delta_phi(0.5, 0.2) > 0.0);
        assert!(delta_phi(-PI + 0.1, PI - 0.1).abs() < 0.2 + 1e-12);
    }

    #[test]
    fn test_delta_r() {
        let a = at(0.0, 0.0);
        let b = at(0.3, 0.4);
        assert!((delta_r(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_first_match_is_not_nearest() {
        let target = at(0.0, 0.0);
        let a = ("A", at(0.5, 0.0));
        let b = ("B", at(0.2, 0.0));
        let c = ("C", at(0.25, 0.0));

        let pick = |list: Vec<(&'static str, Momentum)>| {
            first_match_within(&target, list, 0.3, |(_, p)| *p).map(|(name, _)| name)
        };

        assert_eq!(pick(vec![a, b]), Some("B"));
        assert_eq!(pick(vec![b, a]), Some("B"));
        assert_eq!(pick(vec![b, c]), Some("B"));
        // C is farther than B but comes first, so it wins
        assert_eq!(pick(vec![c, b]), Some("C"));
        assert_eq!(pick(vec![a]), None);
        assert_eq!(pick(vec![]), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let target = at(0.0, 0.0);
        let edge = at(0.25, 0.0);
        assert!(first_match_within(&target, [edge], 0.25, |p| *p).is_none());
        assert!(first_match_within(&target, [edge], 0.2500001, |p| *p).is_some());
    }
}
