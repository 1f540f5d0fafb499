use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance in the crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Great-circle distance in kilometres (haversine on radians).
#[inline]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = b.lng.to_radians() - a.lng.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Index of the point in `candidates` closest to `target`. First wins on ties.
pub fn nearest(target: GeoPoint, candidates: impl IntoIterator<Item = GeoPoint>) -> Option<usize> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, p)| (i, haversine_km(target, p)))
        .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(-25.2637, -57.5759);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let target = GeoPoint::new(0.0, 0.0);
        let pts = vec![
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, -1.0),
            GeoPoint::new(0.0, 0.5),
        ];
        assert_eq!(nearest(target, pts.iter().copied()), Some(2));
        assert_eq!(nearest(target, pts[..2].iter().copied()), Some(0));
        assert_eq!(nearest(target, std::iter::empty()), None);
    }

    #[test]
    fn test_validity() {
        assert!(GeoPoint::new(45.0, 170.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
