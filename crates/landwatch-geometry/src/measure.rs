//! Geodesic measures on lon/lat multipolygons.
//!
//! Areas and distances are measured on the WGS84 ellipsoid. Searching for
//! the nearest pair of points between two shapes happens in a local
//! planar frame ([`LocalProjection`]); only the final distance between the
//! chosen pair is geodesic.

use geo::orient::{Direction, Orient};
use geo::{
    BoundingRect, Closest, ClosestPoint, Coord, CoordsIter, EuclideanDistance,
    GeodesicArea, GeodesicDestination, GeodesicDistance, Intersects, MapCoords, MultiPolygon,
    Point,
};

/// Geodesic area in square meters, independent of ring winding.
pub fn geodesic_area(mp: &MultiPolygon<f64>) -> f64 {
    if mp.0.is_empty() {
        return 0.0;
    }
    mp.orient(Direction::Default).geodesic_area_unsigned()
}

/// Geodesic distance in meters between the nearest points of two shapes;
/// zero when they intersect.
pub fn geodesic_distance(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    if a.intersects(b) {
        return 0.0;
    }
    let Some(projection) = LocalProjection::spanning(a, b) else {
        return 0.0;
    };
    let pa = projection.project(a);
    let pb = projection.project(b);
    match nearest_pair(&pa, &pb) {
        Some((p, q)) => {
            let p = Point::from(projection.inverse(p.0));
            let q = Point::from(projection.inverse(q.0));
            p.geodesic_distance(&q)
        }
        None => 0.0,
    }
}

/// Nearest pair of points (one on each shape) in planar coordinates.
fn nearest_pair(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Option<(Point<f64>, Point<f64>)> {
    let mut best: Option<(f64, Point<f64>, Point<f64>)> = None;
    let mut consider = |from: Point<f64>, target: &MultiPolygon<f64>, swap: bool| {
        let to = match target.closest_point(&from) {
            Closest::SinglePoint(p) | Closest::Intersection(p) => p,
            Closest::Indeterminate => return,
        };
        let d = from.euclidean_distance(&to);
        if best.map_or(true, |(bd, _, _)| d < bd) {
            best = Some(if swap { (d, to, from) } else { (d, from, to) });
        }
    };
    for c in a.coords_iter() {
        consider(Point::from(c), b, false);
    }
    for c in b.coords_iter() {
        consider(Point::from(c), a, true);
    }
    best.map(|(_, p, q)| (p, q))
}

/// A local equirectangular frame in meters, calibrated against the ellipsoid
/// at its origin.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: Coord<f64>,
    /// Meters per degree of longitude at the origin.
    kx: f64,
    /// Meters per degree of latitude at the origin.
    ky: f64,
}

const CALIBRATION_M: f64 = 100.0;
const MAX_ORIGIN_LAT: f64 = 89.0;

impl LocalProjection {
    pub fn at(origin: Coord<f64>) -> Self {
        let origin = Coord {
            x: origin.x,
            y: origin.y.clamp(-MAX_ORIGIN_LAT, MAX_ORIGIN_LAT),
        };
        let p = Point::from(origin);
        let east = p.geodesic_destination(90.0, CALIBRATION_M);
        let north = p.geodesic_destination(0.0, CALIBRATION_M);
        Self {
            origin,
            kx: CALIBRATION_M / (east.x() - p.x()),
            ky: CALIBRATION_M / (north.y() - p.y()),
        }
    }

    /// Frame centered on the bounding box of a shape.
    pub fn around(mp: &MultiPolygon<f64>) -> Option<Self> {
        mp.bounding_rect().map(|r| Self::at(r.center()))
    }

    /// Frame centered on the combined bounding box of two shapes.
    pub fn spanning(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Option<Self> {
        let (ra, rb) = (a.bounding_rect()?, b.bounding_rect()?);
        let min_x = ra.min().x.min(rb.min().x);
        let min_y = ra.min().y.min(rb.min().y);
        let max_x = ra.max().x.max(rb.max().x);
        let max_y = ra.max().y.max(rb.max().y);
        Some(Self::at(Coord {
            x: (min_x + max_x) / 2.0,
            y: (min_y + max_y) / 2.0,
        }))
    }

    pub fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x) * self.kx,
            y: (c.y - self.origin.y) * self.ky,
        }
    }

    pub fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: c.x / self.kx + self.origin.x,
            y: c.y / self.ky + self.origin.y,
        }
    }

    pub fn project(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        mp.map_coords(|c| self.forward(c))
    }

    pub fn unproject(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        mp.map_coords(|c| self.inverse(c))
    }
}
