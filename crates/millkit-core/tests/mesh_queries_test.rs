use millkit_core::{
    chain_segments, is_closed, load_stl, simplify_collinear, Mesh, Point3, ScanAxis, Triangle,
    CHAIN_TOLERANCE,
};
use proptest::prelude::*;
use std::io::Write;

fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
    Point3::new(x, y, z)
}

fn unit_cube() -> Mesh {
    let faces = [
        // bottom
        [p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0)],
        [p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0)],
        // top
        [p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0)],
        [p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)],
        // front
        [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)],
        [p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)],
        // back
        [p(0.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0)],
        [p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0)],
        // left
        [p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0)],
        [p(0.0, 0.0, 0.0), p(0.0, 1.0, 1.0), p(0.0, 1.0, 0.0)],
        // right
        [p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0)],
        [p(1.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)],
    ];
    Mesh::new(
        faces
            .iter()
            .map(|[a, b, c]| Triangle::new(*a, *b, *c))
            .collect(),
    )
}

#[test]
fn test_cube_cross_section_is_closed_square() {
    let cube = unit_cube();
    let segments = cube.slice_at_z(0.5);
    assert_eq!(segments.len(), 8);

    let chains = chain_segments(&segments, CHAIN_TOLERANCE);
    assert_eq!(chains.len(), 1);
    assert!(is_closed(&chains[0], CHAIN_TOLERANCE));

    let square = simplify_collinear(&chains[0], CHAIN_TOLERANCE);
    assert_eq!(square.len(), 5, "four corners plus the closing point");
    for corner in &square {
        assert!((corner.z - 0.5).abs() < 1e-12);
        assert!(corner.x.abs() < 1e-9 || (corner.x - 1.0).abs() < 1e-9);
        assert!(corner.y.abs() < 1e-9 || (corner.y - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_cube_scanline_and_height() {
    let cube = unit_cube();

    let intervals = cube.scanline_intervals(ScanAxis::X, 0.5);
    assert_eq!(intervals.len(), 1);
    assert!(intervals[0].start.abs() < 1e-9);
    assert!((intervals[0].end - 1.0).abs() < 1e-9);

    let intervals = cube.scanline_intervals(ScanAxis::Y, 0.25);
    assert_eq!(intervals.len(), 1);

    assert_eq!(cube.sample_top_z(0.5, 0.5), Some(1.0));
    assert_eq!(cube.sample_top_z(0.0, 0.0), Some(1.0));
    assert!(cube.sample_top_z(1.5, 0.5).is_none());
}

/// Closed wedge on a 2 x 1 base whose top rises from z = 0 at x = 0 to
/// z = 1 at x = 2.
fn wedge() -> Mesh {
    let faces = [
        [p(0.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(2.0, 0.0, 0.0)],
        [p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(2.0, 1.0, 0.0)],
        [p(0.0, 0.0, 0.0), p(2.0, 0.0, 1.0), p(2.0, 1.0, 1.0)],
        [p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0), p(0.0, 1.0, 0.0)],
        [p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(2.0, 1.0, 1.0)],
        [p(2.0, 0.0, 0.0), p(2.0, 1.0, 1.0), p(2.0, 0.0, 1.0)],
        [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 1.0)],
        [p(0.0, 1.0, 0.0), p(2.0, 1.0, 1.0), p(2.0, 1.0, 0.0)],
    ];
    Mesh::new(
        faces
            .iter()
            .map(|[a, b, c]| Triangle::new(*a, *b, *c))
            .collect(),
    )
}

#[test]
fn test_wedge_scanline_follows_slope() {
    let wedge = wedge();

    let intervals = wedge.scanline_intervals(ScanAxis::X, 0.5);
    assert_eq!(intervals.len(), 1);
    assert!(intervals[0].start.abs() < 1e-9);
    assert!((intervals[0].end - 2.0).abs() < 1e-9);

    let intervals = wedge.scanline_intervals(ScanAxis::Y, 1.0);
    assert_eq!(intervals.len(), 1);
    assert!((intervals[0].length() - 1.0).abs() < 1e-9);

    for x in [0.25, 0.5, 1.0, 1.5, 1.75] {
        let z = wedge.sample_top_z(x, 0.5).unwrap();
        assert!((z - x / 2.0).abs() < 1e-9, "x={} z={}", x, z);
    }
}

#[test]
fn test_wedge_cross_section_is_trimmed_rectangle() {
    let segments = wedge().slice_at_z(0.5);
    let chains = chain_segments(&segments, CHAIN_TOLERANCE);
    assert_eq!(chains.len(), 1);

    let outline = simplify_collinear(&chains[0], CHAIN_TOLERANCE);
    assert_eq!(outline.len(), 5);
    for corner in &outline {
        assert!((corner.x - 1.0).abs() < 1e-9 || (corner.x - 2.0).abs() < 1e-9);
        assert!(corner.y.abs() < 1e-9 || (corner.y - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_stepped_surface_takes_upper_step() {
    // two treads at z = 1 and z = 2 joined by a vertical riser at x = 1
    let steps = Mesh::new(vec![
        Triangle::new(p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0)),
        Triangle::new(p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)),
        Triangle::new(p(1.0, 0.0, 1.0), p(1.0, 1.0, 2.0), p(1.0, 1.0, 1.0)),
        Triangle::new(p(1.0, 0.0, 1.0), p(1.0, 0.0, 2.0), p(1.0, 1.0, 2.0)),
        Triangle::new(p(1.0, 0.0, 2.0), p(2.0, 0.0, 2.0), p(2.0, 1.0, 2.0)),
        Triangle::new(p(1.0, 0.0, 2.0), p(2.0, 1.0, 2.0), p(1.0, 1.0, 2.0)),
    ]);

    let intervals = steps.scanline_intervals(ScanAxis::X, 0.5);
    assert_eq!(intervals.len(), 1);
    assert!(intervals[0].start.abs() < 1e-9);
    assert!((intervals[0].end - 2.0).abs() < 1e-9);

    assert_eq!(steps.sample_top_z(0.5, 0.5), Some(1.0));
    assert_eq!(steps.sample_top_z(1.5, 0.5), Some(2.0));
    assert_eq!(steps.sample_top_z(1.0, 0.5), Some(2.0));
}

#[test]
fn test_cube_bounds() {
    let bounds = unit_cube().bounds().unwrap();
    assert_eq!(bounds.min, p(0.0, 0.0, 0.0));
    assert_eq!(bounds.max, p(1.0, 1.0, 1.0));
}

#[test]
fn test_load_ascii_file_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
    writeln!(
        file,
        "solid tri\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 2 0 0\n   vertex 0 2 0\n  endloop\n endfacet\nendsolid tri"
    )
    .unwrap();

    let mesh = load_stl(file.path()).unwrap();
    assert_eq!(mesh.len(), 1);
    assert_eq!(mesh.triangles()[0].b, p(2.0, 0.0, 0.0));
}

proptest! {
    #[test]
    fn prop_plane_segment_lies_on_plane(
        coords in proptest::array::uniform9(-100.0f64..100.0),
        z0 in -100.0f64..100.0,
    ) {
        let t = Triangle::new(
            p(coords[0], coords[1], coords[2]),
            p(coords[3], coords[4], coords[5]),
            p(coords[6], coords[7], coords[8]),
        );
        if let Some(segment) = t.intersect_plane_z(z0) {
            let lo = coords[0].min(coords[3]).min(coords[6]) - 1e-6;
            let hi = coords[0].max(coords[3]).max(coords[6]) + 1e-6;
            for q in [segment.start, segment.end] {
                prop_assert_eq!(q.z, z0);
                prop_assert!(q.x >= lo && q.x <= hi);
            }
        }
    }

    #[test]
    fn prop_sampled_height_within_triangle_range(
        coords in proptest::array::uniform9(-50.0f64..50.0),
        x in -50.0f64..50.0,
        y in -50.0f64..50.0,
    ) {
        let t = Triangle::new(
            p(coords[0], coords[1], coords[2]),
            p(coords[3], coords[4], coords[5]),
            p(coords[6], coords[7], coords[8]),
        );
        if let Some(z) = t.sample_z_at_xy(x, y) {
            let lo = coords[2].min(coords[5]).min(coords[8]);
            let hi = coords[2].max(coords[5]).max(coords[8]);
            let slack = 1e-6 * (1.0 + hi.abs().max(lo.abs()));
            prop_assert!(z.is_finite());
            prop_assert!(z >= lo - slack && z <= hi + slack);
        }
    }
}
