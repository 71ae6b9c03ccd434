use glam::DVec3;
use tileslicer_common::Aabb;

/// Triangles with twice-area below this are dropped after clipping.
const MIN_DOUBLE_AREA: f64 = 1e-12;

/// Reusable polygon buffers for [`clip_triangle`].
#[derive(Debug, Default)]
pub struct ClipScratch {
    a: Vec<DVec3>,
    b: Vec<DVec3>,
}

/// Clip one triangle to `bounds` and append the surviving piece to `out` as a
/// triangle fan. Returns how many triangles were appended.
///
/// The triangle polygon is cut against the six box planes in turn. Points on a
/// plane count as inside, and cut points are snapped onto the plane exactly.
pub fn clip_triangle(
    tri: [DVec3; 3],
    bounds: &Aabb,
    scratch: &mut ClipScratch,
    out: &mut Vec<[DVec3; 3]>,
) -> usize {
    let ClipScratch { a, b } = scratch;
    a.clear();
    a.extend_from_slice(&tri);

    for axis in 0..3 {
        clip_plane(a, b, axis, bounds.min[axis], false);
        std::mem::swap(a, b);
        clip_plane(a, b, axis, bounds.max[axis], true);
        std::mem::swap(a, b);
        if a.len() < 3 {
            return 0;
        }
    }

    let before = out.len();
    let origin = a[0];
    for pair in a[1..].windows(2) {
        let t = [origin, pair[0], pair[1]];
        if (t[1] - t[0]).cross(t[2] - t[0]).length() > MIN_DOUBLE_AREA {
            out.push(t);
        }
    }
    out.len() - before
}

/// One Sutherland-Hodgman pass: keep the part of `input` on the inside of the
/// plane `p[axis] == value`. `upper` keeps `p[axis] <= value`, otherwise `>=`.
fn clip_plane(input: &[DVec3], output: &mut Vec<DVec3>, axis: usize, value: f64, upper: bool) {
    output.clear();
    let inside = |p: DVec3| if upper { p[axis] <= value } else { p[axis] >= value };

    for (i, &current) in input.iter().enumerate() {
        let previous = input[(i + input.len() - 1) % input.len()];
        match (inside(previous), inside(current)) {
            (true, true) => output.push(current),
            (true, false) => output.push(cut(previous, current, axis, value)),
            (false, true) => {
                output.push(cut(previous, current, axis, value));
                output.push(current);
            }
            (false, false) => {}
        }
    }
}

fn cut(p: DVec3, q: DVec3, axis: usize, value: f64) -> DVec3 {
    let t = (value - p[axis]) / (q[axis] - p[axis]);
    let mut point = p + (q - p) * t;
    point[axis] = value;
    point
}
