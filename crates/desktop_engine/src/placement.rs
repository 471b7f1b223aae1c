//! Collision-avoiding placement of floating components relative to desktop icons.
//!
//! Placement degrades through a fixed probe ladder: the caller's preferred position,
//! then anchors derived from the icon-occupied region, then the sides of the nearest
//! icon, and finally the container's bottom-right corner as a best-effort fallback
//! that is allowed to overlap. Every check uses the same padded-rectangle overlap
//! test, with both rectangles expanded by [`COMPONENT_PADDING`].

use surface_contract::{clamp_origin, Point, Rect, Size};

/// Minimum clearance enforced between a placed component and any icon rectangle.
pub const COMPONENT_PADDING: i32 = 20;

// Both rectangles carry the padding in the overlap test and exactly-touching
// expanded edges still count as overlap, so a probe must stand off by twice the
// padding plus one to clear it.
const PROBE_CLEARANCE: i32 = COMPONENT_PADDING * 2 + 1;

fn is_clear(candidate: Rect, icons: &[Rect]) -> bool {
    icons
        .iter()
        .all(|icon| !candidate.intersects_padded(*icon, COMPONENT_PADDING))
}

/// Bounding box of the icon-occupied region, if any icons are placed.
fn occupied_region(icons: &[Rect]) -> Option<Rect> {
    let first = icons.first()?;
    let mut left = first.x;
    let mut top = first.y;
    let mut right = first.right();
    let mut bottom = first.bottom();
    for icon in &icons[1..] {
        left = left.min(icon.x);
        top = top.min(icon.y);
        right = right.max(icon.right());
        bottom = bottom.max(icon.bottom());
    }
    Some(Rect::new(left, top, right - left, bottom - top))
}

/// Anchor probes derived from the occupied region and container corners, in order.
fn region_anchors(region: Rect, size: Size, container: Size) -> [Point; 5] {
    [
        // Right of the occupied region.
        Point::new(region.right() + PROBE_CLEARANCE, region.y),
        // Below the occupied region.
        Point::new(region.x, region.bottom() + PROBE_CLEARANCE),
        // Diagonally past its bottom-right corner.
        Point::new(
            region.right() + PROBE_CLEARANCE,
            region.bottom() + PROBE_CLEARANCE,
        ),
        // Container corners.
        Point::new(container.w - size.w, 0),
        Point::new(container.w - size.w, container.h - size.h),
    ]
}

/// Side probes around one icon, in preference order: right, below, left, above.
fn side_probes(icon: Rect, size: Size) -> [Point; 4] {
    [
        Point::new(icon.right() + PROBE_CLEARANCE, icon.y),
        Point::new(icon.x, icon.bottom() + PROBE_CLEARANCE),
        Point::new(icon.x - PROBE_CLEARANCE - size.w, icon.y),
        Point::new(icon.x, icon.y - PROBE_CLEARANCE - size.h),
    ]
}

/// Computes a position for a component of `size` that avoids overlapping any icon.
///
/// Returns a best-effort position when the search budget is exhausted; that final
/// fallback (container bottom-right, clamped) may overlap icons and is not an error.
pub fn place_component(
    size: Size,
    preferred: Option<Point>,
    icons: &[Rect],
    container: Size,
) -> Point {
    let candidate_origin = preferred
        .map(|p| clamp_origin(p, size, container))
        .unwrap_or_else(|| {
            clamp_origin(
                Point::new((container.w - size.w) / 2, (container.h - size.h) / 2),
                size,
                container,
            )
        });
    let candidate = Rect::from_origin_size(candidate_origin, size);

    if preferred.is_some() && is_clear(candidate, icons) {
        return candidate_origin;
    }

    if let Some(region) = occupied_region(icons) {
        for anchor in region_anchors(region, size, container) {
            let origin = clamp_origin(anchor, size, container);
            if is_clear(Rect::from_origin_size(origin, size), icons) {
                return origin;
            }
        }

        let nearest = icons
            .iter()
            .min_by_key(|icon| candidate.center_distance_sq(**icon))
            .copied();
        if let Some(icon) = nearest {
            for probe in side_probes(icon, size) {
                let rect = Rect::from_origin_size(probe, size);
                if rect.fits_within(container) && is_clear(rect, icons) {
                    return probe;
                }
            }
        }
    } else if is_clear(candidate, icons) {
        // No icons on the desktop; the candidate (preferred or centered) stands.
        return candidate_origin;
    }

    // Search exhausted: degrade to the bottom-right corner, clamped.
    clamp_origin(
        Point::new(container.w - size.w, container.h - size.h),
        size,
        container,
    )
}

/// Re-validates a component position after a live drag in non-Free arrangement modes.
///
/// Returns `Some(new_origin)` when the dragged position overlaps an icon and a nudge
/// is needed, or `None` when the position is acceptable as-is.
pub fn adjust_position(current: Rect, icons: &[Rect], container: Size) -> Option<Point> {
    if is_clear(current, icons) {
        return None;
    }
    Some(place_component(
        current.size(),
        Some(current.origin()),
        icons,
        container,
    ))
}
