//! Icon arrangement: Grid / List / Free position computation and registry write-back.

use surface_contract::{clamp_origin, Point, Size};

use crate::model::{ArrangementMode, ArrangementState, DesktopState, IconId, IconRecord};

/// Number of grid columns for a container/icon/spacing combination.
///
/// Each column occupies `icon_w + spacing` with the leading gap provided by the
/// previous column's trailing one, so the last column's right edge may land
/// exactly on the container edge. Always at least one column, however narrow
/// the container.
pub fn grid_columns(container_w: i32, icon_w: i32, spacing: i32) -> usize {
    (container_w / (icon_w + spacing)).max(1) as usize
}

/// Grid-mode pixel position of the icon at insertion-order `index`.
pub fn grid_slot(index: usize, columns: usize, cell: Size, spacing: i32) -> Point {
    let row = (index / columns) as i32;
    let col = (index % columns) as i32;
    Point::new(
        col * (cell.w + spacing) + spacing,
        row * (cell.h + spacing) + spacing,
    )
}

/// Computes target positions for `icons` under `arrangement` in `container`.
///
/// Pure and deterministic for a fixed ordered icon sequence: calling it twice with
/// unchanged inputs yields identical results. Free mode passes stored positions
/// through (clamped to the container) and assigns Grid-mode slots to icons that have
/// never been placed, so first placement still looks organized.
pub fn compute_layout(
    icons: &[IconRecord],
    arrangement: &ArrangementState,
    container: Size,
) -> Vec<(IconId, Point)> {
    let cell = arrangement.icon_size.cell();
    let spacing = arrangement.spacing;
    let columns = grid_columns(container.w, cell.w, spacing);

    icons
        .iter()
        .enumerate()
        .map(|(index, icon)| {
            let target = match arrangement.mode {
                ArrangementMode::Grid => grid_slot(index, columns, cell, spacing),
                ArrangementMode::List => {
                    Point::new(spacing, (index as i32) * (cell.h + spacing) + spacing)
                }
                ArrangementMode::Free => match icon.position {
                    Some(stored) => clamp_origin(stored, cell, container),
                    None => grid_slot(index, columns, cell, spacing),
                },
            };
            (icon.id, target)
        })
        .collect()
}

/// Recomputes the layout and writes positions back into the icon registry.
///
/// Returns whether any stored position changed (including the one-time promotion of
/// an unset Free-mode position), which is what decides whether persistence runs.
pub fn apply_layout(state: &mut DesktopState) -> bool {
    let layout = compute_layout(&state.icons, &state.arrangement, state.container);
    let mut changed = false;
    for (id, target) in layout {
        if let Some(icon) = state.icon_mut(id) {
            if icon.position != Some(target) {
                icon.position = Some(target);
                changed = true;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{IconSizeClass, DEFAULT_CONTAINER};

    fn icon(id: u64, position: Option<Point>) -> IconRecord {
        IconRecord {
            id: IconId(id),
            owner_program_ref: format!("prog.{id}"),
            display_name: format!("Icon {id}"),
            icon_asset_ref: None,
            position,
            created_at_unix_ms: 0,
            exiting: false,
        }
    }

    fn grid_arrangement() -> ArrangementState {
        ArrangementState {
            mode: ArrangementMode::Grid,
            icon_size: IconSizeClass::Medium,
            auto_arrange: true,
            spacing: 20,
        }
    }

    #[test]
    fn column_count_matches_formula() {
        // W=1000, iw=80, s=20 -> floor(1000 / 100) = 10; column 10's right edge
        // lands exactly on the container edge.
        assert_eq!(grid_columns(1000, 80, 20), 10);
        assert_eq!(grid_columns(999, 80, 20), 9);
        assert_eq!(grid_columns(119, 80, 20), 1);
        assert_eq!(grid_columns(0, 80, 20), 1);
    }

    #[test]
    fn grid_layout_is_deterministic_and_idempotent() {
        let icons: Vec<_> = (0..12).map(|i| icon(i, None)).collect();
        let arrangement = grid_arrangement();

        let first = compute_layout(&icons, &arrangement, Size::new(1000, 700));
        let second = compute_layout(&icons, &arrangement, Size::new(1000, 700));
        assert_eq!(first, second);
    }

    #[test]
    fn grid_places_by_insertion_order() {
        let icons: Vec<_> = (0..25).map(|i| icon(i, None)).collect();
        let layout = compute_layout(&icons, &grid_arrangement(), Size::new(1000, 700));

        // 10 columns; icon 24 lands in row 2, col 4.
        assert_eq!(layout[24].1, Point::new(4 * 100 + 20, 2 * 116 + 20));
        assert_eq!(layout[0].1, Point::new(20, 20));
        assert_eq!(layout[10].1, Point::new(20, 136));
    }

    #[test]
    fn list_layout_uses_single_column() {
        let icons: Vec<_> = (0..3).map(|i| icon(i, None)).collect();
        let layout = compute_layout(&icons, &ArrangementState {
            mode: ArrangementMode::List,
            ..grid_arrangement()
        }, Size::new(1000, 700));

        assert_eq!(layout[0].1, Point::new(20, 20));
        assert_eq!(layout[1].1, Point::new(20, 136));
        assert_eq!(layout[2].1, Point::new(20, 252));
    }

    #[test]
    fn free_mode_promotes_unset_positions_to_grid_slots() {
        let icons = vec![icon(0, Some(Point::new(300, 300))), icon(1, None)];
        let arrangement = ArrangementState {
            mode: ArrangementMode::Free,
            ..grid_arrangement()
        };

        let layout = compute_layout(&icons, &arrangement, Size::new(1000, 700));
        assert_eq!(layout[0].1, Point::new(300, 300));
        // Unplaced icon gets the Grid-mode position for its index.
        assert_eq!(layout[1].1, grid_slot(1, 10, IconSizeClass::Medium.cell(), 20));
    }

    #[test]
    fn free_mode_clamps_stored_positions_to_container() {
        let icons = vec![icon(0, Some(Point::new(5000, -40)))];
        let arrangement = ArrangementState {
            mode: ArrangementMode::Free,
            ..grid_arrangement()
        };

        let layout = compute_layout(&icons, &arrangement, Size::new(1000, 700));
        assert_eq!(layout[0].1, Point::new(1000 - 80, 0));
    }

    #[test]
    fn apply_layout_reports_promotion_as_change() {
        let mut state = DesktopState::default();
        state.arrangement.mode = ArrangementMode::Free;
        state.icons.push(icon(1, None));

        assert!(apply_layout(&mut state));
        assert!(state.icon(IconId(1)).and_then(|i| i.position).is_some());
        // Second pass with no mutations is a no-op.
        assert!(!apply_layout(&mut state));
        assert_eq!(state.container, DEFAULT_CONTAINER);
    }
}
