//! Pointer gesture disambiguation: click vs drag, per icon and per component.
//!
//! A session exists between pointer-down and pointer-up. It starts in a pressed,
//! non-dragging state and transitions to dragging once the pointer moves more than
//! [`DRAG_THRESHOLD`] device units from the press point on either axis. Releases from
//! a dragging session commit a position; releases that never crossed the threshold
//! are clicks, further collated into double-clicks and suppressed for a short window
//! after a drag commit.

use surface_contract::{clamp_origin, Point, PointerPosition, Size};

use crate::model::{
    GestureSession, GestureTarget, InteractionState, PendingClick,
};

/// Axis displacement (device units) beyond which a press becomes a drag.
pub const DRAG_THRESHOLD: i32 = 5;

/// Window after a drag commit during which click signals are swallowed, so the
/// drag's release is not misread as a click.
pub const DRAG_CLICK_COOLDOWN_MS: u64 = 100;

/// Collation window separating single from double clicks.
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 300;

/// Opens a session for `target` at pointer-down.
pub fn begin(
    target: GestureTarget,
    pointer: PointerPosition,
    origin: Point,
    element: Size,
) -> GestureSession {
    GestureSession {
        target,
        pointer_start: pointer,
        origin,
        element,
        dragging: false,
    }
}

/// Advances a session for a pointer move.
///
/// Returns the clamped live position the element should take while dragging, or
/// `None` while the threshold has not been crossed.
pub fn track(
    session: &mut GestureSession,
    pointer: PointerPosition,
    container: Size,
) -> Option<Point> {
    let (dx, dy) = pointer.point().delta(session.pointer_start.point());
    if !session.dragging && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
        session.dragging = true;
    }
    if !session.dragging {
        return None;
    }
    Some(clamp_origin(
        session.origin.offset(dx, dy),
        session.element,
        container,
    ))
}

/// How a pointer-up resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The threshold was never crossed; the interaction is a click.
    Click,
    /// The session dragged; commit this final clamped position.
    Commit(Point),
}

/// Closes a session at pointer-up.
pub fn release(
    session: &GestureSession,
    pointer: PointerPosition,
    container: Size,
) -> ReleaseOutcome {
    if !session.dragging {
        return ReleaseOutcome::Click;
    }
    let (dx, dy) = pointer.point().delta(session.pointer_start.point());
    ReleaseOutcome::Commit(clamp_origin(
        session.origin.offset(dx, dy),
        session.element,
        container,
    ))
}

/// Click classification after cooldown suppression and double-click collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Swallowed by the post-drag cooldown.
    Suppressed,
    /// A lone click; a second one within the collation window upgrades it.
    Single,
    /// Second click on the same target within the collation window.
    Double,
}

/// Classifies a click on `target` at `at_ms`, updating collation bookkeeping.
pub fn classify_click(
    interaction: &mut InteractionState,
    target: &GestureTarget,
    at_ms: u64,
) -> ClickKind {
    if let Some(commit_ms) = interaction.last_drag_commit_ms {
        if at_ms.saturating_sub(commit_ms) < DRAG_CLICK_COOLDOWN_MS {
            return ClickKind::Suppressed;
        }
    }

    let doubled = interaction
        .pending_click
        .as_ref()
        .is_some_and(|pending| {
            pending.target == *target
                && at_ms.saturating_sub(pending.at_ms) <= DOUBLE_CLICK_WINDOW_MS
        });
    if doubled {
        interaction.pending_click = None;
        ClickKind::Double
    } else {
        interaction.pending_click = Some(PendingClick {
            target: target.clone(),
            at_ms,
        });
        ClickKind::Single
    }
}
