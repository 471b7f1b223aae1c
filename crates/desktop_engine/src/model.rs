//! Core data model: icon and component records, arrangement configuration, gesture
//! session state, and the `DesktopState` context object everything operates on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use platform_host::ProcessId;
use serde::{Deserialize, Serialize};
use surface_contract::{Point, PointerPosition, Rect, Size};

/// Schema version for persisted icon and arrangement payloads.
pub const LAYOUT_SCHEMA_VERSION: u32 = 1;

/// Container size assumed before the surface reports a real one.
pub const DEFAULT_CONTAINER: Size = Size::new(1024, 768);

/// Engine-assigned identifier of a desktop icon, monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IconId(pub u64);

/// Caller-supplied identifier of a floating component, unique per desktop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub String);

impl ComponentId {
    /// Wraps a raw string id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw string id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How icons are laid out on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrangementMode {
    /// Left-to-right rows, filled in insertion order.
    Grid,
    /// A single column in insertion order.
    List,
    /// Stored per-icon positions are authoritative.
    Free,
}

/// Icon size class; each maps to a fixed cell footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconSizeClass {
    /// 56 by 72 cell.
    Small,
    /// 80 by 96 cell (the default).
    Medium,
    /// 104 by 120 cell.
    Large,
}

impl IconSizeClass {
    /// Cell footprint (icon glyph plus label area) for this size class.
    pub const fn cell(self) -> Size {
        match self {
            Self::Small => Size::new(56, 72),
            Self::Medium => Size::new(80, 96),
            Self::Large => Size::new(104, 120),
        }
    }
}

/// Process-wide icon arrangement configuration; persisted on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangementState {
    /// Active layout mode.
    pub mode: ArrangementMode,
    /// Active icon size class.
    pub icon_size: IconSizeClass,
    /// Whether icon drags in Grid/List snap back into the computed flow.
    pub auto_arrange: bool,
    /// Gap between icon cells and from the container edges, device units.
    pub spacing: i32,
}

impl Default for ArrangementState {
    fn default() -> Self {
        Self {
            mode: ArrangementMode::Grid,
            icon_size: IconSizeClass::Medium,
            auto_arrange: true,
            spacing: 20,
        }
    }
}

/// One desktop shortcut bound to a launchable program reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconRecord {
    /// Engine-assigned id.
    pub id: IconId,
    /// Reference to the program the icon launches.
    pub owner_program_ref: String,
    /// Label rendered under the icon.
    pub display_name: String,
    /// Optional reference to a glyph asset; the surface falls back otherwise.
    pub icon_asset_ref: Option<String>,
    /// `None` until first placed; authoritative once set under Free mode.
    pub position: Option<Point>,
    /// Creation time in unix milliseconds.
    pub created_at_unix_ms: u64,
    /// Removal exit transition in progress; excluded from persistence.
    #[serde(skip)]
    pub exiting: bool,
}

impl IconRecord {
    /// Bounding rectangle at the icon's current position, if placed.
    pub fn rect(&self, cell: Size) -> Option<Rect> {
        self.position.map(|p| Rect::from_origin_size(p, cell))
    }
}

/// Payload for the external "add shortcut" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIconRequest {
    /// Reference to the program the icon launches; required.
    pub owner_program_ref: String,
    /// Label rendered under the icon; required.
    pub display_name: String,
    /// Optional reference to a glyph asset.
    pub icon_asset_ref: Option<String>,
}

/// A floating overlay owned by an external process, distinct from icons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Caller-supplied id.
    pub id: ComponentId,
    /// Owning process, consulted for liveness and termination cleanup.
    pub owner_pid: ProcessId,
    /// Free-form component kind tag (clock, tray, notification, ...).
    pub kind: String,
    /// Current top-left corner in container coordinates.
    pub position: Point,
    /// Fixed dimensions.
    pub size: Size,
    /// Survives its owner's termination.
    pub persistent: bool,
    /// Whether the user may drag it.
    pub draggable: bool,
    /// Creation time in unix milliseconds.
    pub created_at_unix_ms: u64,
}

impl ComponentRecord {
    /// Bounding rectangle at the component's current position.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

/// Payload for component creation by an owning process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateComponentRequest {
    /// Desired component id; required and unique.
    pub id: String,
    /// Owning process; must be live at creation time.
    pub owner_pid: ProcessId,
    /// Free-form component kind tag; required.
    pub kind: String,
    /// Dimensions; both must be strictly positive.
    pub size: Size,
    /// Position to try first; collision avoidance may move it.
    pub preferred_position: Option<Point>,
    /// Whether the component survives its owner's termination.
    pub persistent: bool,
    /// Whether the user may drag it.
    pub draggable: bool,
}

/// What a gesture session is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureTarget {
    /// A desktop icon.
    Icon(IconId),
    /// A floating component.
    Component(ComponentId),
}

/// Ephemeral per-pointer interaction state; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureSession {
    /// What the pointer landed on.
    pub target: GestureTarget,
    /// Pointer position at press, device coordinates.
    pub pointer_start: PointerPosition,
    /// Element offset within the container at press.
    pub origin: Point,
    /// Element footprint, for clamping live positions.
    pub element: Size,
    /// Set once the pointer crosses the drag threshold; never unset.
    pub dragging: bool,
}

/// First click of a potential double-click, awaiting collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClick {
    /// What was clicked.
    pub target: GestureTarget,
    /// Click timestamp in unix milliseconds.
    pub at_ms: u64,
}

/// Pointer/gesture interaction state; at most one session exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    /// The active press/drag session, if any.
    pub gesture: Option<GestureSession>,
    /// Stamp of the last drag commit, for click suppression.
    pub last_drag_commit_ms: Option<u64>,
    /// First click of a potential double-click, awaiting collation.
    pub pending_click: Option<PendingClick>,
}

/// Authoritative engine state: icon registry, component registry, arrangement.
///
/// Constructed once by the shell process and handed to each sub-engine; there is
/// no hidden global state.
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopState {
    /// Next icon id to allocate; repaired from the registry on hydration.
    pub next_icon_id: u64,
    /// Icons in insertion order; order drives Grid/List slots.
    pub icons: Vec<IconRecord>,
    /// Component table keyed by caller-supplied id.
    pub components: BTreeMap<ComponentId, ComponentRecord>,
    /// Owner process -> component ids, kept consistent with `components`.
    pub owner_index: HashMap<ProcessId, BTreeSet<ComponentId>>,
    /// Arrangement configuration; persisted on every mutation.
    pub arrangement: ArrangementState,
    /// Container bounds recorded at the last layout pass.
    pub container: Size,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            next_icon_id: 1,
            icons: Vec::new(),
            components: BTreeMap::new(),
            owner_index: HashMap::new(),
            arrangement: ArrangementState::default(),
            container: DEFAULT_CONTAINER,
        }
    }
}

impl DesktopState {
    /// Looks up an icon by id.
    pub fn icon(&self, id: IconId) -> Option<&IconRecord> {
        self.icons.iter().find(|i| i.id == id)
    }

    /// Looks up an icon by id, mutably.
    pub fn icon_mut(&mut self, id: IconId) -> Option<&mut IconRecord> {
        self.icons.iter_mut().find(|i| i.id == id)
    }

    /// Looks up a component by id.
    pub fn component(&self, id: &ComponentId) -> Option<&ComponentRecord> {
        self.components.get(id)
    }

    /// Looks up a component by id, mutably.
    pub fn component_mut(&mut self, id: &ComponentId) -> Option<&mut ComponentRecord> {
        self.components.get_mut(id)
    }

    /// Icon cell footprint under the current arrangement.
    pub fn icon_cell(&self) -> Size {
        self.arrangement.icon_size.cell()
    }

    /// Bounding rectangles of all placed, non-exiting icons.
    pub fn icon_rects(&self) -> Vec<Rect> {
        let cell = self.icon_cell();
        self.icons
            .iter()
            .filter(|i| !i.exiting)
            .filter_map(|i| i.rect(cell))
            .collect()
    }

    /// Replaces the icon registry from persisted records and repairs the id counter.
    pub fn hydrate_icons(&mut self, icons: Vec<IconRecord>) {
        self.icons = icons;
        self.next_icon_id = self
            .icons
            .iter()
            .map(|i| i.id.0)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn hydrate_icons_repairs_id_counter() {
        let mut state = DesktopState::default();
        state.hydrate_icons(vec![
            IconRecord {
                id: IconId(3),
                owner_program_ref: "prog.files".to_string(),
                display_name: "Files".to_string(),
                icon_asset_ref: None,
                position: None,
                created_at_unix_ms: 0,
                exiting: false,
            },
            IconRecord {
                id: IconId(9),
                owner_program_ref: "prog.music".to_string(),
                display_name: "Music".to_string(),
                icon_asset_ref: None,
                position: Some(Point::new(20, 20)),
                created_at_unix_ms: 0,
                exiting: false,
            },
        ]);

        assert_eq!(state.next_icon_id, 10);
        assert_eq!(state.icon(IconId(9)).map(|i| i.display_name.as_str()), Some("Music"));
    }

    #[test]
    fn exiting_flag_is_not_serialized() {
        let record = IconRecord {
            id: IconId(1),
            owner_program_ref: "prog.files".to_string(),
            display_name: "Files".to_string(),
            icon_asset_ref: None,
            position: None,
            created_at_unix_ms: 5,
            exiting: true,
        };

        let value = serde_json::to_value(&record).expect("serialize icon");
        assert!(value.get("exiting").is_none());

        let back: IconRecord = serde_json::from_value(value).expect("deserialize icon");
        assert!(!back.exiting);
    }

    #[test]
    fn size_classes_scale_cell_footprint() {
        assert!(IconSizeClass::Small.cell().w < IconSizeClass::Medium.cell().w);
        assert!(IconSizeClass::Medium.cell().w < IconSizeClass::Large.cell().w);
        assert_eq!(IconSizeClass::Medium.cell(), Size::new(80, 96));
    }
}
