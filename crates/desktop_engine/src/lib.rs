//! Desktop spatial layout and placement engine.
//!
//! Owns icon and component registries, arrangement layout, drag/click gesture
//! resolution, collision-avoiding component placement, and debounced persistence
//! of the layout through a host-provided key-value store. All state transitions
//! run synchronously through a single reducer; the [`runtime::DesktopRuntime`]
//! wrapper executes the resulting effects against injected
//! [`platform_host::HostServices`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod arrangement;
pub mod coordinator;
pub mod gesture;
pub mod model;
pub mod persistence;
pub mod placement;
pub mod reducer;
pub mod registry;
pub mod runtime;

pub use coordinator::{
    PersistenceCoordinator, MAX_SAVE_ATTEMPTS, RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_MS,
};
pub use gesture::{ClickKind, ReleaseOutcome, DOUBLE_CLICK_WINDOW_MS, DRAG_CLICK_COOLDOWN_MS, DRAG_THRESHOLD};
pub use model::{
    ArrangementMode, ArrangementState, ComponentId, ComponentRecord, CreateComponentRequest,
    CreateIconRequest, DesktopState, GestureSession, GestureTarget, IconId, IconRecord,
    IconSizeClass, InteractionState, LAYOUT_SCHEMA_VERSION,
};
pub use persistence::{BootSnapshot, ARRANGEMENT_STORE_KEY, ICONS_STORE_KEY};
pub use placement::COMPONENT_PADDING;
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
pub use runtime::{DesktopRuntime, ShellSignal, ICON_EXIT_TRANSITION_MS, RESIZE_DEBOUNCE_MS};
