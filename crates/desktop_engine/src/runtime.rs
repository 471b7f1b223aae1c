//! Runtime shell around the reducer: effect execution, timers, and surface signals.
//!
//! [`DesktopRuntime`] owns the shared state cell, routes every mutation through
//! [`reduce_desktop`], and executes the returned effects against the injected
//! [`HostServices`]. It is the only place where reducer output touches timers,
//! the store, or the embedding surface.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use platform_host::{unix_time_ms_now, HostServices, ProcessId, TimerId};
use surface_contract::{PointerPosition, RenderTarget, RenderTargetId, Size};

use crate::{
    coordinator::PersistenceCoordinator,
    model::{
        ArrangementMode, ComponentId, CreateComponentRequest, CreateIconRequest, DesktopState,
        GestureTarget, IconId, IconSizeClass, InteractionState,
    },
    persistence,
    reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect},
};

/// Quiet period after the last container-resize notification before re-layout runs.
pub const RESIZE_DEBOUNCE_MS: u64 = 150;
/// Duration of the icon exit transition before the record is dropped.
pub const ICON_EXIT_TRANSITION_MS: u64 = 200;

/// Interaction outcomes surfaced to the embedding shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellSignal {
    /// An icon received a single click (select it).
    IconClicked(IconId),
    /// An icon was double-clicked (launch its program).
    IconActivated(IconId),
    /// A component received a click (focus it).
    ComponentClicked(ComponentId),
}

struct RuntimeInner {
    services: HostServices,
    state: Rc<RefCell<DesktopState>>,
    interaction: RefCell<InteractionState>,
    coordinator: PersistenceCoordinator,
    resize_timer: Cell<Option<TimerId>>,
    pending_resize: Cell<Option<Size>>,
    signals: RefCell<Vec<ShellSignal>>,
}

/// The engine's public entry point; clone-cheap handle over shared state.
#[derive(Clone)]
pub struct DesktopRuntime {
    inner: Rc<RuntimeInner>,
}

impl DesktopRuntime {
    /// Builds a runtime over the given host services with an empty desktop.
    pub fn new(services: HostServices) -> Self {
        let state = Rc::new(RefCell::new(DesktopState::default()));
        let coordinator = PersistenceCoordinator::new(
            services.store.clone(),
            services.scheduler.clone(),
            services.spawner.clone(),
            state.clone(),
        );
        Self {
            inner: Rc::new(RuntimeInner {
                services,
                state,
                interaction: RefCell::new(InteractionState::default()),
                coordinator,
                resize_timer: Cell::new(None),
                pending_resize: Cell::new(None),
                signals: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Loads persisted icons and arrangement from the store, if any.
    ///
    /// Call once at boot, before the first render. Failures degrade to an empty
    /// desktop with default arrangement and never propagate.
    pub async fn hydrate(&self) {
        let snapshot = persistence::load_boot_snapshot(self.inner.services.store.as_ref()).await;
        if snapshot == persistence::BootSnapshot::default() {
            return;
        }
        let _ = self.dispatch(DesktopAction::HydrateLayout {
            icons: snapshot.icons.unwrap_or_default(),
            arrangement: snapshot.arrangement,
        });
    }

    /// Routes an action through the reducer and executes its effects.
    pub fn dispatch(&self, action: DesktopAction) -> Result<(), ReducerError> {
        let effects = {
            let mut state = self.inner.state.borrow_mut();
            let mut interaction = self.inner.interaction.borrow_mut();
            reduce_desktop(&mut state, &mut interaction, action)?
        };
        self.run_effects(effects);
        Ok(())
    }

    fn run_effects(&self, effects: Vec<RuntimeEffect>) {
        let mut persist = false;
        for effect in effects {
            match effect {
                RuntimeEffect::PersistLayout | RuntimeEffect::PersistArrangement => {
                    persist = true;
                }
                RuntimeEffect::ScheduleIconFinalize(icon_id) => {
                    let this = self.clone();
                    self.inner.services.scheduler.schedule(
                        ICON_EXIT_TRANSITION_MS,
                        Box::new(move || {
                            // Finalize is lenient; hydration may have replaced the
                            // registry while the transition ran.
                            let _ = this.dispatch(DesktopAction::FinalizeIconRemoval { icon_id });
                        }),
                    );
                }
                RuntimeEffect::IconClicked(icon_id) => {
                    self.inner
                        .signals
                        .borrow_mut()
                        .push(ShellSignal::IconClicked(icon_id));
                }
                RuntimeEffect::IconActivated(icon_id) => {
                    self.inner
                        .signals
                        .borrow_mut()
                        .push(ShellSignal::IconActivated(icon_id));
                }
                RuntimeEffect::ComponentClicked(component_id) => {
                    self.inner
                        .signals
                        .borrow_mut()
                        .push(ShellSignal::ComponentClicked(component_id));
                }
            }
        }
        if persist {
            self.inner.coordinator.save();
        }
    }

    /// Registers a shortcut icon and returns its id.
    pub fn add_icon(&self, request: CreateIconRequest) -> Result<IconId, ReducerError> {
        let icon_id = IconId(self.inner.state.borrow().next_icon_id);
        self.dispatch(DesktopAction::AddIcon {
            request,
            at_ms: unix_time_ms_now(),
        })?;
        Ok(icon_id)
    }

    /// Starts an icon's exit transition; the record drops once it finishes.
    pub fn remove_icon(&self, icon_id: IconId) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::RemoveIcon { icon_id })
    }

    /// Renames an icon.
    pub fn rename_icon(&self, icon_id: IconId, display_name: String) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::RenameIcon {
            icon_id,
            display_name,
        })
    }

    /// Switches the arrangement mode.
    pub fn set_arrangement_mode(&self, mode: ArrangementMode) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::SetArrangementMode { mode })
    }

    /// Changes the icon size class.
    pub fn set_icon_size(&self, icon_size: IconSizeClass) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::SetIconSize { icon_size })
    }

    /// Toggles auto-arrange.
    pub fn set_auto_arrange(&self, enabled: bool) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::SetAutoArrange { enabled })
    }

    /// Changes inter-icon spacing. Negative values are ignored.
    pub fn set_spacing(&self, spacing: i32) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::SetSpacing { spacing })
    }

    /// Pointer pressed on a tracked target.
    pub fn pointer_down(
        &self,
        target: GestureTarget,
        pointer: PointerPosition,
    ) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::PointerDown { target, pointer })
    }

    /// Pointer moved.
    pub fn pointer_move(&self, pointer: PointerPosition) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::PointerMove { pointer })
    }

    /// Pointer released; timestamps come from the injected scheduler clock.
    pub fn pointer_up(&self, pointer: PointerPosition) -> Result<(), ReducerError> {
        let at_ms = self.inner.services.scheduler.now_ms();
        self.dispatch(DesktopAction::PointerUp { pointer, at_ms })
    }

    /// Closes the active gesture without a commit.
    pub fn cancel_gesture(&self) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::CancelGesture)
    }

    /// Creates a component for a live owner process.
    pub fn create_component(
        &self,
        request: CreateComponentRequest,
    ) -> Result<ComponentId, ReducerError> {
        if !self.inner.services.processes.is_live(request.owner_pid) {
            return Err(ReducerError::DeadOwner(request.owner_pid));
        }
        let component_id = ComponentId::new(request.id.clone());
        self.dispatch(DesktopAction::CreateComponent {
            request,
            at_ms: unix_time_ms_now(),
        })?;
        Ok(component_id)
    }

    /// Destroys one component.
    pub fn remove_component(&self, component_id: ComponentId) -> Result<(), ReducerError> {
        self.dispatch(DesktopAction::RemoveComponent { component_id })
    }

    /// Purges the non-persistent components of a terminated process.
    pub fn handle_process_terminated(&self, owner_pid: ProcessId) {
        let _ = self.dispatch(DesktopAction::OwnerTerminated { owner_pid });
    }

    /// Records a container resize, debounced so only the settled size re-lays out.
    pub fn notify_container_resized(&self, container: Size) {
        self.inner.pending_resize.set(Some(container));
        if let Some(timer) = self.inner.resize_timer.take() {
            self.inner.services.scheduler.cancel(timer);
        }
        let this = self.clone();
        let timer = self.inner.services.scheduler.schedule(
            RESIZE_DEBOUNCE_MS,
            Box::new(move || {
                this.inner.resize_timer.set(None);
                if let Some(container) = this.inner.pending_resize.take() {
                    let _ = this.dispatch(DesktopAction::ContainerResized { container });
                }
            }),
        );
        self.inner.resize_timer.set(Some(timer));
    }

    /// Saves immediately, cancelling any retry backoff (shutdown path).
    pub fn force_save(&self) {
        self.inner.coordinator.force_save();
    }

    /// Drains the shell signals produced since the last call.
    pub fn take_signals(&self) -> Vec<ShellSignal> {
        std::mem::take(&mut self.inner.signals.borrow_mut())
    }

    /// Positioned rectangles for everything the surface should draw.
    ///
    /// Exiting icons are still included so the surface can run their exit
    /// transition; icons without a position yet are skipped.
    pub fn render_targets(&self) -> Vec<RenderTarget> {
        let state = self.inner.state.borrow();
        let cell = state.icon_cell();
        let mut targets: Vec<RenderTarget> = state
            .icons
            .iter()
            .filter_map(|icon| {
                icon.rect(cell).map(|rect| RenderTarget {
                    id: RenderTargetId::Icon(icon.id.0),
                    rect,
                })
            })
            .collect();
        targets.extend(state.components.values().map(|component| RenderTarget {
            id: RenderTargetId::Component(component.id.as_str().to_string()),
            rect: component.rect(),
        }));
        targets
    }

    /// Read-only access to the engine state.
    pub fn with_state<R>(&self, f: impl FnOnce(&DesktopState) -> R) -> R {
        f(&self.inner.state.borrow())
    }
}
