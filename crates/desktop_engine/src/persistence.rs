//! Wire codec between the icon/arrangement registries and the host key-value store.
//!
//! Icons and arrangement persist under independent keys so a corrupt arrangement
//! envelope cannot take the icon registry down with it. Decoding is lenient:
//! individual malformed icon records are skipped with a warning rather than
//! discarding the whole snapshot.

use platform_host::{
    build_envelope, decode_envelope_payload, KeyValueStore, LayoutEnvelope, StoreError,
};

use crate::model::{ArrangementState, DesktopState, IconRecord, LAYOUT_SCHEMA_VERSION};

/// Store key for the icon registry snapshot.
pub const ICONS_STORE_KEY: &str = "desktop.icons.v1";
/// Store key for the arrangement configuration.
pub const ARRANGEMENT_STORE_KEY: &str = "desktop.arrangement.v1";

/// Builds the icon-registry envelope from current state.
///
/// Icons mid-exit are excluded; a snapshot taken during an exit transition must
/// not resurrect the icon on the next boot.
pub fn encode_icons(state: &DesktopState) -> Result<LayoutEnvelope, StoreError> {
    let records: Vec<&IconRecord> = state.icons.iter().filter(|i| !i.exiting).collect();
    build_envelope(ICONS_STORE_KEY, LAYOUT_SCHEMA_VERSION, &records)
}

/// Builds the arrangement envelope from current state.
pub fn encode_arrangement(state: &DesktopState) -> Result<LayoutEnvelope, StoreError> {
    build_envelope(
        ARRANGEMENT_STORE_KEY,
        LAYOUT_SCHEMA_VERSION,
        &state.arrangement,
    )
}

/// Number of live (non-exiting) icons a freshly written snapshot should contain.
pub fn persistable_icon_count(state: &DesktopState) -> usize {
    state.icons.iter().filter(|i| !i.exiting).count()
}

/// Decodes an icon-registry envelope, skipping malformed records.
pub fn decode_icons(envelope: &LayoutEnvelope) -> Option<Vec<IconRecord>> {
    if envelope.schema_version != LAYOUT_SCHEMA_VERSION {
        log::warn!(
            "discarding icon snapshot with unsupported schema version {}",
            envelope.schema_version
        );
        return None;
    }
    let raw: Vec<serde_json::Value> = match decode_envelope_payload(envelope) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("discarding unreadable icon snapshot: {err}");
            return None;
        }
    };
    let total = raw.len();
    let records: Vec<IconRecord> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("skipping malformed icon record: {err}");
                None
            }
        })
        .collect();
    if records.len() < total {
        log::warn!(
            "loaded {} of {} persisted icon records",
            records.len(),
            total
        );
    }
    Some(records)
}

/// Decodes the arrangement envelope, falling back to `None` on any mismatch.
pub fn decode_arrangement(envelope: &LayoutEnvelope) -> Option<ArrangementState> {
    if envelope.schema_version != LAYOUT_SCHEMA_VERSION {
        log::warn!(
            "discarding arrangement snapshot with unsupported schema version {}",
            envelope.schema_version
        );
        return None;
    }
    match decode_envelope_payload(envelope) {
        Ok(arrangement) => Some(arrangement),
        Err(err) => {
            log::warn!("discarding unreadable arrangement snapshot: {err}");
            None
        }
    }
}

/// Everything the boot load recovered; absent parts fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootSnapshot {
    /// Persisted icon registry, if a usable snapshot existed.
    pub icons: Option<Vec<IconRecord>>,
    /// Persisted arrangement configuration, if a usable snapshot existed.
    pub arrangement: Option<ArrangementState>,
}

/// Loads both snapshots from the store at boot. Every failure path degrades to
/// an empty desktop with default arrangement rather than an error.
pub async fn load_boot_snapshot(store: &dyn KeyValueStore) -> BootSnapshot {
    let icons = match store.get(ICONS_STORE_KEY).await {
        Ok(Some(envelope)) => decode_icons(&envelope),
        Ok(None) => None,
        Err(err) => {
            log::warn!("icon snapshot unavailable at boot: {err}");
            None
        }
    };
    let arrangement = match store.get(ARRANGEMENT_STORE_KEY).await {
        Ok(Some(envelope)) => decode_arrangement(&envelope),
        Ok(None) => None,
        Err(err) => {
            log::warn!("arrangement snapshot unavailable at boot: {err}");
            None
        }
    };
    BootSnapshot { icons, arrangement }
}
