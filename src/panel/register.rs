//! Register value synchronization.
//!
//! One [`RegisterModel`] owns the authoritative 64-bit full value of a
//! register plus a slot per configured field. Loads fan the full value out
//! to every slot; a field edit merges back into the full value and re-syncs
//! only the edited slot. Derived updates reach the presentation layer as
//! [`SyncEvent`]s tagged [`SyncOrigin::Programmatic`], so an observer that
//! mirrors values into widgets can tell its own echo apart from a real user
//! edit without detaching anything. Editing a slot to the value it already
//! holds is a no-op, which breaks any echo cycle a widget layer could
//! otherwise produce.

use crate::panel::bits;
use crate::panel::field::FieldDescriptor;

/// Who caused a value notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOrigin {
    /// A person typed/selected this; only the observer layer produces it.
    UserEdit,
    /// Derived by the synchronizer from a load or another field's edit.
    Programmatic,
}

/// Value-changed notification keyed by field identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    FullValue {
        value: u64,
        origin: SyncOrigin,
    },
    FieldValue {
        field: usize,
        value: u64,
        origin: SyncOrigin,
    },
    Selection {
        field: usize,
        selected: usize,
        origin: SyncOrigin,
    },
}

/// Receiver for synchronization events.
pub trait PanelObserver {
    fn on_event(&mut self, event: SyncEvent);
}

/// Observer that drops everything; used when nobody is bound yet.
impl PanelObserver for () {
    fn on_event(&mut self, _event: SyncEvent) {}
}

/// Runtime depiction of a field slot. The numeric `value` on the slot is
/// always authoritative; `Choice` additionally tracks which display row is
/// selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depiction {
    Label,
    Digit,
    Choice { selected: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct FieldSlot {
    descriptor: FieldDescriptor,
    value: u64,
    depiction: Depiction,
}

impl FieldSlot {
    fn new(descriptor: FieldDescriptor) -> Self {
        let depiction = if descriptor.kind().is_enumerable() {
            Depiction::Choice { selected: None }
        } else if descriptor.kind().is_label() {
            Depiction::Label
        } else {
            Depiction::Digit
        };
        Self {
            descriptor,
            value: 0,
            depiction,
        }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn depiction(&self) -> Depiction {
        self.depiction
    }

    /// Selected display row for `Choice` slots.
    pub fn selected(&self) -> Option<usize> {
        match self.depiction {
            Depiction::Choice { selected } => selected,
            _ => None,
        }
    }
}

/// Result of [`RegisterModel::edit_field`]. Rejections are local and leave
/// the model untouched; the caller decides whether to surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied { full: u64 },
    Unchanged,
    RejectedOutOfRange { max: u64 },
    RejectedReadOnly,
    UnknownField,
}

/// One register instance: full value, default value, and field slots.
#[derive(Debug, Clone)]
pub struct RegisterModel {
    key: String,
    address: Option<u64>,
    default_value: u64,
    full: u64,
    slots: Vec<FieldSlot>,
}

impl RegisterModel {
    pub fn new(
        key: impl Into<String>,
        address: Option<u64>,
        descriptors: Vec<FieldDescriptor>,
        default_value: u64,
    ) -> Self {
        let mut model = Self {
            key: key.into(),
            address,
            default_value,
            full: 0,
            slots: descriptors.into_iter().map(FieldSlot::new).collect(),
        };
        model.load_full(default_value, &mut ());
        model
    }

    /// Register key as written in the configuration.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Numeric address, when the key parses as one.
    pub fn address(&self) -> Option<u64> {
        self.address
    }

    pub fn default_value(&self) -> u64 {
        self.default_value
    }

    pub fn full_value(&self) -> u64 {
        self.full
    }

    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn field_value(&self, index: usize) -> Option<u64> {
        self.slots.get(index).map(FieldSlot::value)
    }

    /// Replaces the full value and re-derives every field slot.
    pub fn load_full(&mut self, value: u64, observer: &mut dyn PanelObserver) {
        self.full = value;
        observer.on_event(SyncEvent::FullValue {
            value,
            origin: SyncOrigin::Programmatic,
        });
        for index in 0..self.slots.len() {
            let range = self.slots[index].descriptor.range();
            let field_value = bits::extract(value, range.high(), range.low());
            self.slots[index].value = field_value;
            observer.on_event(SyncEvent::FieldValue {
                field: index,
                value: field_value,
                origin: SyncOrigin::Programmatic,
            });
            self.sync_depiction(index, observer);
        }
    }

    /// Applies one field edit: merges the value into the full value, stores
    /// it on the edited slot, and re-syncs that slot's depiction. Sibling
    /// slots stay untouched; the merge only alters bits inside the edited
    /// range, so they remain consistent by construction.
    pub fn edit_field(
        &mut self,
        index: usize,
        value: u64,
        observer: &mut dyn PanelObserver,
    ) -> EditOutcome {
        let Some(slot) = self.slots.get(index) else {
            return EditOutcome::UnknownField;
        };
        if slot.descriptor.is_read_only() {
            return EditOutcome::RejectedReadOnly;
        }
        let max = slot.descriptor.max_value();
        if value > max {
            return EditOutcome::RejectedOutOfRange { max };
        }
        if value == slot.value {
            return EditOutcome::Unchanged;
        }

        let range = slot.descriptor.range();
        self.full = bits::merge(self.full, range.high(), range.low(), value);
        self.slots[index].value = value;
        observer.on_event(SyncEvent::FullValue {
            value: self.full,
            origin: SyncOrigin::Programmatic,
        });
        observer.on_event(SyncEvent::FieldValue {
            field: index,
            value,
            origin: SyncOrigin::Programmatic,
        });
        self.sync_depiction(index, observer);
        EditOutcome::Applied { full: self.full }
    }

    /// Re-selects the display row of a `Choice` slot from its stored value.
    /// A value with no table entry selects the bad-value slot when one
    /// exists; otherwise the selection is left alone, since the numeric
    /// storage stays authoritative.
    fn sync_depiction(&mut self, index: usize, observer: &mut dyn PanelObserver) {
        let slot = &self.slots[index];
        if !slot.descriptor.kind().is_enumerable() {
            return;
        }
        let Some(table) = slot.descriptor.enum_table() else {
            return;
        };
        let Some(target) = table.lookup(slot.value) else {
            return;
        };
        let Depiction::Choice { selected } = slot.depiction else {
            return;
        };
        if selected == Some(target) {
            return;
        }
        self.slots[index].depiction = Depiction::Choice {
            selected: Some(target),
        };
        observer.on_event(SyncEvent::Selection {
            field: index,
            selected: target,
            origin: SyncOrigin::Programmatic,
        });
    }
}
