// /form.rs
use crate::derived::update_derived;
use crate::record::CharacterRecord;
use crate::schema::FieldSchema;

use std::collections::HashMap;

/// A set of input controls the form is rendered into.
///
/// Controls are addressed by schema field id. A view may lack a control for
/// some field: reads then yield `None` and writes are ignored.
pub trait FormView {
    fn read(&self, id: &str) -> Option<String>;
    // Returns false when there is no control for `id`.
    fn write(&mut self, id: &str, value: &str) -> bool;
}

// Headless view, a plain map of control id to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryView {
    controls: HashMap<String, String>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_schema(schema: &FieldSchema) -> Self {
        Self::with_controls(schema.fields().iter().copied())
    }

    pub fn with_controls<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            controls: ids
                .into_iter()
                .map(|id| (id.to_string(), String::new()))
                .collect(),
        }
    }

    // Adds an extra control the schema knows nothing about.
    pub fn add_control(&mut self, id: &str, value: &str) {
        self.controls.insert(id.to_string(), value.to_string());
    }

    pub fn remove_control(&mut self, id: &str) {
        self.controls.remove(id);
    }
}

impl FormView for MemoryView {
    fn read(&self, id: &str) -> Option<String> {
        self.controls.get(id).cloned()
    }

    fn write(&mut self, id: &str, value: &str) -> bool {
        match self.controls.get_mut(id) {
            Some(control) => {
                value.clone_into(control);
                true
            }
            None => false,
        }
    }
}

/// Binds a [`CharacterRecord`] to a [`FormView`].
///
/// The record is the source of truth. Every change goes through the form,
/// which then mirrors the touched fields into the view.
#[derive(Debug)]
pub struct Form<V: FormView> {
    schema: FieldSchema,
    record: CharacterRecord,
    view: V,
}

impl<V: FormView> Form<V> {
    pub fn new(schema: FieldSchema, view: V) -> Self {
        let record = CharacterRecord::empty(&schema);
        let mut form = Self {
            schema,
            record,
            view,
        };
        form.apply(&CharacterRecord::empty(&form.schema));
        form
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn record(&self) -> &CharacterRecord {
        &self.record
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Snapshot of every schema field.
    pub fn collect(&self) -> CharacterRecord {
        self.record.clone()
    }

    /// Replaces every schema field with the value from `record` (empty when
    /// absent), then recomputes derived fields. Controls outside the schema
    /// are left alone.
    pub fn apply(&mut self, record: &CharacterRecord) {
        for field in self.schema.fields() {
            let value = record.get(field);
            self.record.set(field, value);
            self.view.write(field, value);
        }
        self.update_derived();
    }

    // Handles a user edit of one field. Unknown fields are ignored.
    pub fn input(&mut self, field: &str, value: &str) -> bool {
        let Some(field) = self.schema.field(field) else {
            log::debug!("Ignoring input for unknown field {field}");
            return false;
        };
        self.record.set(field, value);
        self.view.write(field, value);
        if self.schema.is_reactive(field) {
            self.update_derived();
        }
        true
    }

    pub fn update_derived(&mut self) {
        for field in update_derived(&self.schema, &mut self.record) {
            self.view.write(field, self.record.get(field));
        }
    }
}
