//! Resource form controller
//!
//! Drives the create/edit screen of any descriptor-backed resource: raw
//! input parsing, local validation, the save round-trip and the status
//! banner shown after it.

use crate::fetch::{ApiClient, FetchError};
use crate::resource::{FieldErrors, Resource, ResourceDescriptor};

/// Banner shown above the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStatus {
    pub is_valid: bool,
    pub msg: String,
}

impl FormStatus {
    fn success(msg: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            msg: msg.into(),
        }
    }

    fn failure(msg: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            msg: msg.into(),
        }
    }
}

/// What the screen should do after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Stay,
    Navigate(String),
}

impl FormOutcome {
    pub fn navigate_to(&self) -> Option<&str> {
        match self {
            FormOutcome::Navigate(route) => Some(route),
            FormOutcome::Stay => None,
        }
    }
}

/// Form state for one resource
#[derive(Debug)]
pub struct ResourceForm<'a> {
    descriptor: &'a ResourceDescriptor,
    resource: Resource,
    /// Inline errors on display
    errors: FieldErrors,
    /// Input that could not be parsed; blocks submission until corrected
    parse_errors: FieldErrors,
    status: Option<FormStatus>,
    submitting: bool,
}

impl<'a> ResourceForm<'a> {
    /// Empty form for a new resource
    pub fn create(descriptor: &'a ResourceDescriptor) -> Self {
        Self::edit(descriptor, Resource::draft())
    }

    /// Form pre-filled with an existing resource
    pub fn edit(descriptor: &'a ResourceDescriptor, resource: Resource) -> Self {
        Self {
            descriptor,
            resource,
            errors: FieldErrors::new(),
            parse_errors: FieldErrors::new(),
            status: None,
            submitting: false,
        }
    }

    pub fn title(&self) -> String {
        self.descriptor.form_title(Some(&self.resource))
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> Option<&FormStatus> {
        self.status.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Parse raw input into the resource
    ///
    /// Returns false and records an inline error when the input does not
    /// fit the field's kind; the previous value is kept in that case.
    pub fn set_field(&mut self, name: &str, raw: &str) -> bool {
        match self.descriptor.parse_field(name, raw) {
            Ok(value) => {
                self.resource.set(name, value);
                self.parse_errors.remove(name);
                self.errors.remove(name);
                true
            }
            Err(message) => {
                self.parse_errors.insert(name.to_string(), message.clone());
                self.errors.insert(name.to_string(), message);
                false
            }
        }
    }

    /// Validate and save
    ///
    /// Violations reported by a previous attempt are replaced by the result
    /// of this one.
    pub async fn submit(&mut self, client: &ApiClient) -> FormOutcome {
        let mut errors = self.descriptor.validate(&self.resource);
        for (field, message) in &self.parse_errors {
            errors.entry(field.clone()).or_insert_with(|| message.clone());
        }
        if !errors.is_empty() {
            tracing::debug!(
                resource = self.descriptor.name,
                fields = errors.len(),
                "Form rejected locally"
            );
            self.errors = errors;
            return FormOutcome::Stay;
        }

        let created = !self.resource.is_persisted();
        self.submitting = true;
        self.status = None;
        let result = client.save(self.descriptor, &self.resource).await;
        self.submitting = false;

        match result {
            Ok(response) => {
                self.resource = response.data;
                self.errors.clear();
                self.status = Some(FormStatus::success(if created {
                    "Element created."
                } else {
                    "Element updated."
                }));
                FormOutcome::Navigate(self.descriptor.list_route())
            }
            Err(e) => {
                self.reject(&e);
                FormOutcome::Stay
            }
        }
    }

    /// Delete the edited resource
    pub async fn delete(&mut self, client: &ApiClient) -> FormOutcome {
        let Some(iri) = self.resource.iri().map(str::to_string) else {
            return FormOutcome::Stay;
        };

        self.submitting = true;
        let result = client.delete(self.descriptor, &iri).await;
        self.submitting = false;

        match result {
            Ok(()) => FormOutcome::Navigate(self.descriptor.list_route()),
            Err(e) => {
                tracing::error!(resource = self.descriptor.name, id = %iri, error = %e, "Delete failed");
                self.status = Some(FormStatus::failure(format!(
                    "Error when deleting the resource: {}",
                    e
                )));
                FormOutcome::Stay
            }
        }
    }

    fn reject(&mut self, error: &FetchError) {
        self.errors = error.fields().cloned().unwrap_or_default();
        self.status = Some(FormStatus::failure(error.to_string()));
    }
}
