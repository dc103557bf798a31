//! Constraint descriptors: keep what differs from the declared defaults,
//! name class references, recurse into composing rules.
use serde_json::Value;
use tracing::trace;

use super::Describer;
use crate::descriptor::ConstraintDescriptor;
use crate::model::{AttributeValue, TypeId};
use crate::provider::{ConstraintMetadata, MetadataProvider, TypeIntrospector};

impl<S> Describer<'_, S>
where
    S: TypeIntrospector + MetadataProvider + ?Sized,
{
    pub(super) fn process_constraint(&self, meta: &ConstraintMetadata) -> ConstraintDescriptor {
        let mut out = ConstraintDescriptor::new(self.resolver.name_of(&meta.annotation));
        out.report_as_single = meta.report_as_single;

        for (name, value) in &meta.attributes {
            let default = match self.source.attribute_default(&meta.annotation, name) {
                Ok(default) => default,
                Err(error) => {
                    trace!(annotation = %meta.annotation, attribute = %name, %error, "default lookup failed");
                    None
                }
            };
            if default.as_ref() == Some(value) {
                continue;
            }
            if let Some(value) = self.attribute_value(value) {
                out.attributes.insert(name.clone(), value);
            }
        }

        out.composing_constraints = meta.composing.iter().map(|c| self.process_constraint(c)).collect();
        out.has_no_validator = meta.validator_count == 0;
        out
    }

    /// `None` drops the attribute.
    fn attribute_value(&self, value: &AttributeValue) -> Option<Value> {
        match value {
            AttributeValue::List(items) if items.is_empty() => None,
            AttributeValue::List(items) => {
                let classes: Option<Vec<&TypeId>> = items.iter().map(AttributeValue::as_class).collect();
                let Some(classes) = classes else {
                    return Some(value.to_json());
                };
                // `groups = {Default.class}` is the same as not assigning groups
                if let [only] = classes.as_slice() {
                    if **only == self.options.default_group {
                        return None;
                    }
                }
                Some(Value::Array(classes.iter().map(|c| self.resolver.name_of(c).to_json()).collect()))
            }
            AttributeValue::Class { class } => Some(self.resolver.name_of(class).to_json()),
            other => Some(other.to_json()),
        }
    }
}
