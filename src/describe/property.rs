use super::Describer;
use crate::descriptor::PropertyDescriptor;
use crate::error::DescribeError;
use crate::model::{FieldInfo, TypeId};
use crate::provider::{MetadataProvider, PropertyMetadata, TypeIntrospector};

impl<S> Describer<'_, S>
where
    S: TypeIntrospector + MetadataProvider + ?Sized,
{
    /// Describe one member. Members the validation metadata never mentions
    /// still get a descriptor carrying their type name.
    pub(super) fn process_property(
        &mut self,
        owner: &TypeId,
        field: &FieldInfo,
        meta: Option<&PropertyMetadata>,
    ) -> Result<PropertyDescriptor, DescribeError> {
        let context = format!("{owner}.{}", field.name);
        let type_name = self.resolver.resolve(&field.ty, &context, &mut self.pending)?;
        let mut out = PropertyDescriptor::new(type_name);
        let Some(meta) = meta else {
            return Ok(out);
        };

        out.cascade = meta.cascaded;
        out.constraints = meta.constraints.iter().map(|c| self.process_constraint(c)).collect();
        for conversion in &meta.group_conversions {
            out.group_conversions.insert(group_name(&conversion.from), group_name(&conversion.to));
        }
        Ok(out)
    }
}

fn group_name(group: &TypeId) -> String {
    group.simple_name().to_owned()
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use crate::describe::describe_one;
    use crate::model::TypeId;
    use crate::options::DescribeOptions;
    use serde_json::json;

    #[test]
    fn cascade_and_group_conversions() {
        let mut catalog = Catalog::with_builtin_constraints();
        catalog
            .merge_value(json!({ "types": [
                { "name": "o.Order", "fields": [
                    { "name": "customer", "type": "o.Customer", "cascade": true,
                      "groupConversions": [{ "from": "javax.validation.groups.Default", "to": "o.groups.Checkout" }] },
                    { "name": "ref", "type": "java.lang.String" }
                ] },
                { "name": "o.Customer" }
            ] }))
            .unwrap();
        let out = describe_one(&catalog, TypeId::from("o.Order"), &DescribeOptions::default()).unwrap();
        let customer = &out[0].properties["customer"];
        assert!(customer.cascade);
        assert!(customer.constraints.is_empty());
        assert_eq!(customer.group_conversions["Default"], "Checkout");
        assert_eq!(
            serde_json::to_value(&out[0].properties["ref"]).unwrap(),
            json!({ "typeName": "String" })
        );
    }

    #[test]
    fn nested_classes_use_their_member_names() {
        let mut catalog = Catalog::with_builtin_constraints();
        catalog
            .merge_value(json!({ "types": [
                { "name": "o.Order", "fields": [
                    { "name": "line", "type": "o.Order$Line", "cascade": true,
                      "groupConversions": [{ "from": "javax.validation.groups.Default", "to": "o.Order$Checkout" }] }
                ] },
                { "name": "o.Order$Line" }
            ] }))
            .unwrap();
        let out = describe_one(&catalog, TypeId::from("o.Order"), &DescribeOptions::default()).unwrap();
        let line = &out[0].properties["line"];
        assert_eq!(serde_json::to_value(&line.type_name).unwrap(), json!("Line"));
        assert_eq!(
            serde_json::to_value(&line.group_conversions).unwrap(),
            json!({ "Default": "Checkout" })
        );
        assert_eq!(out[1].type_name.to_string(), "Line");
    }
}
