//! Standard `javax.validation.constraints` declarations with their
//! statically declared attribute defaults.
use indexmap::IndexMap;

use crate::catalog::ConstraintDef;
use crate::model::{AttributeValue, TypeId};

const PACKAGE: &str = "javax.validation.constraints";

/// `Integer.MAX_VALUE`, the declared upper bound of `@Size`.
const SIZE_MAX: i64 = 2_147_483_647;

enum Extra {
    /// Attribute without a default; every use must set it.
    Required,
    Default(AttributeValue),
}

fn def(simple: &str, extras: Vec<(&str, Extra)>) -> ConstraintDef {
    let name = format!("{PACKAGE}.{simple}");
    let mut attributes = IndexMap::new();
    attributes.insert("message".to_owned(), Some(AttributeValue::Str(format!("{{{name}.message}}"))));
    attributes.insert("groups".to_owned(), Some(AttributeValue::List(Vec::new())));
    attributes.insert("payload".to_owned(), Some(AttributeValue::List(Vec::new())));
    for (attr, extra) in extras {
        let default = match extra {
            Extra::Required => None,
            Extra::Default(value) => Some(value),
        };
        attributes.insert(attr.to_owned(), default);
    }
    ConstraintDef {
        validators: vec![format!("{simple}Validator")],
        name: TypeId::new(name),
        attributes,
        composed_of: Vec::new(),
        report_as_single: false,
    }
}

pub fn standard_constraints() -> Vec<ConstraintDef> {
    use AttributeValue::*;
    use Extra::{Default as D, Required};

    let plain = [
        "NotNull", "Null", "AssertTrue", "AssertFalse", "Past", "Future", "NotEmpty", "NotBlank",
        "Positive", "PositiveOrZero", "Negative", "NegativeOrZero",
    ];
    let mut out: Vec<ConstraintDef> = plain.iter().map(|simple| def(simple, Vec::new())).collect();

    out.push(def("Min", vec![("value", Required)]));
    out.push(def("Max", vec![("value", Required)]));
    out.push(def("DecimalMin", vec![("value", Required), ("inclusive", D(Bool(true)))]));
    out.push(def("DecimalMax", vec![("value", Required), ("inclusive", D(Bool(true)))]));
    out.push(def("Size", vec![("min", D(Int(0))), ("max", D(Int(SIZE_MAX)))]));
    out.push(def("Digits", vec![("integer", Required), ("fraction", Required)]));
    out.push(def("Pattern", vec![("regexp", Required), ("flags", D(List(Vec::new())))]));
    out.push(def("Email", vec![("regexp", D(Str(".*".to_owned()))), ("flags", D(List(Vec::new())))]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_declares_bounds_and_common_attributes() {
        let defs = standard_constraints();
        let size = defs
            .iter()
            .find(|d| d.name.as_str() == "javax.validation.constraints.Size")
            .unwrap();
        let keys: Vec<_> = size.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["message", "groups", "payload", "min", "max"]);
        assert_eq!(size.attributes["max"], Some(AttributeValue::Int(SIZE_MAX)));
        assert_eq!(
            size.attributes["message"],
            Some(AttributeValue::Str("{javax.validation.constraints.Size.message}".into()))
        );
        assert_eq!(size.validators.len(), 1);
    }

    #[test]
    fn pattern_requires_regexp() {
        let defs = standard_constraints();
        let pattern = defs.iter().find(|d| d.name.simple_name() == "Pattern").unwrap();
        assert_eq!(pattern.attributes["regexp"], None);
    }
}
