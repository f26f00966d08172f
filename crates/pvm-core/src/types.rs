//! Type descriptors: the compile-time and run-time notion of a type.
//!
//! Mirrors the `Type` enum in the teacher's `crates/compiler/src/types.rs`
//! (structural `PartialEq`, a pretty-printing `Display` impl, small builder
//! helpers) but with the arms spec.md requires: the seven value kinds plus
//! `any`, rather than the teacher's stack-effect-oriented arms.

use std::fmt;
use std::rc::Rc;

/// A function/closure argument descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgType {
    pub name: Option<String>,
    pub ty: Rc<TypeDesc>,
    /// Has a default initializer.
    pub optional: bool,
    /// Final argument, collects the rest of the positional actuals.
    pub vararg: bool,
}

/// A named field in a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    pub ty: Rc<TypeDesc>,
}

/// The bound of a sized array type: either a constant element count or a
/// constant size-in-bits, determined once the bound expression is constant.
/// An array type with no bound present (`None` in `TypeDesc::Array::bound`)
/// is unsized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayBound {
    /// Bound not known at this point to be a compile-time constant (a
    /// runtime expression). Never itself compares equal by value.
    Dynamic,
    Count(u64),
    SizeBits(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDesc {
    Int { width: u8 },
    UInt { width: u8 },
    Long { width: u8 },
    ULong { width: u8 },
    String,
    Array {
        elem: Rc<TypeDesc>,
        bound: Option<ArrayBound>,
    },
    Struct {
        name: Option<String>,
        fields: Vec<FieldType>,
    },
    Type,
    Offset {
        base: Rc<TypeDesc>,
        unit: u64,
    },
    Closure {
        return_type: Rc<TypeDesc>,
        args: Vec<ArgType>,
    },
    /// The universal top type, used for variadic arguments and generic
    /// containers. Equals itself only in structural equality; promotion
    /// compatibility with any other type is a separate rule (see
    /// `pkl_compiler::typecheck::functions::is_assignment_compatible`).
    Any,
    /// The absence of a return value. Not one of the seven value kinds
    /// (spec.md section 3.1) — never instantiated as a `Value` — but a
    /// closure's declared return type must be representable as *some*
    /// `TypeDesc`, so a void-returning function's `Closure.return_type`
    /// is this arm.
    Void,
}

impl TypeDesc {
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TypeDesc::Int { .. } | TypeDesc::UInt { .. } | TypeDesc::Long { .. } | TypeDesc::ULong { .. }
        )
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, TypeDesc::Int { .. } | TypeDesc::Long { .. })
    }

    /// Width in bits, meaningful only for integral types.
    pub fn integral_width(&self) -> Option<u8> {
        match self {
            TypeDesc::Int { width }
            | TypeDesc::UInt { width }
            | TypeDesc::Long { width }
            | TypeDesc::ULong { width } => Some(*width),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeDesc::String)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDesc::Array { .. })
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, TypeDesc::Struct { .. })
    }

    pub fn is_offset(&self) -> bool {
        matches!(self, TypeDesc::Offset { .. })
    }

    pub fn is_closure(&self) -> bool {
        matches!(self, TypeDesc::Closure { .. })
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeDesc::Any)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDesc::Void)
    }

    /// Build an integral type of the given signedness/width, choosing the
    /// Int/Long split at width 32 per spec.md section 3.1.
    pub fn integral(signed: bool, width: u8) -> TypeDesc {
        match (signed, width <= 32) {
            (true, true) => TypeDesc::Int { width },
            (true, false) => TypeDesc::Long { width },
            (false, true) => TypeDesc::UInt { width },
            (false, false) => TypeDesc::ULong { width },
        }
    }

    /// `int<32>`, the boolean representation used throughout the type
    /// inference pass.
    pub fn bool_result() -> TypeDesc {
        TypeDesc::Int { width: 32 }
    }

    pub fn uint64() -> TypeDesc {
        TypeDesc::UInt { width: 64 }
    }

    /// `offset<uint<64>, unit>`.
    pub fn offset_uint64(unit: u64) -> TypeDesc {
        TypeDesc::Offset {
            base: Rc::new(TypeDesc::uint64()),
            unit,
        }
    }

    /// Structural equality per spec.md section 3.4. Array/closure/struct
    /// equality recurses into the same rule; array bounds only compare
    /// equal when both sides are constant and equal in value, matching
    /// "bounds are compared by value only when both are constant".
    pub fn structurally_equal(&self, other: &TypeDesc) -> bool {
        use TypeDesc::*;
        match (self, other) {
            (Int { width: w1 }, Int { width: w2 }) => w1 == w2,
            (UInt { width: w1 }, UInt { width: w2 }) => w1 == w2,
            (Long { width: w1 }, Long { width: w2 }) => w1 == w2,
            (ULong { width: w1 }, ULong { width: w2 }) => w1 == w2,
            (String, String) => true,
            (
                Array { elem: e1, bound: b1 },
                Array { elem: e2, bound: b2 },
            ) => {
                if !e1.structurally_equal(e2) {
                    return false;
                }
                match (b1, b2) {
                    (Some(ArrayBound::Count(a)), Some(ArrayBound::Count(b))) => a == b,
                    (Some(ArrayBound::SizeBits(a)), Some(ArrayBound::SizeBits(b))) => a == b,
                    // Dynamic bounds, absent bounds, or mismatched bound
                    // kinds are never compared by value.
                    _ => true,
                }
            }
            (
                Struct { fields: f1, .. },
                Struct { fields: f2, .. },
            ) => {
                f1.len() == f2.len()
                    && f1
                        .iter()
                        .zip(f2.iter())
                        .all(|(a, b)| a.name == b.name && a.ty.structurally_equal(&b.ty))
            }
            (Type, Type) => true,
            (Offset { base: b1, unit: u1 }, Offset { base: b2, unit: u2 }) => {
                u1 == u2 && b1.structurally_equal(b2)
            }
            (
                Closure { return_type: r1, args: a1 },
                Closure { return_type: r2, args: a2 },
            ) => {
                r1.structurally_equal(r2)
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2.iter()).all(|(x, y)| x.ty.structurally_equal(&y.ty))
            }
            (Any, Any) => true,
            (Void, Void) => true,
            _ => false,
        }
    }

    /// Size-completeness per spec.md section 3.4.
    pub fn is_complete(&self) -> bool {
        match self {
            TypeDesc::Int { .. }
            | TypeDesc::UInt { .. }
            | TypeDesc::Long { .. }
            | TypeDesc::ULong { .. }
            | TypeDesc::String => true,
            TypeDesc::Offset { base, .. } => base.is_complete(),
            TypeDesc::Array { elem, bound } => {
                elem.is_complete() && matches!(bound, Some(ArrayBound::Count(_)))
            }
            TypeDesc::Struct { fields, .. } => fields.iter().all(|f| f.ty.is_complete()),
            TypeDesc::Type | TypeDesc::Closure { .. } | TypeDesc::Any | TypeDesc::Void => false,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Int { width } => write!(f, "int<{}>", width),
            TypeDesc::UInt { width } => write!(f, "uint<{}>", width),
            TypeDesc::Long { width } => write!(f, "int<{}>", width),
            TypeDesc::ULong { width } => write!(f, "uint<{}>", width),
            TypeDesc::String => write!(f, "string"),
            TypeDesc::Array { elem, bound } => match bound {
                Some(ArrayBound::Count(n)) => write!(f, "{}[{}]", elem, n),
                Some(ArrayBound::SizeBits(n)) => write!(f, "{}[{}#b]", elem, n),
                _ => write!(f, "{}[]", elem),
            },
            TypeDesc::Struct { name, fields } => {
                if let Some(name) = name {
                    write!(f, "struct {} {{", name)?;
                } else {
                    write!(f, "struct {{")?;
                }
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            TypeDesc::Type => write!(f, "type"),
            TypeDesc::Offset { base, unit } => write!(f, "offset<{}, {}>", base, unit),
            TypeDesc::Closure { return_type, args } => {
                write!(f, "(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if a.vararg {
                        write!(f, "...")?;
                    }
                    write!(f, "{}", a.ty)?;
                    if a.optional {
                        write!(f, "?")?;
                    }
                }
                write!(f, "): {}", return_type)
            }
            TypeDesc::Any => write!(f, "any"),
            TypeDesc::Void => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive_and_symmetric() {
        let t = TypeDesc::Int { width: 16 };
        let u = TypeDesc::UInt { width: 16 };
        assert!(t.structurally_equal(&t));
        assert_eq!(t.structurally_equal(&u), u.structurally_equal(&t));
    }

    #[test]
    fn any_equals_any_only() {
        assert!(TypeDesc::Any.structurally_equal(&TypeDesc::Any));
        assert!(!TypeDesc::Any.structurally_equal(&TypeDesc::Int { width: 32 }));
    }

    #[test]
    fn distinct_widths_are_distinct_types() {
        let a = TypeDesc::Int { width: 8 };
        let b = TypeDesc::Int { width: 16 };
        assert!(!a.structurally_equal(&b));
    }

    #[test]
    fn completeness_monotone_over_array_and_struct() {
        let elem = Rc::new(TypeDesc::Int { width: 8 });
        let complete_array = TypeDesc::Array {
            elem: elem.clone(),
            bound: Some(ArrayBound::Count(4)),
        };
        assert!(complete_array.is_complete());

        let incomplete_array = TypeDesc::Array {
            elem,
            bound: Some(ArrayBound::Dynamic),
        };
        assert!(!incomplete_array.is_complete());

        let s = TypeDesc::Struct {
            name: None,
            fields: vec![FieldType {
                name: "a".into(),
                ty: Rc::new(TypeDesc::String),
            }],
        };
        assert!(s.is_complete());
    }

    #[test]
    fn closures_and_any_are_never_complete() {
        assert!(!TypeDesc::Any.is_complete());
        assert!(!TypeDesc::Type.is_complete());
        let c = TypeDesc::Closure {
            return_type: Rc::new(TypeDesc::Int { width: 32 }),
            args: vec![],
        };
        assert!(!c.is_complete());
    }

    #[test]
    fn display_matches_examples_in_spec() {
        let offset = TypeDesc::offset_uint64(8);
        assert_eq!(format!("{}", offset), "offset<uint<64>, 8>");
    }
}
