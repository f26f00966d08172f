//! The heap-allocated payload behind a boxed `Value` word.
//!
//! One `Rc<Boxed>` allocation backs every `Long`, `ULong`, `String`,
//! `Array`, `Struct`, `Type`, `Offset`, and `Closure` value. `Value`'s
//! `Clone`/`Drop` manipulate this `Rc`'s refcount directly against the
//! pointer recovered from the tagged word (see `word.rs`); nothing outside
//! `value.rs` constructs or tears down a `Boxed` directly.

use std::rc::Rc;

use crate::array::ArrayData;
use crate::closure::ClosureData;
use crate::offset::OffsetData;
use crate::struct_value::StructData;
use crate::types::TypeDesc;

#[derive(Debug)]
pub enum Boxed {
    Long { width: u8, value: i64 },
    ULong { width: u8, value: u64 },
    Str(Box<[u8]>),
    Array(ArrayData),
    Struct(StructData),
    Type(Rc<TypeDesc>),
    Offset(OffsetData),
    Closure(ClosureData),
}

impl Boxed {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Boxed::Long { .. } => "Long",
            Boxed::ULong { .. } => "ULong",
            Boxed::Str(_) => "String",
            Boxed::Array(_) => "Array",
            Boxed::Struct(_) => "Struct",
            Boxed::Type(_) => "Type",
            Boxed::Offset(_) => "Offset",
            Boxed::Closure(_) => "Closure",
        }
    }
}
