//! `Value`: the single tagged machine word described in spec.md section 3.
//!
//! Small integers live inline (see `word.rs`); everything else is a
//! reference-counted box (`boxed.rs`) reached through a tagged pointer.
//! `Value` owns exactly one refcount on its `Rc<Boxed>` (when boxed) and
//! manages it by hand in `Clone`/`Drop`, since the `Rc` itself is erased
//! into a `u64` the moment it's created — there is no safe `Rc<Boxed>`
//! field to let the compiler do this for us.
//!
//! Kept deliberately `!Send + !Sync` (spec.md section 5: single-threaded
//! VM) via the `PhantomData<Rc<()>>` marker field below; without it, `u64`
//! being `Send + Sync` would make this type unsoundly `Send + Sync` too.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::array::ArrayData;
use crate::boxed::Boxed;
use crate::closure::{ClosureData, EntryPoint};
use crate::error::{PvmError, ValueKind};
use crate::offset::OffsetData;
use crate::struct_value::StructData;
use crate::types::TypeDesc;
use crate::word::{self, MAX_INLINE_WIDTH};

/// The seven value kinds of spec.md section 3.1, plus `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Int,
    UInt,
    Long,
    ULong,
    String,
    Array,
    Struct,
    Type,
    Offset,
    Closure,
}

#[repr(transparent)]
pub struct Value {
    word: u64,
    _not_send_sync: PhantomData<Rc<()>>,
}

impl Value {
    fn from_word(word: u64) -> Self {
        Value {
            word,
            _not_send_sync: PhantomData,
        }
    }

    fn from_boxed(payload: Boxed) -> Self {
        let ptr = Rc::into_raw(Rc::new(payload));
        Self::from_word(word::pack_box(ptr as *const ()))
    }

    /// Borrow the boxed payload, or `None` if this word is inline (`Int`,
    /// `UInt`, or `Null`).
    fn boxed_ref(&self) -> Option<&Boxed> {
        if word::is_boxed(self.word) {
            let ptr = word::unpack_box(self.word) as *const Boxed;
            // Safe: `self` holds a live refcount on this allocation for as
            // long as `self` exists, so the pointee outlives this borrow.
            Some(unsafe { &*ptr })
        } else {
            None
        }
    }

    // ---- construction ----------------------------------------------

    pub fn null() -> Self {
        Self::from_word(word::NULL_WORD)
    }

    pub fn make_int(value: i64, width: u8) -> Result<Self, PvmError> {
        if !(1..=MAX_INLINE_WIDTH).contains(&width) {
            return Err(PvmError::InvalidWidth {
                kind: ValueKind::Int,
                width: width as u16,
            });
        }
        let narrowed = word::sign_extend(value, width);
        Ok(Self::from_word(word::pack_int(narrowed, width)))
    }

    pub fn make_uint(value: u64, width: u8) -> Result<Self, PvmError> {
        if !(1..=MAX_INLINE_WIDTH).contains(&width) {
            return Err(PvmError::InvalidWidth {
                kind: ValueKind::UInt,
                width: width as u16,
            });
        }
        let narrowed = word::mask_to_width(value, width);
        Ok(Self::from_word(word::pack_uint(narrowed, width)))
    }

    pub fn make_long(value: i64, width: u8) -> Result<Self, PvmError> {
        if !(33..=64).contains(&width) {
            return Err(PvmError::InvalidWidth {
                kind: ValueKind::Long,
                width: width as u16,
            });
        }
        Ok(Self::from_boxed(Boxed::Long {
            width,
            value: word::sign_extend(value, width),
        }))
    }

    pub fn make_ulong(value: u64, width: u8) -> Result<Self, PvmError> {
        if !(33..=64).contains(&width) {
            return Err(PvmError::InvalidWidth {
                kind: ValueKind::ULong,
                width: width as u16,
            });
        }
        Ok(Self::from_boxed(Boxed::ULong {
            width,
            value: word::mask_to_width(value, width),
        }))
    }

    pub fn make_string(bytes: &[u8]) -> Self {
        Self::from_boxed(Boxed::Str(bytes.into()))
    }

    pub fn make_array(nelem: u64, elem_type: Rc<TypeDesc>) -> Self {
        Self::from_boxed(Boxed::Array(ArrayData::new(nelem, elem_type)))
    }

    pub fn make_struct(ty: Rc<TypeDesc>, nfields: u64, nmethods: u64) -> Self {
        Self::from_boxed(Boxed::Struct(StructData::new(ty, nfields, nmethods)))
    }

    pub fn make_type(ty: Rc<TypeDesc>) -> Self {
        Self::from_boxed(Boxed::Type(ty))
    }

    /// `magnitude` must be an integral value; `unit` must be positive
    /// (spec.md section 3.1).
    pub fn make_offset(magnitude: Value, unit: u64) -> Result<Self, PvmError> {
        if !magnitude.is_integral() {
            return Err(PvmError::InvalidOffset {
                reason: "offset magnitude must be an integral value",
            });
        }
        if unit == 0 {
            return Err(PvmError::InvalidOffset {
                reason: "offset unit must be a positive number of bits",
            });
        }
        Ok(Self::from_boxed(Boxed::Offset(OffsetData { magnitude, unit })))
    }

    pub fn make_closure(entry: EntryPoint, captured: Rc<[Value]>, ty: Rc<TypeDesc>) -> Self {
        Self::from_boxed(Boxed::Closure(ClosureData { entry, captured, ty }))
    }

    // ---- discriminators ---------------------------------------------

    pub fn is_null(&self) -> bool {
        word::is_null(self.word)
    }

    pub fn kind(&self) -> Kind {
        if word::is_null(self.word) {
            return Kind::Null;
        }
        match word::tag_of(self.word) {
            word::TAG_INT => Kind::Int,
            word::TAG_UINT => Kind::UInt,
            _ => match self.boxed_ref().expect("boxed tag without payload") {
                Boxed::Long { .. } => Kind::Long,
                Boxed::ULong { .. } => Kind::ULong,
                Boxed::Str(_) => Kind::String,
                Boxed::Array(_) => Kind::Array,
                Boxed::Struct(_) => Kind::Struct,
                Boxed::Type(_) => Kind::Type,
                Boxed::Offset(_) => Kind::Offset,
                Boxed::Closure(_) => Kind::Closure,
            },
        }
    }

    pub fn is_int(&self) -> bool {
        self.kind() == Kind::Int
    }
    pub fn is_uint(&self) -> bool {
        self.kind() == Kind::UInt
    }
    pub fn is_long(&self) -> bool {
        self.kind() == Kind::Long
    }
    pub fn is_ulong(&self) -> bool {
        self.kind() == Kind::ULong
    }
    pub fn is_integral(&self) -> bool {
        matches!(self.kind(), Kind::Int | Kind::UInt | Kind::Long | Kind::ULong)
    }
    pub fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }
    pub fn is_array(&self) -> bool {
        self.kind() == Kind::Array
    }
    pub fn is_struct(&self) -> bool {
        self.kind() == Kind::Struct
    }
    pub fn is_type(&self) -> bool {
        self.kind() == Kind::Type
    }
    pub fn is_offset(&self) -> bool {
        self.kind() == Kind::Offset
    }
    pub fn is_closure(&self) -> bool {
        self.kind() == Kind::Closure
    }

    /// Arrays and structs are the only kinds that carry mapping state
    /// (spec.md sections 3.2/3.3); every accessor/setter below is a no-op
    /// outside these two kinds.
    pub fn is_mappable(&self) -> bool {
        matches!(self.kind(), Kind::Array | Kind::Struct)
    }

    // ---- payload accessors (panic if called on the wrong kind) -------

    pub fn as_array(&self) -> Option<&ArrayData> {
        match self.boxed_ref()? {
            Boxed::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructData> {
        match self.boxed_ref()? {
            Boxed::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&ClosureData> {
        match self.boxed_ref()? {
            Boxed::Closure(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Rc<TypeDesc>> {
        match self.boxed_ref()? {
            Boxed::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_offset(&self) -> Option<&OffsetData> {
        match self.boxed_ref()? {
            Boxed::Offset(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match self.boxed_ref()? {
            Boxed::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn int_value(&self) -> Option<i64> {
        if self.is_int() {
            Some(word::unpack_int(self.word))
        } else {
            None
        }
    }

    pub fn uint_value(&self) -> Option<u64> {
        if self.is_uint() {
            Some(word::unpack_uint(self.word))
        } else {
            None
        }
    }

    pub fn long_value(&self) -> Option<i64> {
        match self.boxed_ref()? {
            Boxed::Long { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn ulong_value(&self) -> Option<u64> {
        match self.boxed_ref()? {
            Boxed::ULong { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Integral width in bits, for any of the four integral kinds.
    pub fn integral_width(&self) -> Option<u8> {
        match self.boxed_ref() {
            Some(Boxed::Long { width, .. }) | Some(Boxed::ULong { width, .. }) => Some(*width),
            Some(_) => None,
            None => {
                if self.is_int() || self.is_uint() {
                    Some(word::inline_width(self.word))
                } else {
                    None
                }
            }
        }
    }

    // ---- spec.md section 4.1 "universal" operations ------------------

    /// Defined for every non-`Null` value; `None` for `Null`.
    pub fn size_of(&self) -> Option<u64> {
        match self.kind() {
            Kind::Null => None,
            Kind::Int | Kind::UInt | Kind::Long | Kind::ULong => {
                Some(self.integral_width().unwrap() as u64)
            }
            Kind::String => Some(8 * (self.as_string_bytes().unwrap().len() as u64 + 1)),
            Kind::Array => {
                let a = self.as_array().unwrap();
                Some(
                    a.elements
                        .borrow()
                        .iter()
                        .map(|e| e.value.size_of().unwrap_or(0))
                        .sum(),
                )
            }
            Kind::Struct => {
                let s = self.as_struct().unwrap();
                Some(
                    s.fields
                        .borrow()
                        .iter()
                        .map(|f| f.bit_offset + f.value.size_of().unwrap_or(0))
                        .max()
                        .unwrap_or(0),
                )
            }
            Kind::Offset => self.as_offset().unwrap().magnitude.size_of(),
            Kind::Closure => Some(0),
            Kind::Type => Some(0),
        }
    }

    /// String: byte length. Array: element count. Struct: field count.
    /// Everything else (including `Null`): 1.
    pub fn elem_count(&self) -> u64 {
        match self.kind() {
            Kind::String => self.as_string_bytes().unwrap().len() as u64,
            Kind::Array => self.as_array().unwrap().nelem(),
            Kind::Struct => self.as_struct().unwrap().nfields(),
            _ => 1,
        }
    }

    /// The type descriptor of this value's current shape, boxed as a
    /// fresh `Type` value.
    pub fn type_of(&self) -> Value {
        let desc = match self.kind() {
            Kind::Null => Rc::new(TypeDesc::Any),
            Kind::Int => Rc::new(TypeDesc::Int {
                width: word::inline_width(self.word),
            }),
            Kind::UInt => Rc::new(TypeDesc::UInt {
                width: word::inline_width(self.word),
            }),
            Kind::Long => Rc::new(TypeDesc::Long {
                width: self.integral_width().unwrap(),
            }),
            Kind::ULong => Rc::new(TypeDesc::ULong {
                width: self.integral_width().unwrap(),
            }),
            Kind::String => Rc::new(TypeDesc::String),
            Kind::Array => {
                let a = self.as_array().unwrap();
                Rc::new(TypeDesc::Array {
                    elem: a.elem_type.clone(),
                    bound: Some(crate::types::ArrayBound::Count(a.nelem())),
                })
            }
            Kind::Struct => self.as_struct().unwrap().ty.clone(),
            Kind::Type => Rc::new(TypeDesc::Type),
            Kind::Offset => {
                let o = self.as_offset().unwrap();
                let base_type = o.magnitude.type_of();
                let base = base_type.as_type().unwrap().clone();
                Rc::new(TypeDesc::Offset { base, unit: o.unit })
            }
            Kind::Closure => self.as_closure().unwrap().ty.clone(),
        };
        Value::make_type(desc)
    }

    // ---- mapping accessors/setters (spec.md sections 3.2/3.3/4.1) ----
    //
    // Uniformly a no-op on non-mappable kinds, in both directions: reading
    // always returns `Null`, writing is silently discarded. This is the
    // "polymorphic setter" law spec.md section 8 requires be total.

    pub fn ios(&self) -> Value {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => a.ios.borrow().clone(),
            Some(Boxed::Struct(s)) => s.ios.borrow().clone(),
            _ => Value::null(),
        }
    }

    pub fn set_ios(&self, v: Value) {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => *a.ios.borrow_mut() = v,
            Some(Boxed::Struct(s)) => *s.ios.borrow_mut() = v,
            _ => {}
        }
    }

    pub fn offset(&self) -> Value {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => a.offset.borrow().clone(),
            Some(Boxed::Struct(s)) => s.offset.borrow().clone(),
            _ => Value::null(),
        }
    }

    pub fn set_offset(&self, v: Value) {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => *a.offset.borrow_mut() = v,
            Some(Boxed::Struct(s)) => *s.offset.borrow_mut() = v,
            _ => {}
        }
    }

    pub fn mapper(&self) -> Value {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => a.mapper.borrow().clone(),
            Some(Boxed::Struct(s)) => s.mapper.borrow().clone(),
            _ => Value::null(),
        }
    }

    pub fn set_mapper(&self, v: Value) {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => *a.mapper.borrow_mut() = v,
            Some(Boxed::Struct(s)) => *s.mapper.borrow_mut() = v,
            _ => {}
        }
    }

    pub fn writer(&self) -> Value {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => a.writer.borrow().clone(),
            Some(Boxed::Struct(s)) => s.writer.borrow().clone(),
            _ => Value::null(),
        }
    }

    pub fn set_writer(&self, v: Value) {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => *a.writer.borrow_mut() = v,
            Some(Boxed::Struct(s)) => *s.writer.borrow_mut() = v,
            _ => {}
        }
    }

    /// Arrays only; always `Null` on structs (structs have no bounds).
    pub fn elems_bound(&self) -> Value {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => a.elems_bound.borrow().clone(),
            _ => Value::null(),
        }
    }

    pub fn set_elems_bound(&self, v: Value) {
        if let Some(Boxed::Array(a)) = self.boxed_ref() {
            *a.elems_bound.borrow_mut() = v;
        }
    }

    /// Arrays only; always `Null` on structs.
    pub fn size_bound(&self) -> Value {
        match self.boxed_ref() {
            Some(Boxed::Array(a)) => a.size_bound.borrow().clone(),
            _ => Value::null(),
        }
    }

    pub fn set_size_bound(&self, v: Value) {
        if let Some(Boxed::Array(a)) = self.boxed_ref() {
            *a.size_bound.borrow_mut() = v;
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        if word::is_boxed(self.word) {
            let ptr = word::unpack_box(self.word) as *const Boxed;
            // Recover the Rc just long enough to bump its strong count,
            // then forget it again so we don't double-drop the original.
            let rc = unsafe { Rc::from_raw(ptr) };
            let cloned = Rc::clone(&rc);
            std::mem::forget(rc);
            let new_ptr = Rc::into_raw(cloned);
            Value::from_word(word::pack_box(new_ptr as *const ()))
        } else {
            Value::from_word(self.word)
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        if word::is_boxed(self.word) {
            let ptr = word::unpack_box(self.word) as *const Boxed;
            unsafe {
                drop(Rc::from_raw(ptr));
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind(), other.kind()) {
            (Kind::Null, Kind::Null) => true,
            (Kind::Int, Kind::Int) => self.int_value() == other.int_value(),
            (Kind::UInt, Kind::UInt) => self.uint_value() == other.uint_value(),
            (Kind::Long, Kind::Long) => {
                self.long_value() == other.long_value() && self.integral_width() == other.integral_width()
            }
            (Kind::ULong, Kind::ULong) => {
                self.ulong_value() == other.ulong_value() && self.integral_width() == other.integral_width()
            }
            (Kind::String, Kind::String) => self.as_string_bytes() == other.as_string_bytes(),
            (Kind::Offset, Kind::Offset) => self.as_offset() == other.as_offset(),
            // Arrays/structs/closures/types are reference-identity containers
            // reachable through the box store; cloning a `Value` shares the
            // allocation rather than deep-copying it.
            (Kind::Array, Kind::Array) => {
                std::ptr::eq(self.as_array().unwrap(), other.as_array().unwrap())
            }
            (Kind::Struct, Kind::Struct) => {
                std::ptr::eq(self.as_struct().unwrap(), other.as_struct().unwrap())
            }
            (Kind::Closure, Kind::Closure) => self.as_closure() == other.as_closure(),
            (Kind::Type, Kind::Type) => self
                .as_type()
                .unwrap()
                .structurally_equal(other.as_type().unwrap()),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Kind::Null => write!(f, "null"),
            Kind::Int => write!(f, "{}", self.int_value().unwrap()),
            Kind::UInt => write!(f, "{}", self.uint_value().unwrap()),
            Kind::Long => write!(f, "{}L", self.long_value().unwrap()),
            Kind::ULong => write!(f, "{}UL", self.ulong_value().unwrap()),
            Kind::String => write!(f, "{:?}", String::from_utf8_lossy(self.as_string_bytes().unwrap())),
            Kind::Array => write!(f, "<array of {} elem(s)>", self.elem_count()),
            Kind::Struct => write!(f, "<struct of {} field(s)>", self.elem_count()),
            Kind::Type => write!(f, "{}", self.as_type().unwrap()),
            Kind::Offset => {
                let o = self.as_offset().unwrap();
                write!(f, "{:?}#{}", o.magnitude, o.unit)
            }
            Kind::Closure => write!(f, "<closure>"),
        }
    }
}
